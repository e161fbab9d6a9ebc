//! # Vector Label Rendering
//!
//! Writes the print request as a PDF document, one page per copy, for
//! driver-based printing on hosts without a raw protocol channel.
//!
//! The document is built directly: a header, a body of numbered
//! objects whose byte offsets are tracked as they are written, a
//! cross-reference table, and a trailer. Streams are stored
//! uncompressed.
//!
//! ## Page Orientation
//!
//! The label is 50 x 35 mm, but pages are emitted 35 mm wide and 50 mm
//! tall so print paths that auto-rotate landscape pages leave them
//! alone. Each page's content is wrapped in a rotation transform
//! (`0 1 -1 0 w 0 cm`) so drawing happens in label coordinates: x
//! along the 50 mm edge, origin at the bottom-left.
//!
//! ## Fonts
//!
//! When the resolver finds a CJK font it is embedded whole as a
//! `CIDFontType2` program with the `Identity-H` encoding; text is shown
//! as big-endian glyph-ID strings, with per-glyph advances scaled to
//! the 1000-unit glyph space. Without a font the document falls back
//! to the built-in `Helvetica-Bold` — CJK captions will not display,
//! but the renderer must still produce a document rather than fail.

use ab_glyph::{Font, FontArc};
use log::warn;

use crate::font::{FontResolver, FontWeight};
use crate::record::RenderRequest;

const MM_TO_PT: f32 = 72.0 / 25.4;

/// Label width, along the long edge (drawing x axis)
const LABEL_W_MM: f32 = 50.0;
/// Label height, along the short edge (drawing y axis)
const LABEL_H_MM: f32 = 35.0;

const TITLE_FONT_PT: f32 = 10.0;
const BODY_FONT_PT: f32 = 8.0;

/// Renders a print request as a PDF document.
pub struct VectorRenderer<'a> {
    resolver: &'a FontResolver,
}

impl<'a> VectorRenderer<'a> {
    pub fn new(resolver: &'a FontResolver) -> Self {
        Self { resolver }
    }

    /// Produce the complete document. Infallible: a render request
    /// always yields a well-formed PDF, degrading only in font
    /// fidelity.
    pub fn render(&self, request: &RenderRequest) -> Vec<u8> {
        let font = match self.resolver.resolve(FontWeight::Bold) {
            Some(resolved) => PdfFont::Embedded {
                font: resolved.font,
                data: resolved.data,
                base_name: base_font_name(&resolved.path),
            },
            None => {
                warn!("no font available; vector output uses Helvetica-Bold");
                PdfFont::Builtin
            }
        };

        let mut used_gids = Vec::new();
        let contents: Vec<Vec<u8>> = (0..request.copies)
            .map(|i| page_content(request, request.is_first_label(i), &font, &mut used_gids))
            .collect();

        write_document(&font, &used_gids, &contents)
    }
}

enum PdfFont {
    Embedded {
        font: FontArc,
        data: Vec<u8>,
        base_name: String,
    },
    Builtin,
}

/// A sanitized PostScript-style name for the embedded font, derived
/// from the file stem.
fn base_font_name(path: &std::path::Path) -> String {
    let stem: String = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("")
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .collect();
    if stem.is_empty() {
        "Embedded".to_string()
    } else {
        stem
    }
}

fn pt(mm: f32) -> String {
    trim_number(mm * MM_TO_PT)
}

/// Format with two decimals, dropping a trailing ".00".
fn trim_number(value: f32) -> String {
    let s = format!("{:.2}", value);
    match s.strip_suffix(".00") {
        Some(short) => short.to_string(),
        None => s,
    }
}

/// Build one page's content stream in label coordinates.
fn page_content(
    request: &RenderRequest,
    first: bool,
    font: &PdfFont,
    used_gids: &mut Vec<u16>,
) -> Vec<u8> {
    let record = &request.record;
    let mut ops = String::new();

    // Rotate into label coordinates for the whole page.
    ops.push_str("q\n");
    ops.push_str(&format!("0 1 -1 0 {} 0 cm\n", pt(LABEL_H_MM)));

    if first {
        rect(&mut ops, 2.0, 0.5, 0.5, LABEL_W_MM - 1.0, LABEL_H_MM - 1.0);
        rect(&mut ops, 0.5, 1.5, 1.5, LABEL_W_MM - 3.0, LABEL_H_MM - 3.0);
    } else {
        rect(&mut ops, 0.5, 1.0, 1.0, LABEL_W_MM - 2.0, LABEL_H_MM - 2.0);
    }

    let batch_line = if first {
        format!("試劑批號：{} >>新批號<<", record.batch_number)
    } else {
        format!("試劑批號：{} (允收合格)", record.batch_number)
    };

    text(&mut ops, font, used_gids, TITLE_FONT_PT, 2.0, 29.0, "【入庫】");
    text(
        &mut ops,
        font,
        used_gids,
        BODY_FONT_PT,
        2.0,
        25.0,
        &format!("試劑名稱：{}", record.reagent_name),
    );
    text(&mut ops, font, used_gids, BODY_FONT_PT, 2.0, 21.0, &batch_line);
    text(
        &mut ops,
        font,
        used_gids,
        BODY_FONT_PT,
        2.0,
        17.0,
        &format!("穩定效期：{}", record.expiry_text()),
    );
    text(
        &mut ops,
        font,
        used_gids,
        BODY_FONT_PT,
        2.0,
        13.0,
        &format!("入庫時間：{}", record.entry_text()),
    );
    text(&mut ops, font, used_gids, TITLE_FONT_PT, 2.0, 8.0, "【出庫】");
    text(&mut ops, font, used_gids, BODY_FONT_PT, 2.0, 4.0, "人員：");
    text(&mut ops, font, used_gids, BODY_FONT_PT, 25.0, 4.0, "出庫日期：");

    ops.push_str("Q\n");
    ops.into_bytes()
}

/// Stroke a rectangle outline. Positions and sizes in mm, line width
/// in points.
fn rect(ops: &mut String, line_width_pt: f32, x: f32, y: f32, w: f32, h: f32) {
    ops.push_str(&format!(
        "{} w\n{} {} {} {} re S\n",
        trim_number(line_width_pt),
        pt(x),
        pt(y),
        pt(w),
        pt(h)
    ));
}

/// Show a line of text with its baseline at (x, y) mm.
fn text(
    ops: &mut String,
    font: &PdfFont,
    used_gids: &mut Vec<u16>,
    size_pt: f32,
    x: f32,
    y: f32,
    value: &str,
) {
    let shown = match font {
        PdfFont::Embedded { font, .. } => {
            let mut hex = String::with_capacity(value.chars().count() * 4 + 2);
            hex.push('<');
            for c in value.chars() {
                let gid = font.glyph_id(c).0;
                if !used_gids.contains(&gid) {
                    used_gids.push(gid);
                }
                hex.push_str(&format!("{:04X}", gid));
            }
            hex.push('>');
            hex
        }
        PdfFont::Builtin => literal_string(value),
    };
    ops.push_str(&format!(
        "BT /F1 {} Tf {} {} Td {} Tj ET\n",
        trim_number(size_pt),
        pt(x),
        pt(y),
        shown
    ));
}

/// A PDF literal string: parens and backslashes escaped, non-ASCII
/// bytes as octal escapes.
fn literal_string(value: &str) -> String {
    let mut out = String::from("(");
    for byte in value.bytes() {
        match byte {
            b'(' => out.push_str("\\("),
            b')' => out.push_str("\\)"),
            b'\\' => out.push_str("\\\\"),
            0x20..=0x7E => out.push(byte as char),
            _ => out.push_str(&format!("\\{:03o}", byte)),
        }
    }
    out.push(')');
    out
}

// ─── Document assembly ──────────────────────────────────────────────

/// Byte-offset-tracking object writer. Objects must be added in id
/// order starting at 1; `finish` appends the xref table and trailer.
struct PdfWriter {
    buf: Vec<u8>,
    offsets: Vec<usize>,
}

impl PdfWriter {
    fn new() -> Self {
        // Header plus a high-bit comment line marking the file binary.
        let mut buf = Vec::new();
        buf.extend_from_slice(b"%PDF-1.4\n");
        buf.extend_from_slice(&[b'%', 0xE2, 0xE3, 0xCF, 0xD3, b'\n']);
        Self {
            buf,
            offsets: Vec::new(),
        }
    }

    fn add_object(&mut self, body: &str) {
        self.offsets.push(self.buf.len());
        let id = self.offsets.len();
        self.buf
            .extend_from_slice(format!("{} 0 obj\n{}\nendobj\n", id, body).as_bytes());
    }

    fn add_stream(&mut self, dict_extra: &str, data: &[u8]) {
        self.offsets.push(self.buf.len());
        let id = self.offsets.len();
        self.buf.extend_from_slice(
            format!(
                "{} 0 obj\n<< /Length {}{} >>\nstream\n",
                id,
                data.len(),
                dict_extra
            )
            .as_bytes(),
        );
        self.buf.extend_from_slice(data);
        self.buf.extend_from_slice(b"\nendstream\nendobj\n");
    }

    fn finish(mut self, root_id: usize) -> Vec<u8> {
        let xref_offset = self.buf.len();
        let count = self.offsets.len() + 1;
        self.buf
            .extend_from_slice(format!("xref\n0 {}\n", count).as_bytes());
        self.buf.extend_from_slice(b"0000000000 65535 f \n");
        for offset in &self.offsets {
            self.buf
                .extend_from_slice(format!("{:010} 00000 n \n", offset).as_bytes());
        }
        self.buf.extend_from_slice(
            format!(
                "trailer\n<< /Size {} /Root {} 0 R >>\nstartxref\n{}\n%%EOF\n",
                count, root_id, xref_offset
            )
            .as_bytes(),
        );
        self.buf
    }
}

fn write_document(font: &PdfFont, used_gids: &[u16], contents: &[Vec<u8>]) -> Vec<u8> {
    let mut writer = PdfWriter::new();

    // Object layout: 1 catalog, 2 page tree, 3 font (plus descendant
    // objects 4-6 when embedding), then page/content pairs.
    let first_page_id = match font {
        PdfFont::Embedded { .. } => 7,
        PdfFont::Builtin => 4,
    };
    let page_ids: Vec<usize> = (0..contents.len())
        .map(|i| first_page_id + 2 * i)
        .collect();

    writer.add_object("<< /Type /Catalog /Pages 2 0 R >>");
    let kids: Vec<String> = page_ids.iter().map(|id| format!("{} 0 R", id)).collect();
    writer.add_object(&format!(
        "<< /Type /Pages /Count {} /Kids [{}] >>",
        contents.len(),
        kids.join(" ")
    ));

    match font {
        PdfFont::Embedded {
            font,
            data,
            base_name,
        } => {
            let upem = font.units_per_em().unwrap_or(1000.0);
            let scale = 1000.0 / upem;
            let ascent = (font.ascent_unscaled() * scale).round() as i32;
            let descent = (font.descent_unscaled() * scale).round() as i32;

            let mut gids: Vec<u16> = used_gids.to_vec();
            gids.sort_unstable();
            let widths: Vec<String> = gids
                .iter()
                .map(|&gid| {
                    let advance =
                        font.h_advance_unscaled(ab_glyph::GlyphId(gid)) * scale;
                    format!("{} [{}]", gid, advance.round() as i32)
                })
                .collect();

            writer.add_object(&format!(
                "<< /Type /Font /Subtype /Type0 /BaseFont /{name} \
                 /Encoding /Identity-H /DescendantFonts [4 0 R] >>",
                name = base_name
            ));
            writer.add_object(&format!(
                "<< /Type /Font /Subtype /CIDFontType2 /BaseFont /{name} \
                 /CIDSystemInfo << /Registry (Adobe) /Ordering (Identity) /Supplement 0 >> \
                 /FontDescriptor 5 0 R /DW 1000 /W [ {w} ] /CIDToGIDMap /Identity >>",
                name = base_name,
                w = widths.join(" ")
            ));
            writer.add_object(&format!(
                "<< /Type /FontDescriptor /FontName /{name} /Flags 4 \
                 /FontBBox [0 {descent} 1000 {ascent}] /ItalicAngle 0 \
                 /Ascent {ascent} /Descent {descent} /CapHeight {ascent} \
                 /StemV 80 /FontFile2 6 0 R >>",
                name = base_name,
                ascent = ascent,
                descent = descent
            ));
            writer.add_stream(&format!(" /Length1 {}", data.len()), data);
        }
        PdfFont::Builtin => {
            writer.add_object(
                "<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica-Bold \
                 /Encoding /WinAnsiEncoding >>",
            );
        }
    }

    let page_w = pt(LABEL_H_MM);
    let page_h = pt(LABEL_W_MM);
    for (i, content) in contents.iter().enumerate() {
        let content_id = page_ids[i] + 1;
        writer.add_object(&format!(
            "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 {} {}] \
             /Resources << /Font << /F1 3 0 R >> >> /Contents {} 0 R >>",
            page_w, page_h, content_id
        ));
        writer.add_stream("", content);
    }

    writer.finish(1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::LabelRecord;
    use chrono::NaiveDate;

    fn request(copies: u32, new_batch: bool) -> RenderRequest {
        let record = LabelRecord {
            reagent_name: "AFP".to_string(),
            batch_number: "AFP001".to_string(),
            expiry_date: NaiveDate::from_ymd_opt(2025, 8, 31).unwrap(),
            entry_date: NaiveDate::from_ymd_opt(2025, 8, 20)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap(),
            quantity: 1,
        };
        RenderRequest::new(record, copies, new_batch).unwrap()
    }

    fn render_without_font(copies: u32, new_batch: bool) -> Vec<u8> {
        let resolver = FontResolver::unavailable();
        VectorRenderer::new(&resolver).render(&request(copies, new_batch))
    }

    #[test]
    fn test_document_framing() {
        let pdf = render_without_font(1, false);
        assert!(pdf.starts_with(b"%PDF-1.4\n"));
        let text = String::from_utf8_lossy(&pdf);
        assert!(text.contains("trailer"));
        assert!(text.trim_end().ends_with("%%EOF"));
    }

    #[test]
    fn test_one_page_per_copy() {
        for copies in [1, 3, 5] {
            let text = String::from_utf8_lossy(&render_without_font(copies, false)).into_owned();
            assert_eq!(text.matches("/Type /Page ").count(), copies as usize);
            assert_eq!(text.matches("/Count").count(), 1);
            assert!(text.contains(&format!("/Count {}", copies)));
        }
    }

    #[test]
    fn test_portrait_page_size() {
        // 35 mm wide, 50 mm tall in points.
        let text = String::from_utf8_lossy(&render_without_font(1, false)).into_owned();
        assert!(text.contains("/MediaBox [0 0 99.21 141.73]"));
    }

    #[test]
    fn test_rotation_transform_on_every_page() {
        let text = String::from_utf8_lossy(&render_without_font(3, false)).into_owned();
        assert_eq!(text.matches("0 1 -1 0 99.21 0 cm").count(), 3);
    }

    #[test]
    fn test_first_copy_of_new_batch_has_double_border() {
        let text = String::from_utf8_lossy(&render_without_font(3, true)).into_owned();
        // 2 rects on the first page, 1 on each of the others.
        assert_eq!(text.matches(" re S").count(), 4);
        assert!(text.contains("2 w"));
    }

    #[test]
    fn test_builtin_fallback_font() {
        let text = String::from_utf8_lossy(&render_without_font(1, false)).into_owned();
        assert!(text.contains("/BaseFont /Helvetica-Bold"));
        assert!(!text.contains("/FontFile2"));
        // ASCII values survive as literal strings.
        assert!(text.contains("AFP001"));
        assert!(text.contains("2025/08/31"));
    }

    #[test]
    fn test_embedded_font_structure() {
        let resolver = FontResolver::new();
        if !resolver.available() {
            return;
        }
        let pdf = VectorRenderer::new(&resolver).render(&request(2, true));
        let text = String::from_utf8_lossy(&pdf).into_owned();
        assert!(text.contains("/Subtype /Type0"));
        assert!(text.contains("/Encoding /Identity-H"));
        assert!(text.contains("/Subtype /CIDFontType2"));
        assert!(text.contains("/FontFile2"));
        // Text is shown as glyph-id hex strings, not literals.
        assert!(text.contains("> Tj"));
    }

    #[test]
    fn test_xref_offsets_point_at_objects() {
        // Offsets are byte positions, and the header's binary comment
        // line is not valid UTF-8, so everything here stays on the raw
        // buffer; a decoded view would shift every offset.
        let pdf = render_without_font(2, false);
        let xref_at = pdf.windows(5).position(|w| w == b"xref\n").unwrap();
        // The table and trailer are plain ASCII.
        let table = std::str::from_utf8(&pdf[xref_at..]).unwrap();

        let mut objects = 0;
        for (i, line) in table.lines().skip(3).enumerate() {
            let Some(offset) = line.split(' ').next().and_then(|o| o.parse::<usize>().ok())
            else {
                break;
            };
            let expected = format!("{} 0 obj", i + 1);
            assert!(
                pdf[offset..].starts_with(expected.as_bytes()),
                "object {} offset wrong",
                i + 1
            );
            objects += 1;
        }
        // 1 catalog + 1 page tree + 1 font + 2 page/content pairs.
        assert_eq!(objects, 7);
    }

    #[test]
    fn test_literal_string_escaping() {
        assert_eq!(literal_string("AFP (1)"), "(AFP \\(1\\))");
        assert_eq!(literal_string("a\\b"), "(a\\\\b)");
        assert_eq!(literal_string("é"), "(\\303\\251)");
    }
}
