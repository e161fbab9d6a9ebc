//! # Label Layout Composition
//!
//! Assembles the full ZPL command sequence for a print request: label
//! dimensions, border box(es), and the ordered field rows, each row
//! resolved to a graphic reference or a native-font fallback.
//!
//! ## Layout
//!
//! ```text
//! ┌──────────────────────────────────────────┐
//! │ 【入庫】                                  │ y=25
//! │ 試劑名稱: AFP                             │ y=55
//! │ 試劑批號: AFP001       >>新批號<<         │ y=85
//! │ 穩定效期: 2025/08/31                      │ y=115
//! │ 入庫日期: 2025/08/20                      │ y=145
//! │ 【出庫】                                  │ y=175
//! │ 人員:            出庫日期:                │ y=205
//! └──────────────────────────────────────────┘
//! ```
//!
//! ## The First-Copy Rule
//!
//! Within one request, at most one label differs from the rest: when
//! `new_batch` is set, copy 0 (and only copy 0) carries the bold
//! `>>新批號<<` marker and a double border. Every other copy carries
//! `(允收合格)` and a single border. This is the core business rule of
//! the layout.
//!
//! ## Fallback Strategies
//!
//! Each field element resolves through an ordered strategy chain,
//! decided once per request so all copies render identically:
//!
//! 1. fixed caption graphic ([`FixedGraphics`])
//! 2. dynamic graphic rendered for this request ([`DynamicCache`])
//! 3. native-font text of the same literal string
//!
//! When both a row's caption and value degrade to native text they are
//! merged into a single directive, so at minimum the full literal text
//! is always emitted — never silently dropped.
//!
//! ## Positioning
//!
//! Value x-positions use an estimated caption width plus a fixed
//! character-spacing constant rather than measured glyph metrics.
//! Labels in circulation were printed with these constants; keep them.

use std::collections::HashSet;

use crate::printer::LabelGeometry;
use crate::protocol::commands;
use crate::protocol::graphics::EncodedGraphic;
use crate::record::RenderRequest;
use crate::render::cache::{Caption, DynamicCache, FixedGraphics};
use crate::font::FontResolver;

/// Left margin for every row, in dots
const X_MARGIN: u32 = 20;
/// Baseline y of the first row
const Y_START: u32 = 25;
/// Vertical distance between rows
const ROW_STEP: u32 = 30;
/// Estimated pixel width of a field caption
const CAPTION_WIDTH: u32 = 80;
/// Gap between a caption and its value (one CJK character)
const CHAR_SPACING: u32 = 22;
/// Gap between a graphic batch value and its marker
const MARKER_OFFSET: u32 = 100;
/// Estimated per-character width of native-font batch text
const NATIVE_CHAR_WIDTH: u32 = 11;
/// Native-font character size (height and width)
const NATIVE_FONT_SIZE: u32 = 22;
/// x of the 出庫日期: caption on the bottom row
const CHECKOUT_DATE_X: u32 = 190;
/// Border inset from the label edge
const BORDER_MARGIN: u32 = 5;
/// Border line thickness (single border, and the inner double border)
const BORDER_THICKNESS: u32 = 2;

/// How one label element will be drawn, fixed for the whole request.
#[derive(Debug, Clone)]
enum Rendering {
    /// Place a named graphic (definition carried alongside)
    Graphic(EncodedGraphic),
    /// Draw literal text with the printer's native font
    Native { text: String, bold: bool },
}

impl Rendering {
    fn native(text: impl Into<String>) -> Self {
        Rendering::Native {
            text: text.into(),
            bold: false,
        }
    }

    fn is_native(&self) -> bool {
        matches!(self, Rendering::Native { .. })
    }
}

/// Composes per-copy ZPL command blocks from a render request.
///
/// Holds only borrowed, read-only state: the fixed-graphic handle and
/// the font resolver. Each [`compose`](Self::compose) call owns its
/// dynamic cache, so concurrent requests never share mutable state.
pub struct LayoutComposer<'a> {
    geometry: LabelGeometry,
    fixed: &'a FixedGraphics,
    resolver: &'a FontResolver,
}

impl<'a> LayoutComposer<'a> {
    pub fn new(fixed: &'a FixedGraphics, resolver: &'a FontResolver) -> Self {
        Self {
            geometry: LabelGeometry::default(),
            fixed,
            resolver,
        }
    }

    /// Produce one self-contained command block per copy.
    ///
    /// Blocks are stateless per copy: graphic definitions are
    /// re-emitted identically inside every block, since the protocol
    /// requires each graphic used in a label to be defined within
    /// that label.
    pub fn compose(&self, request: &RenderRequest) -> Vec<String> {
        let fields = self.resolve_fields(request);
        (0..request.copies)
            .map(|i| self.emit_block(request, &fields, request.is_first_label(i)))
            .collect()
    }

    /// Decide every element's rendering once, up front.
    fn resolve_fields(&self, request: &RenderRequest) -> ResolvedFields {
        let record = &request.record;
        let mut cache = DynamicCache::new(self.resolver);
        let mut definitions = Definitions::default();

        let reagent = (
            definitions.track(self.resolve_caption(&mut cache, Caption::ReagentName)),
            definitions.track(self.resolve_value(&mut cache, &record.reagent_name)),
        );
        let batch = (
            definitions.track(self.resolve_caption(&mut cache, Caption::Batch)),
            definitions.track(self.resolve_value(&mut cache, &record.batch_number)),
        );
        let expiry = (
            definitions.track(self.resolve_caption(&mut cache, Caption::Expiry)),
            definitions.track(self.resolve_value(&mut cache, &record.expiry_text())),
        );
        let entry = (
            definitions.track(self.resolve_caption(&mut cache, Caption::EntryDate)),
            definitions.track(self.resolve_value(&mut cache, &record.entry_text())),
        );

        ResolvedFields {
            check_in: self.resolve_simple(Caption::CheckIn),
            reagent,
            batch,
            expiry,
            entry,
            check_out: self.resolve_simple(Caption::CheckOut),
            person: self.resolve_simple(Caption::Person),
            checkout_date: self.resolve_simple(Caption::CheckoutDate),
            new_batch_marker: self.resolve_simple(Caption::NewBatch),
            qualified_marker: self.resolve_simple(Caption::Qualified),
            dynamic_definitions: definitions.directives,
        }
    }

    /// Titles and markers: fixed graphic, else native text.
    fn resolve_simple(&self, caption: Caption) -> Rendering {
        match self.fixed.get(caption) {
            Some(g) => Rendering::Graphic(g.clone()),
            None => Rendering::Native {
                text: caption.text().to_string(),
                bold: caption.bold(),
            },
        }
    }

    /// Field captions additionally try a dynamic graphic, so a caption
    /// missing from the startup set still renders as CJK when a font
    /// is available now.
    fn resolve_caption(&self, cache: &mut DynamicCache, caption: Caption) -> Rendering {
        if let Some(g) = self.fixed.get(caption) {
            return Rendering::Graphic(g.clone());
        }
        match cache.get_or_create(caption.text(), caption.bold()) {
            Some(g) => Rendering::Graphic(g.clone()),
            None => Rendering::native(caption.text()),
        }
    }

    /// Record-specific values: dynamic graphic, else native text.
    fn resolve_value(&self, cache: &mut DynamicCache, text: &str) -> Rendering {
        match cache.get_or_create(text, false) {
            Some(g) => Rendering::Graphic(g.clone()),
            None => Rendering::native(text),
        }
    }

    /// Emit one complete `^XA … ^XZ` block.
    fn emit_block(&self, request: &RenderRequest, fields: &ResolvedFields, first: bool) -> String {
        let geo = &self.geometry;
        let (w, h) = (geo.width_dots, geo.height_dots);
        let mut lines: Vec<String> = Vec::new();

        lines.push(commands::LABEL_START.to_string());
        lines.push(commands::print_width(w));
        lines.push(commands::label_length(h));

        // Border: double for the one new-batch label, single otherwise.
        if first {
            lines.push(commands::graphic_box(
                BORDER_MARGIN,
                BORDER_MARGIN,
                w - 2 * BORDER_MARGIN,
                h - 2 * BORDER_MARGIN,
                BORDER_THICKNESS * 3,
            ));
            lines.push(commands::graphic_box(
                BORDER_MARGIN * 2,
                BORDER_MARGIN * 2,
                w - 4 * BORDER_MARGIN,
                h - 4 * BORDER_MARGIN,
                BORDER_THICKNESS,
            ));
        } else {
            lines.push(commands::graphic_box(
                BORDER_MARGIN,
                BORDER_MARGIN,
                w - 2 * BORDER_MARGIN,
                h - 2 * BORDER_MARGIN,
                BORDER_THICKNESS,
            ));
        }

        // Graphic definitions, fixed set first, then this request's
        // dynamic graphics.
        for caption in Caption::ALL {
            if let Some(g) = self.fixed.get(caption) {
                lines.push(g.definition());
            }
        }
        lines.extend(fields.dynamic_definitions.iter().cloned());

        // Field rows, fixed order, fixed spacing.
        let mut y = Y_START;
        emit_element(&mut lines, X_MARGIN, y, &fields.check_in);
        y += ROW_STEP;

        emit_field_row(&mut lines, y, &fields.reagent.0, &fields.reagent.1);
        y += ROW_STEP;

        emit_field_row(&mut lines, y, &fields.batch.0, &fields.batch.1);
        let marker = if first {
            &fields.new_batch_marker
        } else {
            &fields.qualified_marker
        };
        let marker_x = X_MARGIN
            + CAPTION_WIDTH
            + CHAR_SPACING
            + if fields.batch.1.is_native() {
                NATIVE_CHAR_WIDTH * request.record.batch_number.chars().count() as u32
            } else {
                MARKER_OFFSET
            };
        emit_element(&mut lines, marker_x, y, marker);
        y += ROW_STEP;

        emit_field_row(&mut lines, y, &fields.expiry.0, &fields.expiry.1);
        y += ROW_STEP;

        emit_field_row(&mut lines, y, &fields.entry.0, &fields.entry.1);
        y += ROW_STEP;

        emit_element(&mut lines, X_MARGIN, y, &fields.check_out);
        y += ROW_STEP;

        emit_element(&mut lines, X_MARGIN, y, &fields.person);
        emit_element(&mut lines, CHECKOUT_DATE_X, y, &fields.checkout_date);

        lines.push(commands::LABEL_END.to_string());

        let mut block = lines.join("\n");
        block.push('\n');
        block
    }
}

/// Collects `~DGR` directives for the dynamic graphics a request
/// resolved to, deduped by name.
#[derive(Default)]
struct Definitions {
    seen: HashSet<String>,
    directives: Vec<String>,
}

impl Definitions {
    fn track(&mut self, rendering: Rendering) -> Rendering {
        if let Rendering::Graphic(g) = &rendering {
            if g.name.starts_with("DYN_") && self.seen.insert(g.name.clone()) {
                self.directives.push(g.definition());
            }
        }
        rendering
    }
}

/// Per-request resolution of every label element.
struct ResolvedFields {
    check_in: Rendering,
    reagent: (Rendering, Rendering),
    batch: (Rendering, Rendering),
    expiry: (Rendering, Rendering),
    entry: (Rendering, Rendering),
    check_out: Rendering,
    person: Rendering,
    checkout_date: Rendering,
    new_batch_marker: Rendering,
    qualified_marker: Rendering,
    /// `~DGR` definitions for every dynamic graphic above, deduped
    dynamic_definitions: Vec<String>,
}

/// Emit a single positioned element.
fn emit_element(lines: &mut Vec<String>, x: u32, y: u32, rendering: &Rendering) {
    match rendering {
        Rendering::Graphic(g) => lines.push(commands::recall_graphic(x, y, &g.name)),
        Rendering::Native { text, bold } => {
            if *bold {
                lines.push(commands::text_field_bold(x, y, NATIVE_FONT_SIZE, text));
            } else {
                lines.push(commands::text_field(x, y, NATIVE_FONT_SIZE, text));
            }
        }
    }
}

/// Emit a caption + value row. When both degrade to native text they
/// merge into one directive carrying the full literal string.
fn emit_field_row(lines: &mut Vec<String>, y: u32, caption: &Rendering, value: &Rendering) {
    if let (Rendering::Native { text: c, .. }, Rendering::Native { text: v, .. }) =
        (caption, value)
    {
        lines.push(commands::text_field(
            X_MARGIN,
            y,
            NATIVE_FONT_SIZE,
            &format!("{}{}", c, v),
        ));
        return;
    }
    emit_element(lines, X_MARGIN, y, caption);
    emit_element(lines, X_MARGIN + CAPTION_WIDTH + CHAR_SPACING, y, value);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::LabelRecord;
    use chrono::NaiveDate;

    fn sample_record() -> LabelRecord {
        LabelRecord {
            reagent_name: "AFP".to_string(),
            batch_number: "AFP001".to_string(),
            expiry_date: NaiveDate::from_ymd_opt(2025, 8, 31).unwrap(),
            entry_date: NaiveDate::from_ymd_opt(2025, 8, 20)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap(),
            quantity: 1,
        }
    }

    fn compose_without_font(copies: u32, new_batch: bool) -> Vec<String> {
        let resolver = FontResolver::unavailable();
        let fixed = FixedGraphics::build(&resolver);
        let composer = LayoutComposer::new(&fixed, &resolver);
        let request = RenderRequest::new(sample_record(), copies, new_batch).unwrap();
        composer.compose(&request)
    }

    #[test]
    fn test_block_count_matches_copies() {
        assert_eq!(compose_without_font(5, true).len(), 5);
        assert_eq!(compose_without_font(1, false).len(), 1);
    }

    #[test]
    fn test_blocks_are_bracketed_exactly_once() {
        for block in compose_without_font(3, true) {
            assert!(block.starts_with("^XA\n"));
            assert!(block.ends_with("^XZ\n"));
            assert_eq!(block.matches("^XA").count(), 1);
            assert_eq!(block.matches("^XZ").count(), 1);
        }
    }

    #[test]
    fn test_only_first_copy_of_new_batch_differs() {
        let blocks = compose_without_font(5, true);
        // Copy 0: double border + new-batch marker.
        assert_eq!(blocks[0].matches("^GB").count(), 2);
        assert!(blocks[0].contains(">>新批號<<"));
        assert!(!blocks[0].contains("(允收合格)"));
        // Copies 1..: single border + qualified marker, all identical.
        for block in &blocks[1..] {
            assert_eq!(block.matches("^GB").count(), 1);
            assert!(block.contains("(允收合格)"));
            assert!(!block.contains(">>新批號<<"));
            assert_eq!(block, &blocks[1]);
        }
    }

    #[test]
    fn test_not_new_batch_renders_all_copies_identically() {
        let blocks = compose_without_font(3, false);
        assert!(blocks.iter().all(|b| b == &blocks[0]));
        assert!(blocks[0].contains("(允收合格)"));
        assert_eq!(blocks[0].matches("^GB").count(), 1);
    }

    #[test]
    fn test_degraded_blocks_carry_every_field_literally() {
        for block in compose_without_font(2, false) {
            for needle in ["AFP", "AFP001", "2025/08/31", "2025/08/20"] {
                assert!(block.contains(needle), "missing {:?}", needle);
            }
            for caption in [
                Caption::CheckIn,
                Caption::ReagentName,
                Caption::Batch,
                Caption::Expiry,
                Caption::EntryDate,
                Caption::CheckOut,
                Caption::Person,
                Caption::CheckoutDate,
            ] {
                assert!(block.contains(caption.text()), "missing {:?}", caption);
            }
        }
    }

    #[test]
    fn test_degraded_rows_merge_caption_and_value() {
        let blocks = compose_without_font(1, false);
        assert!(blocks[0].contains("^FD試劑名稱:AFP^FS"));
        assert!(blocks[0].contains("^FD試劑批號:AFP001^FS"));
    }

    #[test]
    fn test_native_marker_position_scales_with_batch_length() {
        let blocks = compose_without_font(1, true);
        // 20 + 80 + 22 + 6 chars * 11 = 188, bold designator.
        assert!(blocks[0].contains("^FO188,85^A0B,22,22^FD>>新批號<<^FS"));
    }

    #[test]
    fn test_dimension_directives_present() {
        let blocks = compose_without_font(1, false);
        assert!(blocks[0].contains("^PW394"));
        assert!(blocks[0].contains("^LL276"));
    }

    #[test]
    fn test_graphic_path_reemits_definitions_per_block() {
        let resolver = FontResolver::new();
        let fixed = FixedGraphics::build(&resolver);
        if fixed.is_empty() {
            return; // host has no font; degradation covered elsewhere
        }
        let composer = LayoutComposer::new(&fixed, &resolver);
        let request = RenderRequest::new(sample_record(), 3, false).unwrap();
        let blocks = composer.compose(&request);
        for block in &blocks {
            // Every fixed caption defined in every block.
            assert_eq!(block.matches("~DGR:ITEM_").count(), fixed.len());
            // Dynamic values defined and recalled.
            assert!(block.contains("~DGR:DYN_"));
            assert!(block.contains("^XGDYN_"));
        }
        assert!(blocks.iter().all(|b| b == &blocks[0]));
    }
}
