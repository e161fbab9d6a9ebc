//! # Text Rasterization
//!
//! Renders a string into a tight monochrome bitmap using a scalable
//! font. The bitmap is sized to the text's true ink box plus a fixed
//! padding margin — not a fixed canvas — so graphics stay as small as
//! the protocol payload allows.
//!
//! ## Pixel Convention
//!
//! The rasterizer's native convention is **0 = ink (black),
//! 1 = background (white)**. This matters: the protocol encoder in
//! [`crate::protocol::graphics`] inverts it, because the printer's
//! graphic format uses 1 = mark.
//!
//! ## Ink Box
//!
//! ```text
//!        ┌───────────────────────────┐ ─┬─ padding (6 px)
//!        │   ██ ██  ████  ██████     │  │
//!        │   ██ ██  ██ ██   ██       │  │ ink box height
//!        │   █████  ████    ██       │  │ (top may start above the
//!        │   ██ ██  ██      ██       │  │  baseline: ascenders give
//!        │   ██ ██  ██      ██       │  │  a negative top offset)
//!        └───────────────────────────┘ ─┴─ padding (6 px)
//! ```
//!
//! The draw origin is shifted by the negative top offset so ascenders
//! are never clipped.
//!
//! ## Determinism
//!
//! Same (text, font, size) always yields a byte-identical bitmap;
//! nothing here depends on ambient state.

use ab_glyph::{Font, FontArc, GlyphId, ScaleFont, point};

use crate::error::EtiquetaError;

/// Pixel value for drawn text
pub const INK: u8 = 0;
/// Pixel value for empty space
pub const BACKGROUND: u8 = 1;

/// Padding added on every side of the ink box, in pixels.
pub const PADDING: usize = 6;

/// Coverage threshold above which an anti-aliased sample counts as ink.
const INK_THRESHOLD: f32 = 0.5;

/// A monochrome bitmap with value semantics.
///
/// Row-major, one byte per pixel, using the [`INK`]/[`BACKGROUND`]
/// convention. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonoBitmap {
    pub width: usize,
    pub height: usize,
    /// `width * height` bytes, row-major, top row first
    pub pixels: Vec<u8>,
}

impl MonoBitmap {
    /// An all-background bitmap.
    pub fn blank(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            pixels: vec![BACKGROUND; width * height],
        }
    }

    /// Pixel at (x, y). Out-of-range reads count as background, which
    /// is also how the bit packer treats a partial trailing byte.
    #[inline]
    pub fn get(&self, x: usize, y: usize) -> u8 {
        if x < self.width && y < self.height {
            self.pixels[y * self.width + x]
        } else {
            BACKGROUND
        }
    }
}

/// Rasterize `text` with `font` at `px_height` pixels.
///
/// Measures the ink bounding box across all glyph outlines, allocates
/// the padded box, and draws with the vertical origin compensated for
/// a negative top offset.
///
/// ## Errors
///
/// [`EtiquetaError::Rasterization`] when the text produces no ink at
/// all (empty string, whitespace, or every glyph missing from the
/// font). Callers degrade to a native-font draw of the same literal
/// text, so content is never lost.
pub fn rasterize(
    text: &str,
    font: &FontArc,
    px_height: f32,
) -> Result<MonoBitmap, EtiquetaError> {
    let scaled = font.as_scaled(px_height);

    // Lay out glyphs along the baseline by horizontal advance.
    let mut glyphs: Vec<(GlyphId, f32)> = Vec::new();
    let mut caret_x = 0.0f32;
    for ch in text.chars() {
        let glyph_id = font.glyph_id(ch);
        glyphs.push((glyph_id, caret_x));
        caret_x += scaled.h_advance(glyph_id);
    }

    // Measure the true ink box (baseline at y = 0, so the top is
    // negative for anything with an ascender).
    let mut left = i32::MAX;
    let mut top = i32::MAX;
    let mut right = i32::MIN;
    let mut bottom = i32::MIN;
    let mut outlines = Vec::new();

    for &(glyph_id, glyph_x) in &glyphs {
        let glyph = glyph_id.with_scale_and_position(px_height, point(glyph_x, 0.0));
        if let Some(outlined) = font.outline_glyph(glyph) {
            let bounds = outlined.px_bounds();
            left = left.min(bounds.min.x.floor() as i32);
            top = top.min(bounds.min.y.floor() as i32);
            right = right.max(bounds.max.x.ceil() as i32);
            bottom = bottom.max(bounds.max.y.ceil() as i32);
            outlines.push(outlined);
        }
    }

    if outlines.is_empty() || right <= left || bottom <= top {
        return Err(EtiquetaError::Rasterization(format!(
            "text {:?} produced no ink",
            text
        )));
    }

    let ink_width = (right - left) as usize;
    let ink_height = (bottom - top) as usize;
    let width = ink_width + PADDING * 2;
    let height = ink_height + PADDING * 2;

    let mut pixels = vec![BACKGROUND; width * height];

    for outlined in &outlines {
        let bounds = outlined.px_bounds();
        // Shift so the ink box's top-left lands at (PADDING, PADDING);
        // this is what compensates for the negative top offset.
        let origin_x = bounds.min.x.floor() as i32 - left + PADDING as i32;
        let origin_y = bounds.min.y.floor() as i32 - top + PADDING as i32;

        outlined.draw(|px, py, coverage| {
            if coverage < INK_THRESHOLD {
                return;
            }
            let x = px as i32 + origin_x;
            let y = py as i32 + origin_y;
            if x >= 0 && (x as usize) < width && y >= 0 && (y as usize) < height {
                pixels[y as usize * width + x as usize] = INK;
            }
        });
    }

    Ok(MonoBitmap {
        width,
        height,
        pixels,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::font::{FontResolver, FontWeight};

    /// Host-font guard: rasterizer tests need a real font file.
    fn host_font() -> Option<FontArc> {
        FontResolver::new()
            .resolve(FontWeight::Regular)
            .map(|f| f.font)
    }

    #[test]
    fn test_blank_bitmap() {
        let bitmap = MonoBitmap::blank(10, 4);
        assert_eq!(bitmap.pixels.len(), 40);
        assert!(bitmap.pixels.iter().all(|&p| p == BACKGROUND));
    }

    #[test]
    fn test_out_of_range_reads_are_background() {
        let bitmap = MonoBitmap::blank(3, 3);
        assert_eq!(bitmap.get(99, 0), BACKGROUND);
        assert_eq!(bitmap.get(0, 99), BACKGROUND);
    }

    #[test]
    fn test_rasterize_produces_padded_ink_box() {
        let Some(font) = host_font() else { return };
        let bitmap = rasterize("AFP", &font, 22.0).unwrap();
        // Padded on all sides: strictly larger than the padding frame.
        assert!(bitmap.width > PADDING * 2);
        assert!(bitmap.height > PADDING * 2);
        // Some ink must exist, and the outer padding ring must be clean.
        assert!(bitmap.pixels.iter().any(|&p| p == INK));
        for x in 0..bitmap.width {
            assert_eq!(bitmap.get(x, 0), BACKGROUND);
            assert_eq!(bitmap.get(x, bitmap.height - 1), BACKGROUND);
        }
    }

    #[test]
    fn test_rasterize_is_deterministic() {
        let Some(font) = host_font() else { return };
        let a = rasterize("試劑名稱:", &font, 22.0).unwrap();
        let b = rasterize("試劑名稱:", &font, 22.0).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_whitespace_is_a_rasterization_error() {
        let Some(font) = host_font() else { return };
        assert!(rasterize("   ", &font, 22.0).is_err());
        assert!(rasterize("", &font, 22.0).is_err());
    }
}
