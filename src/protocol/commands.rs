//! # ZPL Commands
//!
//! This module implements the ZPL directives used for label layout:
//! delimiters, dimensions, field positioning, boxes, native-font text
//! and graphic recall.
//!
//! ## Protocol Overview
//!
//! ZPL is a textual protocol. Format commands start with `^`, download
//! commands with `~`. A printable field is bracketed by a field origin
//! (`^FO x,y`) and a field separator (`^FS`). Coordinates are device
//! dots with the origin at the label's top-left corner.
//!
//! ## Encoding
//!
//! Commands are emitted as UTF-8 text (native-font fallback fields may
//! carry CJK data) and must reach the printer byte-for-byte — the
//! transport layer disables any line-ending translation.

/// Label-start delimiter (`^XA`). Must open every label block.
pub const LABEL_START: &str = "^XA";

/// Label-end delimiter (`^XZ`). Must close every label block.
pub const LABEL_END: &str = "^XZ";

/// # Print Width (^PW)
///
/// Sets the print width in dots for the current label.
///
/// ## Example
///
/// ```
/// use etiqueta::protocol::commands;
///
/// assert_eq!(commands::print_width(394), "^PW394");
/// ```
#[inline]
pub fn print_width(dots: u32) -> String {
    format!("^PW{}", dots)
}

/// # Label Length (^LL)
///
/// Sets the label length (feed direction) in dots.
#[inline]
pub fn label_length(dots: u32) -> String {
    format!("^LL{}", dots)
}

/// # Graphic Box (^FO x,y ^GB w,h,t ^FS)
///
/// Draws a rectangle outline of thickness `t` dots with its top-left
/// corner at (x, y). Used for the label border: a single 2-dot box for
/// ordinary labels, an outer 6-dot plus inner 2-dot pair for the first
/// copy of a new batch.
///
/// ## Example
///
/// ```
/// use etiqueta::protocol::commands;
///
/// assert_eq!(commands::graphic_box(5, 5, 384, 266, 2), "^FO5,5^GB384,266,2^FS");
/// ```
#[inline]
pub fn graphic_box(x: u32, y: u32, width: u32, height: u32, thickness: u32) -> String {
    format!("^FO{},{}^GB{},{},{}^FS", x, y, width, height, thickness)
}

/// # Native-Font Text Field (^FO x,y ^A0N,h,w ^FD data ^FS)
///
/// Draws `text` with the printer's built-in scalable font at the given
/// character size. This is the degraded path: the built-in font's CJK
/// coverage is unreliable, so it is only used when rasterization is
/// unavailable — but the literal text is always emitted rather than
/// dropped.
#[inline]
pub fn text_field(x: u32, y: u32, size: u32, text: &str) -> String {
    format!("^FO{},{}^A0N,{},{}^FD{}^FS", x, y, size, size, text)
}

/// # Bold Native-Font Text Field (^A0B variant)
///
/// The `A0B` designator is what production labels use for the
/// new-batch marker when it degrades to native text; it is kept for
/// byte parity with labels already in circulation.
#[inline]
pub fn text_field_bold(x: u32, y: u32, size: u32, text: &str) -> String {
    format!("^FO{},{}^A0B,{},{}^FD{}^FS", x, y, size, size, text)
}

/// # Recall Graphic (^FO x,y ^XG name ^FS)
///
/// Places a previously defined graphic (see
/// [`crate::protocol::graphics`]) at (x, y).
///
/// ## Example
///
/// ```
/// use etiqueta::protocol::commands;
///
/// assert_eq!(commands::recall_graphic(20, 25, "ITEM_IN"), "^FO20,25^XGITEM_IN^FS");
/// ```
#[inline]
pub fn recall_graphic(x: u32, y: u32, name: &str) -> String {
    format!("^FO{},{}^XG{}^FS", x, y, name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_delimiters() {
        assert_eq!(LABEL_START, "^XA");
        assert_eq!(LABEL_END, "^XZ");
    }

    #[test]
    fn test_dimension_directives() {
        assert_eq!(print_width(394), "^PW394");
        assert_eq!(label_length(276), "^LL276");
    }

    #[test]
    fn test_graphic_box() {
        assert_eq!(graphic_box(10, 10, 374, 256, 2), "^FO10,10^GB374,256,2^FS");
    }

    #[test]
    fn test_text_field_square_size() {
        // Height and width multipliers are always equal on this layout.
        assert_eq!(
            text_field(20, 55, 22, "AFP"),
            "^FO20,55^A0N,22,22^FDAFP^FS"
        );
    }

    #[test]
    fn test_text_field_bold_designator() {
        assert_eq!(
            text_field_bold(222, 85, 22, ">>新批號<<"),
            "^FO222,85^A0B,22,22^FD>>新批號<<^FS"
        );
    }

    #[test]
    fn test_recall_graphic() {
        assert_eq!(
            recall_graphic(122, 55, "DYN_0011223344556677"),
            "^FO122,55^XGDYN_0011223344556677^FS"
        );
    }
}
