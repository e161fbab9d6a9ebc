//! # Graphic-Download Encoding
//!
//! Packs a monochrome bitmap into the printer's `~DGR` graphic format:
//! a named, row-major, byte-per-8-pixels binary image rendered as an
//! uppercase ASCII hex payload.
//!
//! ## Bit Packing
//!
//! Each byte covers 8 horizontal pixels; bit 7 (MSB) is the leftmost
//! pixel of the group. Pixels past the right edge in a partial
//! trailing byte are background.
//!
//! ```text
//! Byte value 0xF0 = 11110000 = ████░░░░
//! Byte value 0x0F = 00001111 = ░░░░████
//! Byte value 0xAA = 10101010 = █░█░█░█░
//! ```
//!
//! ## Pixel Inversion
//!
//! The rasterizer's convention is 0 = ink, 1 = background
//! (see [`crate::render::raster`]); the protocol wants 1 = mark,
//! 0 = blank. The packer inverts: rasterizer ink (0) becomes protocol
//! bit 1.
//!
//! ## Command Format
//!
//! ```text
//! ~DGR:NAME,ttttt,rrr,HEX...
//!       │    │     │   └─ uppercase hex, 2 chars per byte, row-major
//!       │    │     └───── bytes per row, zero-padded to 3 digits
//!       │    └─────────── total bytes, zero-padded to 5 digits
//!       └──────────────── unique graphic name token
//! ```
//!
//! ## Invariants
//!
//! - `bytes_per_row == ceil(width / 8)`
//! - `total_bytes == bytes_per_row * height`
//! - `hex_payload.len() == total_bytes * 2`

use crate::error::EtiquetaError;
use crate::render::raster::{INK, MonoBitmap};

/// An encoded graphic, immutable once produced.
///
/// Fixed graphics are produced once at startup and live for the
/// process; dynamic graphics are produced per distinct string value
/// within one render call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedGraphic {
    /// Unique name token referenced by `^XG`
    pub name: String,
    /// Total payload size in bytes
    pub total_bytes: usize,
    /// Bytes per bitmap row
    pub bytes_per_row: usize,
    /// Uppercase hex payload, row-major
    pub hex_payload: String,
}

impl EncodedGraphic {
    /// Render the graphic-definition directive.
    ///
    /// The field widths are fixed: 5-digit total byte count, 3-digit
    /// bytes-per-row, both zero-padded.
    pub fn definition(&self) -> String {
        format!(
            "~DGR:{},{:05},{:03},{}",
            self.name, self.total_bytes, self.bytes_per_row, self.hex_payload
        )
    }
}

/// Pack a bitmap into an [`EncodedGraphic`] named `name`.
///
/// Rows are packed top to bottom; within a row, pixels are grouped
/// into bytes left to right with the MSB as the leftmost pixel.
///
/// ## Errors
///
/// [`EtiquetaError::Encoding`] on a zero-sized bitmap. This only
/// happens on an internal invariant violation — the rasterizer never
/// returns an empty bitmap — and callers treat it exactly like a
/// rasterization failure for that string.
pub fn pack(name: impl Into<String>, bitmap: &MonoBitmap) -> Result<EncodedGraphic, EtiquetaError> {
    if bitmap.width == 0 || bitmap.height == 0 {
        return Err(EtiquetaError::Encoding(format!(
            "zero-sized bitmap ({}x{})",
            bitmap.width, bitmap.height
        )));
    }

    let bytes_per_row = bitmap.width.div_ceil(8);
    let total_bytes = bytes_per_row * bitmap.height;
    let mut hex_payload = String::with_capacity(total_bytes * 2);

    for y in 0..bitmap.height {
        for byte_index in 0..bytes_per_row {
            let mut byte = 0u8;
            for bit in 0..8 {
                let x = byte_index * 8 + bit;
                // get() treats x >= width as background, so a partial
                // trailing byte pads with 0 bits.
                if bitmap.get(x, y) == INK {
                    byte |= 1 << (7 - bit);
                }
            }
            hex_payload.push_str(&format!("{:02X}", byte));
        }
    }

    Ok(EncodedGraphic {
        name: name.into(),
        total_bytes,
        bytes_per_row,
        hex_payload,
    })
}
