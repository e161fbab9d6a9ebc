//! # ZPL Label Protocol
//!
//! Builders for the textual ZPL command stream sent to the label
//! printer.
//!
//! ## Command Stream Shape
//!
//! One label is one self-contained block:
//!
//! ```text
//! ^XA                      label start
//! ^PW394                   print width (dots)
//! ^LL276                   label length (dots)
//! ^FO5,5^GB384,266,2^FS    border box
//! ~DGR:ITEM_IN,...         graphic definitions (re-emitted per label)
//! ^FO20,25^XGITEM_IN^FS    field: place a named graphic
//! ^FO20,55^A0N,22,22^FD...^FS  field: native-font text fallback
//! ^XZ                      label end
//! ```
//!
//! Blocks are stateless with respect to each other: the printer
//! requires every graphic used in a label to be defined within that
//! label, so definitions are repeated in every block.
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`commands`] | Positioning, boxes, native text, label delimiters |
//! | [`graphics`] | Bitmap packing into the `~DGR` graphic format |

pub mod commands;
pub mod graphics;

pub use graphics::{EncodedGraphic, pack};
