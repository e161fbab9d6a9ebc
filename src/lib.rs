//! # Etiqueta - Reagent Inventory Label Printing
//!
//! Etiqueta renders reagent check-in labels and encodes them for Zebra
//! thermal printers via ZPL. It provides:
//!
//! - **Text rasterization**: CJK caption rendering with a system font
//! - **Protocol implementation**: ZPL command and graphic builders
//! - **Layout composition**: per-copy label blocks with the
//!   first-copy new-batch rule
//! - **Vector output**: PDF documents for driver-based printing
//! - **Transport**: raw device writes with recovery-file fallback
//!
//! ## Quick Start
//!
//! ```no_run
//! use std::path::Path;
//! use chrono::NaiveDate;
//! use etiqueta::{
//!     font::FontResolver,
//!     layout::LayoutComposer,
//!     record::{LabelRecord, RenderRequest},
//!     render::cache::FixedGraphics,
//!     transport,
//! };
//!
//! // Resolve a CJK font and build the fixed caption graphics once.
//! let resolver = FontResolver::new();
//! let fixed = FixedGraphics::build(&resolver);
//!
//! // Describe the batch being checked in.
//! let record = LabelRecord {
//!     reagent_name: "AFP".to_string(),
//!     batch_number: "AFP001".to_string(),
//!     expiry_date: NaiveDate::from_ymd_opt(2025, 8, 31).unwrap(),
//!     entry_date: NaiveDate::from_ymd_opt(2025, 8, 20).unwrap().and_hms_opt(0, 0, 0).unwrap(),
//!     quantity: 5,
//! };
//! let request = RenderRequest::new(record, 5, true)?;
//!
//! // Compose one command block per copy and send them.
//! let composer = LayoutComposer::new(&fixed, &resolver);
//! let blocks = composer.compose(&request);
//! transport::dispatch(&request, &blocks, Path::new("/dev/usb/lp0"), Path::new("recovery"))?;
//!
//! # Ok::<(), etiqueta::EtiquetaError>(())
//! ```
//!
//! ## Module Overview
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`record`] | Label records and render requests |
//! | [`font`] | System CJK font discovery |
//! | [`render`] | Text rasterization and graphic caches |
//! | [`protocol`] | ZPL command and graphic builders |
//! | [`layout`] | Per-copy label composition |
//! | [`pdf`] | Vector (PDF) rendering |
//! | [`transport`] | Device writes and recovery files |
//! | [`printer`] | Label stock geometry |
//! | [`error`] | Error types |
//!
//! ## Supported Printers
//!
//! Currently tested with:
//! - Zebra GK420t (50 x 35 mm stock, 203 DPI)
//!
//! Other ZPL printers should work with appropriate geometry
//! adjustments.

pub mod error;
pub mod font;
pub mod layout;
pub mod pdf;
pub mod printer;
pub mod protocol;
pub mod record;
pub mod render;
pub mod transport;

// Re-exports for convenience
pub use error::EtiquetaError;
pub use printer::LabelGeometry;
pub use record::{LabelRecord, RenderRequest};
