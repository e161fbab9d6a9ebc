//! # Error Types
//!
//! This module defines error types used throughout the etiqueta library.
//!
//! Font and rasterization failures are recoverable by design: callers
//! degrade to the printer's native font instead of aborting a render.
//! The only errors a render call ever surfaces are invalid requests
//! (e.g. zero copies) and transport/IO failures after content was
//! already generated.

use thiserror::Error;

/// Main error type for etiqueta operations
#[derive(Debug, Error)]
pub enum EtiquetaError {
    /// No CJK-capable font was found among the candidate paths.
    /// Recoverable: callers fall back to native-font rendering.
    #[error("No CJK-capable font found")]
    FontUnavailable,

    /// Measuring or drawing a specific string failed.
    /// Recoverable per string: the same literal text is drawn with
    /// the printer's native font instead.
    #[error("Rasterization failed: {0}")]
    Rasterization(String),

    /// Bitmap-to-hex packing failed (internal invariant violation,
    /// e.g. a zero-sized bitmap). Treated like a rasterization failure.
    #[error("Graphic encoding failed: {0}")]
    Encoding(String),

    /// Sending composed command blocks to the device failed.
    /// Recovered by persisting the blocks to a file.
    #[error("Transport error: {0}")]
    Transport(String),

    /// A render request that violates its contract (copies == 0, ...)
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// I/O error wrapper
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
