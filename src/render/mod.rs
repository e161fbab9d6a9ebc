//! # Text Rendering
//!
//! Rasterization of label text into monochrome bitmaps, plus the
//! fixed/dynamic graphic caches built on top of it.
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`raster`] | Ink-box measurement and 1-bit rasterization |
//! | [`cache`] | Caption set, fixed graphics, per-render dynamic cache |
//! | [`preview`] | PNG export of rasterized bitmaps |

pub mod cache;
pub mod preview;
pub mod raster;

pub use raster::{MonoBitmap, rasterize};
