//! PNG export of rasterized bitmaps, for checking what a graphic will
//! look like before burning label stock.

use image::{GrayImage, Luma};

use crate::error::EtiquetaError;
use crate::render::raster::{INK, MonoBitmap};

/// Encode a bitmap as an 8-bit grayscale PNG (ink black, background
/// white).
pub fn to_png(bitmap: &MonoBitmap) -> Result<Vec<u8>, EtiquetaError> {
    let mut img = GrayImage::new(bitmap.width as u32, bitmap.height as u32);
    for y in 0..bitmap.height {
        for x in 0..bitmap.width {
            let value = if bitmap.get(x, y) == INK { 0u8 } else { 255u8 };
            img.put_pixel(x as u32, y as u32, Luma([value]));
        }
    }

    let mut out = std::io::Cursor::new(Vec::new());
    img.write_to(&mut out, image::ImageFormat::Png)
        .map_err(|e| EtiquetaError::Encoding(format!("PNG encode failed: {}", e)))?;
    Ok(out.into_inner())
}
