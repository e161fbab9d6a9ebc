//! # Label Printer Geometry
//!
//! This module defines the fixed physical label geometry used by both
//! rendering paths.
//!
//! ## Label Stock
//!
//! | Property | Value |
//! |----------|-------|
//! | Label size | 50mm × 35mm |
//! | Resolution | 203 DPI (~8 dots/mm) |
//! | Device size | 394 × 276 dots |
//!
//! The device constants 394×276 do not round-trip exactly through
//! `mm × dpi / 25.4` — they are the values the production label layout
//! was tuned against, and every position constant in
//! [`crate::layout`] assumes them. Do not derive them.

/// # Label Geometry
///
/// Device-unit dimensions of one label plus DPI for mm conversions.
///
/// ## Usage
///
/// ```
/// use etiqueta::printer::LabelGeometry;
///
/// let geo = LabelGeometry::GK420T_50X35;
/// assert_eq!(geo.width_dots, 394);
/// assert_eq!(geo.height_dots, 276);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct LabelGeometry {
    /// Printer/stock description
    pub name: &'static str,

    /// Label width in dots (print-line direction)
    pub width_dots: u32,

    /// Label height in dots (feed direction)
    pub height_dots: u32,

    /// Label width in millimeters
    pub width_mm: f64,

    /// Label height in millimeters
    pub height_mm: f64,

    /// Resolution in dots per inch
    pub dpi: u16,
}

impl LabelGeometry {
    /// # Zebra GK420t with 50×35mm stock
    ///
    /// The single label geometry this crate targets.
    pub const GK420T_50X35: Self = Self {
        name: "Zebra GK420t 50x35mm",
        width_dots: 394,
        height_dots: 276,
        width_mm: 50.0,
        height_mm: 35.0,
        dpi: 203,
    };

    /// Dots per millimeter at this resolution
    #[inline]
    pub fn dots_per_mm(&self) -> f64 {
        self.dpi as f64 / 25.4
    }

    /// Convert millimeters to dots (rounded)
    #[inline]
    pub fn mm_to_dots(&self, mm: f64) -> u32 {
        (mm * self.dots_per_mm()).round() as u32
    }
}

impl Default for LabelGeometry {
    fn default() -> Self {
        Self::GK420T_50X35
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_device_constants() {
        let geo = LabelGeometry::GK420T_50X35;
        assert_eq!(geo.width_dots, 394);
        assert_eq!(geo.height_dots, 276);
        assert_eq!(geo.dpi, 203);
    }

    #[test]
    fn test_dots_per_mm() {
        let geo = LabelGeometry::GK420T_50X35;
        // 203 DPI ≈ 8 dots/mm
        assert!((geo.dots_per_mm() - 8.0).abs() < 0.1);
    }

    #[test]
    fn test_mm_to_dots() {
        let geo = LabelGeometry::GK420T_50X35;
        // 10mm ≈ 80 dots
        let dots = geo.mm_to_dots(10.0);
        assert!((dots as i64 - 80).abs() < 2);
    }

    #[test]
    fn test_default_is_gk420t() {
        assert_eq!(LabelGeometry::default().name, LabelGeometry::GK420T_50X35.name);
    }
}
