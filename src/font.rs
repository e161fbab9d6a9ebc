//! # Font Resolution
//!
//! Locates a scalable font capable of rendering CJK text, for the
//! graphic-download rendering path and for PDF font embedding.
//!
//! The target printers' built-in fonts render CJK unreliably, so every
//! caption and value is rasterized with a local TrueType/OpenType font
//! instead. Resolution walks an ordered candidate list; a missing or
//! unparsable file means "try the next candidate", never an error.
//! When the list is exhausted the caller degrades to the printer's
//! native font — a render is never aborted over a missing font.

use std::fs;
use std::path::{Path, PathBuf};

use ab_glyph::FontArc;
use log::{debug, warn};

/// Requested font weight.
///
/// Bold is only used for the new-batch marker; everything else on the
/// label is regular weight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FontWeight {
    Regular,
    Bold,
}

/// A successfully loaded font.
///
/// Keeps the raw file bytes alongside the parsed font so the PDF path
/// can embed the same program that rasterized the graphics.
#[derive(Clone)]
pub struct ResolvedFont {
    /// Parsed font, ready for glyph outlines and metrics
    pub font: FontArc,
    /// Raw font file contents (TTF/TTC/OTF)
    pub data: Vec<u8>,
    /// Path the font was loaded from
    pub path: PathBuf,
}

impl std::fmt::Debug for ResolvedFont {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResolvedFont")
            .field("path", &self.path)
            .field("bytes", &self.data.len())
            .finish()
    }
}

/// Ordered candidate font paths for CJK-capable label text.
///
/// Windows hosts carry Microsoft JhengHei; Linux hosts typically have
/// Noto Sans CJK. The regular list ends with the bold faces as a last
/// resort, matching how labels have historically been produced when
/// only the bold face was installed.
#[derive(Debug, Clone)]
pub struct FontResolver {
    regular: Vec<PathBuf>,
    bold: Vec<PathBuf>,
}

const REGULAR_CANDIDATES: &[&str] = &[
    "C:/Windows/Fonts/msjh.ttc",
    "C:/Windows/Fonts/msjhbd.ttc",
    "/usr/share/fonts/opentype/noto/NotoSansCJK-Regular.ttc",
    "/usr/share/fonts/noto-cjk/NotoSansCJK-Regular.ttc",
    "/System/Library/Fonts/PingFang.ttc",
];

const BOLD_CANDIDATES: &[&str] = &[
    "C:/Windows/Fonts/msjhbd.ttc",
    "C:/Windows/Fonts/msyhbd.ttc",
    "/usr/share/fonts/opentype/noto/NotoSansCJK-Bold.ttc",
    "/usr/share/fonts/noto-cjk/NotoSansCJK-Bold.ttc",
];

impl FontResolver {
    /// Resolver with the built-in candidate lists.
    pub fn new() -> Self {
        Self {
            regular: REGULAR_CANDIDATES.iter().map(PathBuf::from).collect(),
            bold: BOLD_CANDIDATES.iter().map(PathBuf::from).collect(),
        }
    }

    /// Resolver with explicit candidate lists (tests, custom installs).
    pub fn with_candidates(
        regular: Vec<PathBuf>,
        bold: Vec<PathBuf>,
    ) -> Self {
        Self { regular, bold }
    }

    /// A resolver that never finds a font. Used to exercise the
    /// native-font degradation path.
    pub fn unavailable() -> Self {
        Self {
            regular: Vec::new(),
            bold: Vec::new(),
        }
    }

    /// Try to load a font of the requested weight.
    ///
    /// Bold tries the bold list first and falls back to the regular
    /// list, so a bold request still succeeds (at regular weight) on
    /// hosts without a bold face. Returns `None` only when every
    /// candidate failed.
    pub fn resolve(&self, weight: FontWeight) -> Option<ResolvedFont> {
        let candidates: Vec<&Path> = match weight {
            FontWeight::Regular => self.regular.iter().map(PathBuf::as_path).collect(),
            FontWeight::Bold => self
                .bold
                .iter()
                .chain(self.regular.iter())
                .map(PathBuf::as_path)
                .collect(),
        };

        for path in candidates {
            match try_load(path) {
                Some(font) => {
                    debug!("resolved {:?} font from {}", weight, path.display());
                    return Some(font);
                }
                None => continue,
            }
        }

        warn!(
            "no {:?}-weight CJK font found; falling back to native printer font",
            weight
        );
        None
    }

    /// Whether any regular-weight candidate loads.
    pub fn available(&self) -> bool {
        self.resolve(FontWeight::Regular).is_some()
    }
}

impl Default for FontResolver {
    fn default() -> Self {
        Self::new()
    }
}

/// Load one candidate. Any failure (missing file, parse error) returns
/// `None` so the resolver moves on.
fn try_load(path: &Path) -> Option<ResolvedFont> {
    let data = fs::read(path).ok()?;
    // For .ttc collections this takes the first face, which is the
    // CJK face in every candidate above.
    let font = FontArc::try_from_vec(data.clone()).ok()?;
    Some(ResolvedFont {
        font,
        data,
        path: path.to_path_buf(),
    })
}
