//! # Graphic Caches
//!
//! Two lifetimes of encoded graphics feed the layout composer:
//!
//! - **Fixed graphics**: the closed set of caption strings
//!   ([`Caption`]), rendered and packed exactly once at process
//!   initialization into a [`FixedGraphics`] handle. If no font
//!   resolves at startup the set stays empty for the life of the
//!   process (no retry) and every caption degrades to native-font
//!   rendering.
//! - **Dynamic graphics**: record-specific strings (name, batch,
//!   dates), rendered lazily within one render call by a
//!   [`DynamicCache`], keyed by the literal string content.
//!
//! [`FixedGraphics`] is an explicit handle passed to the composer, not
//! ambient global state; rebuilding it is idempotent.

use std::collections::HashMap;
use std::hash::{DefaultHasher, Hash, Hasher};

use ab_glyph::FontArc;
use log::{debug, warn};

use crate::font::{FontResolver, FontWeight};
use crate::protocol::graphics::{EncodedGraphic, pack};
use crate::render::raster::rasterize;

/// Pixel height for all rasterized label text. Matches the native-font
/// character size so degraded and graphic rendering line up.
pub const CAPTION_FONT_PX: f32 = 22.0;

/// The closed set of caption strings printed on every label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Caption {
    /// 【入庫】 — check-in section title
    CheckIn,
    /// 試劑名稱: — reagent name field caption
    ReagentName,
    /// 試劑批號: — batch number field caption
    Batch,
    /// 穩定效期: — stability expiry field caption
    Expiry,
    /// 入庫日期: — entry date field caption
    EntryDate,
    /// 【出庫】 — check-out section title
    CheckOut,
    /// 人員: — handler field caption (left blank for a stamp)
    Person,
    /// 出庫日期: — check-out date caption (left blank)
    CheckoutDate,
    /// >>新批號<< — new-batch marker (bold)
    NewBatch,
    /// (允收合格) — previously-qualified marker
    Qualified,
}

impl Caption {
    /// All captions, in no particular order (layout order lives in
    /// [`crate::layout`]).
    pub const ALL: [Caption; 10] = [
        Caption::CheckIn,
        Caption::ReagentName,
        Caption::Batch,
        Caption::Expiry,
        Caption::EntryDate,
        Caption::CheckOut,
        Caption::Person,
        Caption::CheckoutDate,
        Caption::NewBatch,
        Caption::Qualified,
    ];

    /// The literal caption text.
    pub fn text(self) -> &'static str {
        match self {
            Caption::CheckIn => "【入庫】",
            Caption::ReagentName => "試劑名稱:",
            Caption::Batch => "試劑批號:",
            Caption::Expiry => "穩定效期:",
            Caption::EntryDate => "入庫日期:",
            Caption::CheckOut => "【出庫】",
            Caption::Person => "人員:",
            Caption::CheckoutDate => "出庫日期:",
            Caption::NewBatch => ">>新批號<<",
            Caption::Qualified => "(允收合格)",
        }
    }

    /// The graphic name token used in `~DGR` / `^XG` directives.
    pub fn token(self) -> &'static str {
        match self {
            Caption::CheckIn => "ITEM_IN",
            Caption::ReagentName => "ITEM_REAGENT_NAME",
            Caption::Batch => "ITEM_BATCH",
            Caption::Expiry => "ITEM_EXPIRY",
            Caption::EntryDate => "ITEM_ENTRY_DATE",
            Caption::CheckOut => "ITEM_OUT",
            Caption::Person => "ITEM_PERSON",
            Caption::CheckoutDate => "ITEM_CHECKOUT_DATE",
            Caption::NewBatch => "ITEM_NEW_BATCH",
            Caption::Qualified => "ITEM_QUALIFIED",
        }
    }

    /// Only the new-batch marker is rendered bold.
    pub fn bold(self) -> bool {
        matches!(self, Caption::NewBatch)
    }
}

/// Precomputed graphics for the fixed caption set.
///
/// Built once at startup; read-only afterwards.
#[derive(Debug, Default)]
pub struct FixedGraphics {
    graphics: HashMap<Caption, EncodedGraphic>,
}

impl FixedGraphics {
    /// Render and pack every caption. Never fails: captions that
    /// cannot be rasterized are simply absent, and absent captions
    /// degrade to native-font rendering at layout time.
    pub fn build(resolver: &FontResolver) -> Self {
        let Some(regular) = resolver.resolve(FontWeight::Regular) else {
            warn!("no font available; fixed caption graphics disabled for this process");
            return Self::default();
        };
        // The bold resolve falls back to the regular list, so this is
        // Some whenever regular resolved.
        let bold = resolver
            .resolve(FontWeight::Bold)
            .map(|f| f.font)
            .unwrap_or_else(|| regular.font.clone());

        let mut graphics = HashMap::new();
        for caption in Caption::ALL {
            let font = if caption.bold() { &bold } else { &regular.font };
            match rasterize(caption.text(), font, CAPTION_FONT_PX)
                .and_then(|bitmap| pack(caption.token(), &bitmap))
            {
                Ok(graphic) => {
                    graphics.insert(caption, graphic);
                }
                Err(e) => warn!("fixed graphic for {:?} unavailable: {}", caption, e),
            }
        }
        debug!("built {} fixed caption graphics", graphics.len());
        Self { graphics }
    }

    /// Look up a precomputed caption graphic.
    pub fn get(&self, caption: Caption) -> Option<&EncodedGraphic> {
        self.graphics.get(&caption)
    }

    pub fn len(&self) -> usize {
        self.graphics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.graphics.is_empty()
    }
}

/// Per-render cache of graphics for record-specific strings.
///
/// Scoped to one render call; not shared across calls, so no locking
/// is needed. Entries are keyed by the full `(text, bold)` pair — the
/// 64-bit content hash only names the graphic, it never decides cache
/// equality. Failed rasterizations are cached too, so a string that
/// cannot render is attempted once per call, not once per copy.
pub struct DynamicCache {
    regular: Option<FontArc>,
    bold: Option<FontArc>,
    entries: HashMap<(String, bool), Option<EncodedGraphic>>,
}

impl DynamicCache {
    /// Resolve fonts once for the whole render call.
    pub fn new(resolver: &FontResolver) -> Self {
        let regular = resolver.resolve(FontWeight::Regular).map(|f| f.font);
        let bold = resolver.resolve(FontWeight::Bold).map(|f| f.font);
        Self {
            regular,
            bold,
            entries: HashMap::new(),
        }
    }

    /// Get or render the graphic for `text`. Returns `None` when no
    /// font is available or the text cannot be rasterized; the caller
    /// falls back to native-font text.
    pub fn get_or_create(&mut self, text: &str, bold: bool) -> Option<&EncodedGraphic> {
        let font = if bold { &self.bold } else { &self.regular };
        self.entries
            .entry((text.to_string(), bold))
            .or_insert_with(|| {
                let font = font.as_ref()?;
                let graphic = rasterize(text, font, CAPTION_FONT_PX)
                    .and_then(|bitmap| pack(dynamic_token(text, bold), &bitmap));
                match graphic {
                    Ok(g) => Some(g),
                    Err(e) => {
                        warn!("dynamic graphic for {:?} unavailable: {}", text, e);
                        None
                    }
                }
            })
            .as_ref()
    }
}

/// Name token for a dynamic graphic: the full 64-bit content hash in
/// hex. Sixteen digits leave no truncation for distinct strings to
/// collide on; actual cache equality is still checked on the literal
/// string.
fn dynamic_token(text: &str, bold: bool) -> String {
    let mut hasher = DefaultHasher::new();
    text.hash(&mut hasher);
    bold.hash(&mut hasher);
    format!("DYN_{:016X}", hasher.finish())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_caption_texts_and_tokens_are_unique() {
        use std::collections::HashSet;
        let texts: HashSet<_> = Caption::ALL.iter().map(|c| c.text()).collect();
        let tokens: HashSet<_> = Caption::ALL.iter().map(|c| c.token()).collect();
        assert_eq!(texts.len(), Caption::ALL.len());
        assert_eq!(tokens.len(), Caption::ALL.len());
    }

    #[test]
    fn test_only_new_batch_is_bold() {
        for caption in Caption::ALL {
            assert_eq!(caption.bold(), caption == Caption::NewBatch);
        }
    }

    #[test]
    fn test_fixed_graphics_empty_without_font() {
        let fixed = FixedGraphics::build(&FontResolver::unavailable());
        assert!(fixed.is_empty());
        assert!(fixed.get(Caption::CheckIn).is_none());
    }

    #[test]
    fn test_fixed_graphics_build_is_idempotent() {
        let resolver = FontResolver::new();
        let first = FixedGraphics::build(&resolver);
        let second = FixedGraphics::build(&resolver);
        assert_eq!(first.len(), second.len());
        for caption in Caption::ALL {
            assert_eq!(first.get(caption), second.get(caption));
        }
    }

    #[test]
    fn test_dynamic_cache_without_font_returns_none() {
        let mut cache = DynamicCache::new(&FontResolver::unavailable());
        assert!(cache.get_or_create("AFP001", false).is_none());
        // And the failure is cached, not retried differently.
        assert!(cache.get_or_create("AFP001", false).is_none());
    }

    #[test]
    fn test_dynamic_cache_reuses_entries_by_content() {
        let resolver = FontResolver::new();
        if !resolver.available() {
            return;
        }
        let mut cache = DynamicCache::new(&resolver);
        let first = cache.get_or_create("AFP001", false).cloned();
        let second = cache.get_or_create("AFP001", false).cloned();
        assert_eq!(first, second);
        assert!(first.is_some());
    }

    #[test]
    fn test_dynamic_tokens_differ_by_content_and_weight() {
        assert_ne!(dynamic_token("AFP001", false), dynamic_token("AFP002", false));
        assert_ne!(dynamic_token("AFP001", false), dynamic_token("AFP001", true));
        assert_eq!(dynamic_token("AFP001", false), dynamic_token("AFP001", false));
    }

    #[test]
    fn test_dynamic_token_shape() {
        let token = dynamic_token("2025/08/31", false);
        assert!(token.starts_with("DYN_"));
        assert_eq!(token.len(), 4 + 16);
        assert!(token[4..].chars().all(|c| c.is_ascii_hexdigit()));
    }
}
