//! Text handling: span markup, measurement and elision.

pub mod ellipsize;
pub mod markup;
pub mod sizer;

pub use ellipsize::elide;
pub use markup::{parse_spans, Span};
pub use sizer::{CosmicSizer, RasterGlyph, TextSizer};

/// Deterministic sizer for layout tests: every character is 8px wide on
/// a 16px line, regardless of font.
#[cfg(test)]
pub(crate) struct FixedSizer;

#[cfg(test)]
impl TextSizer for FixedSizer {
    fn measure(&mut self, spans: &[Span], _font: &barre_markup::FontSpec) -> (f32, f32) {
        let width: usize = spans.iter().map(|s| s.text.chars().count()).sum();
        (width as f32 * 8.0, 16.0)
    }
}
