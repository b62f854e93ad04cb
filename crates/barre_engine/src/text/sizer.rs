//! Text measurement and rasterization.
//!
//! Layout only needs sizes, so the seam between evaluation and the font
//! stack is the [`TextSizer`] trait. [`CosmicSizer`] is the production
//! implementation on top of cosmic-text.

use barre_markup::{Color, FontSpec};
use cosmic_text::{
    Attrs, Buffer, Family, FontSystem, Metrics, Shaping, Style, SwashCache, SwashContent, Weight,
};

use crate::text::Span;

/// Measures styled text for layout purposes.
pub trait TextSizer {
    /// Total advance width and line height of the spans in one row.
    fn measure(&mut self, spans: &[Span], font: &FontSpec) -> (f32, f32);

    /// Width of a plain string in the base font.
    fn measure_str(&mut self, text: &str, font: &FontSpec) -> f32 {
        self.measure(&[Span::plain(text)], font).0
    }
}

/// One rasterized glyph positioned in bar coordinates.
pub struct RasterGlyph {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
    /// Alpha mask when `mask` is set, RGBA8 otherwise.
    pub data: Vec<u8>,
    pub mask: bool,
    pub color: Color,
}

/// Shapes and rasterizes text with cosmic-text.
pub struct CosmicSizer {
    font_system: FontSystem,
    swash: SwashCache,
}

impl CosmicSizer {
    pub fn new() -> Self {
        Self {
            font_system: FontSystem::new(),
            swash: SwashCache::new(),
        }
    }

    fn shape(&mut self, span: &Span, font: &FontSpec) -> Buffer {
        let metrics = Metrics::new(font.size, font.size * 1.2);
        let mut buffer = Buffer::new(&mut self.font_system, metrics);
        let mut attrs = Attrs::new().family(Family::Name(&font.family));
        if font.bold || span.bold {
            attrs = attrs.weight(Weight::BOLD);
        }
        if font.italic || span.italic {
            attrs = attrs.style(Style::Italic);
        }
        buffer.set_text(&mut self.font_system, &span.text, &attrs, Shaping::Advanced, None);
        buffer.shape_until_scroll(&mut self.font_system, false);
        buffer
    }

    /// Rasterize spans at `(origin_x, origin_y)`, advancing horizontally
    /// span by span.
    pub fn rasterize(
        &mut self,
        spans: &[Span],
        font: &FontSpec,
        base_color: Color,
        origin_x: f32,
        origin_y: f32,
    ) -> Vec<RasterGlyph> {
        let mut glyphs = Vec::new();
        let mut pen_x = origin_x;
        for span in spans {
            let buffer = self.shape(span, font);
            let color = span.fg.unwrap_or(base_color);
            let mut advance = 0.0f32;
            for run in buffer.layout_runs() {
                advance = advance.max(run.line_w);
                for glyph in run.glyphs {
                    let physical = glyph.physical((pen_x, origin_y), 1.0);
                    let Some(img) = self
                        .swash
                        .get_image_uncached(&mut self.font_system, physical.cache_key)
                    else {
                        continue;
                    };
                    let mask = match img.content {
                        SwashContent::Mask => true,
                        SwashContent::Color => false,
                        SwashContent::SubpixelMask => continue,
                    };
                    if img.placement.width == 0 || img.placement.height == 0 {
                        continue;
                    }
                    glyphs.push(RasterGlyph {
                        x: physical.x + img.placement.left,
                        y: physical.y + run.line_y.round() as i32 - img.placement.top,
                        width: img.placement.width,
                        height: img.placement.height,
                        data: img.data,
                        mask,
                        color,
                    });
                }
            }
            pen_x += advance;
        }
        glyphs
    }
}

impl Default for CosmicSizer {
    fn default() -> Self {
        Self::new()
    }
}

impl TextSizer for CosmicSizer {
    fn measure(&mut self, spans: &[Span], font: &FontSpec) -> (f32, f32) {
        let mut width = 0.0f32;
        let mut height = 0.0f32;
        for span in spans {
            let buffer = self.shape(span, font);
            let mut span_w = 0.0f32;
            for run in buffer.layout_runs() {
                span_w = span_w.max(run.line_w);
            }
            width += span_w;
            height = height.max(buffer.metrics().line_height);
        }
        if height == 0.0 {
            height = font.size * 1.2;
        }
        (width, height)
    }
}
