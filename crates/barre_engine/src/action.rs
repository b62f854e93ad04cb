//! Render actions, the thread-shareable output of evaluation.
//!
//! An evaluation pass flattens the layout tree into a linear list of
//! [`Action`]s in paint order. Renderers only ever see this list, never
//! the transient layout tree that produced it.

use std::sync::Arc;

use barre_markup::{Color, Ellipsize, FontSpec, LineCap, LineJoin};

use crate::geom::{Outline, Rect};
use crate::text::Span;

/// Decoded RGBA8 pixels, shared between the cache and any action that
/// references them.
#[derive(Debug, Clone, PartialEq)]
pub struct RgbaSurface {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

/// Stroke parameters for `^rule{}` elements.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineStyle {
    pub width: f32,
    pub cap: LineCap,
    pub join: LineJoin,
    pub offset: f32,
    pub miter_limit: f32,
}

impl Default for LineStyle {
    fn default() -> Self {
        Self {
            width: 1.0,
            cap: LineCap::Butt,
            join: LineJoin::Miter,
            offset: 0.0,
            miter_limit: 10.0,
        }
    }
}

/// What an action paints inside its rectangle.
#[derive(Debug, Clone, PartialEq)]
pub enum ActionKind {
    /// A horizontal stroke through the vertical center of the rect.
    Rule { color: Color, style: LineStyle },
    /// A pre-decoded image, blitted at the rect origin.
    Image { surface: Arc<RgbaSurface> },
    /// Shaped text spans sharing one base font and fill color.
    Text {
        spans: Vec<Span>,
        font: FontSpec,
        color: Color,
        ellipsize: Ellipsize,
    },
}

/// One paint instruction in absolute bar coordinates.
///
/// The frame includes padding and excludes margin. Geometry is filled in
/// by the snapshot step after layout; readers only ever see a complete
/// generation.
#[derive(Debug, Clone, PartialEq)]
pub struct Action {
    pub rect: Rect,
    pub margin: Outline,
    pub padding: Outline,
    /// Background fill behind the content.
    pub bg: Color,
    /// Clickable-area tag, when one was pending at creation.
    pub name: Option<String>,
    pub kind: ActionKind,
}
