//! Walking an Action generation and issuing draw calls.

use barre_markup::{Color, Ellipsize};

use crate::action::{Action, ActionKind};
use crate::geom::Rect;
use crate::raster::Frame;
use crate::text::{elide, CosmicSizer, Span, TextSizer};

/// Paint one full generation into the frame.
///
/// The frame is cleared to `background` first; Actions then draw in
/// declaration order, each filling its own background before its
/// content.
pub fn paint(frame: &mut Frame, actions: &[Action], background: Color, text: &mut CosmicSizer) {
    frame.fill(background);
    for action in actions {
        frame.fill_rect(action.rect, action.bg);
        let content = content_box(action);
        match &action.kind {
            ActionKind::Image { surface } => {
                frame.blit_rgba(
                    content.x.round() as i32,
                    content.y.round() as i32,
                    surface.width,
                    surface.height,
                    &surface.pixels,
                );
            }
            ActionKind::Rule { color, style } => {
                let y = content.y + content.height / 2.0;
                frame.hline(
                    content.x,
                    content.x + content.width,
                    y,
                    style.width,
                    style.cap,
                    *color,
                );
            }
            ActionKind::Text {
                spans,
                font,
                color,
                ellipsize,
            } => {
                let elided;
                let spans = match single_plain(spans) {
                    Some(s) if *ellipsize != Ellipsize::None => {
                        let mut measure = |candidate: &str| text.measure_str(candidate, font);
                        elided = vec![Span::plain(elide(
                            s,
                            *ellipsize,
                            content.width,
                            &mut measure,
                        ))];
                        &elided
                    }
                    _ => spans,
                };
                for glyph in text.rasterize(spans, font, *color, content.x, content.y) {
                    if glyph.mask {
                        frame.blit_mask(
                            glyph.x,
                            glyph.y,
                            glyph.width,
                            glyph.height,
                            &glyph.data,
                            glyph.color,
                        );
                    } else {
                        frame.blit_rgba(glyph.x, glyph.y, glyph.width, glyph.height, &glyph.data);
                    }
                }
            }
        }
    }
}

fn content_box(action: &Action) -> Rect {
    Rect::new(
        action.rect.x + action.padding.left,
        action.rect.y + action.padding.top,
        action.rect.width - action.padding.horizontal(),
        action.rect.height - action.padding.vertical(),
    )
}

/// Elision rewrites the string, so it only applies to a single unstyled
/// run.
fn single_plain(spans: &[Span]) -> Option<&str> {
    match spans {
        [only] if only.fg.is_none() && !only.bold && !only.italic => Some(&only.text),
        _ => None,
    }
}
