//! SVG emission for static output.
//!
//! Mirrors the raster painter Action for Action. Line style carries
//! over completely here (cap, join, miter limit, dash offset), and
//! images embed as base64 PNG data URIs.

use std::fmt::Write as _;

use anyhow::Context as _;
use barre_engine::{Action, ActionKind, RgbaSurface};
use barre_markup::{Color, LineCap, LineJoin};
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;

pub fn emit(
    actions: &[Action],
    width: u32,
    height: u32,
    background: Color,
) -> anyhow::Result<String> {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{width}\" height=\"{height}\" \
         viewBox=\"0 0 {width} {height}\">"
    );
    rect(&mut out, 0.0, 0.0, width as f32, height as f32, background);

    for action in actions {
        rect(
            &mut out,
            action.rect.x,
            action.rect.y,
            action.rect.width,
            action.rect.height,
            action.bg,
        );
        let cx = action.rect.x + action.padding.left;
        let cy = action.rect.y + action.padding.top;
        let cw = action.rect.width - action.padding.horizontal();
        let ch = action.rect.height - action.padding.vertical();
        match &action.kind {
            ActionKind::Rule { color, style } => {
                let y = cy + ch / 2.0;
                let _ = writeln!(
                    out,
                    "  <line x1=\"{cx}\" y1=\"{y}\" x2=\"{x2}\" y2=\"{y}\" stroke=\"{stroke}\" \
                     stroke-width=\"{w}\" stroke-linecap=\"{cap}\" stroke-linejoin=\"{join}\" \
                     stroke-miterlimit=\"{miter}\" stroke-dashoffset=\"{offset}\"/>",
                    x2 = cx + cw,
                    stroke = hex(*color),
                    w = style.width,
                    cap = linecap(style.cap),
                    join = linejoin(style.join),
                    miter = style.miter_limit,
                    offset = style.offset,
                );
            }
            ActionKind::Image { surface } => {
                let href = data_uri(surface)?;
                let _ = writeln!(
                    out,
                    "  <image x=\"{cx}\" y=\"{cy}\" width=\"{w}\" height=\"{h}\" href=\"{href}\"/>",
                    w = surface.width,
                    h = surface.height,
                );
            }
            ActionKind::Text {
                spans,
                font,
                color,
                ..
            } => {
                // Baseline sits roughly one descent above the content
                // bottom.
                let baseline = cy + ch - font.size * 0.2;
                let _ = write!(
                    out,
                    "  <text x=\"{cx}\" y=\"{baseline}\" font-family=\"{family}\" \
                     font-size=\"{size}\" fill=\"{fill}\"{weight}{slant}>",
                    family = escape(&font.family),
                    size = font.size,
                    fill = hex(*color),
                    weight = if font.bold { " font-weight=\"bold\"" } else { "" },
                    slant = if font.italic { " font-style=\"italic\"" } else { "" },
                );
                for span in spans {
                    let mut attrs = String::new();
                    if let Some(fg) = span.fg {
                        let _ = write!(attrs, " fill=\"{}\"", hex(fg));
                    }
                    if span.bold {
                        attrs.push_str(" font-weight=\"bold\"");
                    }
                    if span.italic {
                        attrs.push_str(" font-style=\"italic\"");
                    }
                    if attrs.is_empty() {
                        let _ = write!(out, "{}", escape(&span.text));
                    } else {
                        let _ = write!(out, "<tspan{attrs}>{}</tspan>", escape(&span.text));
                    }
                }
                let _ = writeln!(out, "</text>");
            }
        }
    }
    out.push_str("</svg>\n");
    Ok(out)
}

fn rect(out: &mut String, x: f32, y: f32, w: f32, h: f32, color: Color) {
    if w <= 0.0 || h <= 0.0 {
        return;
    }
    let opacity = if color.a < 1.0 {
        format!(" fill-opacity=\"{}\"", color.a)
    } else {
        String::new()
    };
    let _ = writeln!(
        out,
        "  <rect x=\"{x}\" y=\"{y}\" width=\"{w}\" height=\"{h}\" fill=\"{}\"{opacity}/>",
        hex(color)
    );
}

fn hex(color: Color) -> String {
    format!(
        "#{:02x}{:02x}{:02x}",
        (color.r.clamp(0.0, 1.0) * 255.0 + 0.5) as u8,
        (color.g.clamp(0.0, 1.0) * 255.0 + 0.5) as u8,
        (color.b.clamp(0.0, 1.0) * 255.0 + 0.5) as u8,
    )
}

fn linecap(cap: LineCap) -> &'static str {
    match cap {
        LineCap::Butt => "butt",
        LineCap::Round => "round",
        LineCap::Square => "square",
    }
}

fn linejoin(join: LineJoin) -> &'static str {
    match join {
        LineJoin::Miter => "miter",
        LineJoin::Round => "round",
        LineJoin::Bevel => "bevel",
    }
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}

fn data_uri(surface: &RgbaSurface) -> anyhow::Result<String> {
    let img = image::RgbaImage::from_raw(surface.width, surface.height, surface.pixels.clone())
        .context("surface dimensions do not match pixel data")?;
    let mut png = Vec::new();
    img.write_to(
        &mut std::io::Cursor::new(&mut png),
        image::ImageFormat::Png,
    )?;
    Ok(format!("data:image/png;base64,{}", STANDARD.encode(png)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use barre_engine::{LineStyle, Outline, Rect};
    use barre_engine::Span;
    use barre_markup::{Ellipsize, FontSpec};

    fn base(kind: ActionKind) -> Action {
        Action {
            rect: Rect::new(5.0, 2.0, 50.0, 16.0),
            margin: Outline::default(),
            padding: Outline::default(),
            bg: Color::BLACK,
            name: None,
            kind,
        }
    }

    #[test]
    fn test_rule_carries_line_style() {
        let action = base(ActionKind::Rule {
            color: Color::WHITE,
            style: LineStyle {
                width: 2.0,
                cap: barre_markup::LineCap::Round,
                join: barre_markup::LineJoin::Bevel,
                offset: 3.0,
                miter_limit: 4.0,
            },
        });
        let svg = emit(&[action], 100, 20, Color::BLACK).unwrap();
        assert!(svg.contains("stroke-linecap=\"round\""));
        assert!(svg.contains("stroke-linejoin=\"bevel\""));
        assert!(svg.contains("stroke-dashoffset=\"3\""));
        assert!(svg.contains("stroke-miterlimit=\"4\""));
        assert!(svg.contains("stroke-width=\"2\""));
    }

    #[test]
    fn test_text_spans_and_escaping() {
        let action = base(ActionKind::Text {
            spans: vec![
                Span::plain("a<b"),
                Span {
                    text: "hot".to_string(),
                    fg: Some(Color::rgb(1.0, 0.0, 0.0)),
                    bold: true,
                    italic: false,
                },
            ],
            font: FontSpec::default(),
            color: Color::WHITE,
            ellipsize: Ellipsize::None,
        });
        let svg = emit(&[action], 100, 20, Color::BLACK).unwrap();
        assert!(svg.contains("a&lt;b"));
        assert!(svg.contains("<tspan fill=\"#ff0000\" font-weight=\"bold\">hot</tspan>"));
        assert!(svg.contains("font-family=\"Sans\""));
    }

    #[test]
    fn test_background_rect() {
        let svg = emit(&[], 100, 20, Color::rgb(0.0, 0.0, 0.0)).unwrap();
        assert!(svg.contains("width=\"100\" height=\"20\" fill=\"#000000\""));
    }
}
