//! Static output: consume all of stdin, then render the final
//! generation once to a PNG or SVG file.

use std::fs;
use std::io::{self, BufRead};
use std::path::Path;

use anyhow::{bail, Context as _};
use barre_engine::{evaluate, paint, Action, CosmicSizer, Frame, ImageCache};
use barre_markup::{output_format, tokenize, Color, OutputFormat};
use tracing::info;

use crate::svg;

pub fn run(path: &Path, width: u32, height: u32) -> anyhow::Result<()> {
    let path_str = path
        .to_str()
        .with_context(|| format!("output path {path:?} is not valid UTF-8"))?;
    let format = output_format(path_str)?;

    let mut sizer = CosmicSizer::new();
    let mut images = ImageCache::new();
    let background = Color::BLACK;

    // Every line evaluates (errors stay fatal); the last generation is
    // the one written out.
    let mut actions: Vec<Action> = Vec::new();
    let mut saw_line = false;
    for line in io::stdin().lock().lines() {
        let line = line.context("reading stdin")?;
        let ops = tokenize(&line)?;
        actions = evaluate(&ops, width as f32, height as f32, &mut sizer, &mut images)?;
        saw_line = true;
    }
    if !saw_line {
        bail!("no input");
    }

    match format {
        OutputFormat::Svg => {
            let doc = svg::emit(&actions, width, height, background)?;
            fs::write(path, doc).with_context(|| format!("writing {}", path.display()))?;
        }
        OutputFormat::Png => {
            let mut frame = Frame::new(width, height);
            paint(&mut frame, &actions, background, &mut sizer);
            encode_png(&frame, path)?;
        }
    }
    info!(path = %path.display(), "wrote");
    Ok(())
}

fn encode_png(frame: &Frame, path: &Path) -> anyhow::Result<()> {
    let img = image::RgbaImage::from_fn(frame.width(), frame.height(), |x, y| {
        let px = frame.pixels()[(y * frame.width() + x) as usize];
        image::Rgba([
            ((px >> 16) & 0xff) as u8,
            ((px >> 8) & 0xff) as u8,
            (px & 0xff) as u8,
            0xff,
        ])
    });
    img.save(path)
        .with_context(|| format!("writing {}", path.display()))?;
    Ok(())
}
