//! Software rasterization into a 32-bit pixel buffer.

pub mod painter;

pub use painter::paint;

use barre_markup::{Color, LineCap};

use crate::geom::Rect;

/// A `0RGB` pixel buffer matching what the window surface presents.
pub struct Frame {
    width: u32,
    height: u32,
    pixels: Vec<u32>,
}

fn channel(v: f32) -> u32 {
    (v.clamp(0.0, 1.0) * 255.0 + 0.5) as u32
}

fn pack(color: Color) -> u32 {
    (channel(color.r) << 16) | (channel(color.g) << 8) | channel(color.b)
}

fn blend(dst: u32, color: Color, alpha: f32) -> u32 {
    let a = (color.a * alpha).clamp(0.0, 1.0);
    if a >= 1.0 {
        return pack(color);
    }
    if a <= 0.0 {
        return dst;
    }
    let mix = |d: u32, s: f32| -> u32 {
        let d = d as f32 / 255.0;
        channel(s * a + d * (1.0 - a))
    };
    let r = mix((dst >> 16) & 0xff, color.r);
    let g = mix((dst >> 8) & 0xff, color.g);
    let b = mix(dst & 0xff, color.b);
    (r << 16) | (g << 8) | b
}

impl Frame {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![0; (width * height) as usize],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Raw pixels in row-major order, for presenting or encoding.
    pub fn pixels(&self) -> &[u32] {
        &self.pixels
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
        self.pixels.clear();
        self.pixels.resize((width * height) as usize, 0);
    }

    pub fn fill(&mut self, color: Color) {
        self.pixels.fill(pack(color));
    }

    fn put(&mut self, x: i32, y: i32, color: Color, alpha: f32) {
        if x < 0 || y < 0 || x >= self.width as i32 || y >= self.height as i32 {
            return;
        }
        let idx = (y as u32 * self.width + x as u32) as usize;
        self.pixels[idx] = blend(self.pixels[idx], color, alpha);
    }

    /// Fill a rectangle, alpha-blending over what is already there.
    /// Clipped to the frame.
    pub fn fill_rect(&mut self, rect: Rect, color: Color) {
        let x0 = rect.x.round() as i32;
        let y0 = rect.y.round() as i32;
        let x1 = (rect.x + rect.width).round() as i32;
        let y1 = (rect.y + rect.height).round() as i32;
        for y in y0.max(0)..y1.min(self.height as i32) {
            for x in x0.max(0)..x1.min(self.width as i32) {
                self.put(x, y, color, 1.0);
            }
        }
    }

    /// Blit straight-alpha RGBA8 pixels with their own per-pixel alpha.
    pub fn blit_rgba(&mut self, x: i32, y: i32, w: u32, h: u32, data: &[u8]) {
        for row in 0..h {
            for col in 0..w {
                let i = ((row * w + col) * 4) as usize;
                let Some(px) = data.get(i..i + 4) else {
                    return;
                };
                let color = Color::rgba(
                    px[0] as f32 / 255.0,
                    px[1] as f32 / 255.0,
                    px[2] as f32 / 255.0,
                    px[3] as f32 / 255.0,
                );
                self.put(x + col as i32, y + row as i32, color, 1.0);
            }
        }
    }

    /// Blit an 8-bit coverage mask in a solid color.
    pub fn blit_mask(&mut self, x: i32, y: i32, w: u32, h: u32, data: &[u8], color: Color) {
        for row in 0..h {
            for col in 0..w {
                let Some(&coverage) = data.get((row * w + col) as usize) else {
                    return;
                };
                if coverage == 0 {
                    continue;
                }
                self.put(
                    x + col as i32,
                    y + row as i32,
                    color,
                    coverage as f32 / 255.0,
                );
            }
        }
    }

    /// Stroke a horizontal line of the given thickness centered on `y`.
    /// Square and round caps extend past the endpoints by half the
    /// thickness; butt stops exactly at them.
    pub fn hline(&mut self, x0: f32, x1: f32, y: f32, thickness: f32, cap: LineCap, color: Color) {
        let half = (thickness.max(1.0) / 2.0).max(0.5);
        let (start, end) = match cap {
            LineCap::Butt => (x0, x1),
            LineCap::Square => (x0 - half, x1 + half),
            LineCap::Round => (x0, x1),
        };
        let top = (y - half).round() as i32;
        let bottom = (y + half).round() as i32;
        for py in top..bottom.max(top + 1) {
            for px in start.round() as i32..end.round() as i32 {
                self.put(px, py, color, 1.0);
            }
        }
        if cap == LineCap::Round {
            for &cx in &[x0, x1] {
                for py in (y - half).floor() as i32..=(y + half).ceil() as i32 {
                    for px in (cx - half).floor() as i32..=(cx + half).ceil() as i32 {
                        let dx = px as f32 + 0.5 - cx;
                        let dy = py as f32 + 0.5 - y;
                        if dx * dx + dy * dy <= half * half {
                            self.put(px, py, color, 1.0);
                        }
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fill_and_pack() {
        let mut frame = Frame::new(4, 2);
        frame.fill(Color::rgb(1.0, 0.0, 0.0));
        assert!(frame.pixels().iter().all(|&p| p == 0x00ff0000));
    }

    #[test]
    fn test_fill_rect_clips() {
        let mut frame = Frame::new(4, 4);
        frame.fill_rect(Rect::new(-2.0, -2.0, 100.0, 3.0), Color::WHITE);
        assert_eq!(frame.pixels()[0], 0x00ffffff);
        // Row 3 untouched.
        assert_eq!(frame.pixels()[3 * 4], 0);
    }

    #[test]
    fn test_alpha_blend() {
        let mut frame = Frame::new(1, 1);
        frame.fill(Color::BLACK);
        frame.fill_rect(Rect::new(0.0, 0.0, 1.0, 1.0), Color::rgba(1.0, 1.0, 1.0, 0.5));
        let px = frame.pixels()[0];
        let gray = (px >> 16) & 0xff;
        assert!((126..=129).contains(&gray), "got {gray}");
    }

    #[test]
    fn test_mask_blit() {
        let mut frame = Frame::new(2, 1);
        frame.fill(Color::BLACK);
        frame.blit_mask(0, 0, 2, 1, &[255, 0], Color::WHITE);
        assert_eq!(frame.pixels()[0], 0x00ffffff);
        assert_eq!(frame.pixels()[1], 0);
    }

    #[test]
    fn test_hline_butt() {
        let mut frame = Frame::new(10, 5);
        frame.hline(2.0, 8.0, 2.5, 1.0, LineCap::Butt, Color::WHITE);
        let row: Vec<u32> = frame.pixels()[20..30].to_vec();
        assert_eq!(row[1], 0);
        assert_eq!(row[2], 0x00ffffff);
        assert_eq!(row[7], 0x00ffffff);
        assert_eq!(row[8], 0);
    }

    #[test]
    fn test_resize_clears() {
        let mut frame = Frame::new(2, 2);
        frame.fill(Color::WHITE);
        frame.resize(3, 3);
        assert_eq!(frame.pixels().len(), 9);
        assert!(frame.pixels().iter().all(|&p| p == 0));
    }
}
