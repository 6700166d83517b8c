use std::path::Path;

use image::{ImageBuffer, ImageFormat, Rgba, RgbaImage};

use crate::consts::WHITE;
use crate::error::Result;

/// Axis-aligned rectangle in surface pixels, half-open on the max edges.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x0: f32,
    pub y0: f32,
    pub x1: f32,
    pub y1: f32,
}

impl Rect {
    pub fn new(x0: f32, y0: f32, x1: f32, y1: f32) -> Self {
        Self { x0, y0, x1, y1 }
    }

    pub fn width(&self) -> f32 {
        (self.x1 - self.x0).max(0.0)
    }

    pub fn height(&self) -> f32 {
        (self.y1 - self.y0).max(0.0)
    }

    /// Whether the pixel whose top-left corner is `(x, y)` has its centre inside.
    fn contains_px(&self, x: i64, y: i64) -> bool {
        let (cx, cy) = (x as f32 + 0.5, y as f32 + 0.5);
        cx >= self.x0 && cx < self.x1 && cy >= self.y0 && cy < self.y1
    }
}

/// Owned RGBA drawing target for one render call.
///
/// All drawing clips to the buffer, so a zero-area surface accepts every call
/// and draws nothing.
#[derive(Debug, Clone, PartialEq)]
pub struct RasterSurface {
    img: RgbaImage,
}

impl RasterSurface {
    /// New surface filled with white.
    pub fn new(width: u32, height: u32) -> Self {
        Self { img: ImageBuffer::from_pixel(width, height, Rgba(WHITE)) }
    }

    pub fn from_image(img: RgbaImage) -> Self {
        Self { img }
    }

    pub fn width(&self) -> u32 {
        self.img.width()
    }

    pub fn height(&self) -> u32 {
        self.img.height()
    }

    pub fn is_empty(&self) -> bool {
        self.img.width() == 0 || self.img.height() == 0
    }

    pub fn bounds(&self) -> Rect {
        Rect::new(0.0, 0.0, self.width() as f32, self.height() as f32)
    }

    pub fn image(&self) -> &RgbaImage {
        &self.img
    }

    pub fn into_image(self) -> RgbaImage {
        self.img
    }

    /// Write the surface as a PNG file.
    pub fn save_png(&self, path: impl AsRef<Path>) -> Result<()> {
        self.img.save_with_format(path, ImageFormat::Png)?;
        Ok(())
    }

    /// Raw RGBA bytes, row-major from the top-left pixel.
    pub fn as_raw(&self) -> &[u8] {
        self.img.as_raw()
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x < self.width() && y < self.height() {
            Some(self.img.get_pixel(x, y).0)
        } else {
            None
        }
    }

    pub fn put_pixel(&mut self, x: i64, y: i64, color: [u8; 4]) {
        if x >= 0 && y >= 0 && (x as u64) < self.width() as u64 && (y as u64) < self.height() as u64 {
            self.img.put_pixel(x as u32, y as u32, Rgba(color));
        }
    }

    pub fn fill(&mut self, color: [u8; 4]) {
        for p in self.img.pixels_mut() {
            *p = Rgba(color);
        }
    }

    /// Fill every pixel whose centre lies in `rect`.
    pub fn fill_rect(&mut self, rect: Rect, color: [u8; 4]) {
        let r = clip(rect, self.bounds());
        if r.width() <= 0.0 || r.height() <= 0.0 {
            return;
        }
        let (x0, x1) = ((r.x0 - 0.5).ceil() as i64, (r.x1 - 0.5).ceil() as i64);
        let (y0, y1) = ((r.y0 - 0.5).ceil() as i64, (r.y1 - 0.5).ceil() as i64);
        for y in y0..y1 {
            for x in x0..x1 {
                self.put_pixel(x, y, color);
            }
        }
    }

    /// One pixel wide line from `a` to `b`, restricted to `clip_to`.
    pub fn draw_line(&mut self, a: (f32, f32), b: (f32, f32), color: [u8; 4], clip_to: Rect) {
        let (dx, dy) = (b.0 - a.0, b.1 - a.1);
        let steps = dx.abs().max(dy.abs()).ceil() as i64;
        if steps <= 0 {
            return;
        }
        let (sx, sy) = (dx / steps as f32, dy / steps as f32);
        for i in 0..=steps {
            let x = (a.0 + sx * i as f32).floor() as i64;
            let y = (a.1 + sy * i as f32).floor() as i64;
            if clip_to.contains_px(x, y) {
                self.put_pixel(x, y, color);
            }
        }
    }

    /// Horizontal stroke of thickness `width` centred on `y`.
    pub fn hline(&mut self, x: f32, y: f32, len: f32, width: f32, color: [u8; 4]) {
        let half = width / 2.0;
        self.fill_rect(Rect::new(x, y - half, x + len, y + half), color);
    }
}

fn clip(a: Rect, b: Rect) -> Rect {
    Rect::new(a.x0.max(b.x0), a.y0.max(b.y0), a.x1.min(b.x1), a.y1.min(b.y1))
}
