use image::imageops::{self, FilterType};

use crate::layout::render_label;
use crate::settings::LabelSettings;
use crate::surface::RasterSurface;
use crate::text::LabelContent;
use crate::typeset::Typesetter;

/// Thumbnail size preserving the label's aspect ratio inside `max_w × max_h`.
pub fn preview_dimensions(full_w: u32, full_h: u32, max_w: u32, max_h: u32) -> (u32, u32) {
    if full_w == 0 || full_h == 0 || max_w == 0 || max_h == 0 {
        return (0, 0);
    }
    let aspect = full_w as f32 / full_h as f32;
    let (w, h) = if aspect > max_w as f32 / max_h as f32 {
        (max_w as f32, max_w as f32 / aspect)
    } else {
        (max_h as f32 * aspect, max_h as f32)
    };
    ((w as u32).max(1), (h as u32).max(1))
}

/// Render at full resolution off-screen, then resample into a thumbnail.
pub fn render_preview(
    settings: &LabelSettings,
    content: &LabelContent,
    typesetter: &dyn Typesetter,
    max_w: u32,
    max_h: u32,
) -> (RasterSurface, Option<f32>) {
    let (full, size) = render_label(settings, content, typesetter);
    (downscale(&full, max_w, max_h), size)
}

/// Smooth resample of `full` into the preview box.
pub fn downscale(full: &RasterSurface, max_w: u32, max_h: u32) -> RasterSurface {
    let (w, h) = preview_dimensions(full.width(), full.height(), max_w, max_h);
    if w == 0 || h == 0 {
        return RasterSurface::new(w, h);
    }
    RasterSurface::from_image(imageops::resize(full.image(), w, h, FilterType::Triangle))
}
