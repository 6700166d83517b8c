use log::info;

use crate::bmp::{encode, BmpBytes};
use crate::error::Result;
use crate::layout::render_label;
use crate::preview::downscale;
use crate::settings::LabelSettings;
use crate::surface::RasterSurface;
use crate::text::LabelContent;
use crate::typeset::Typesetter;

/// One label render: validated settings in, surface and BMP out.
#[derive(Debug, Clone)]
pub struct LabelJob {
    settings: LabelSettings,
}

impl LabelJob {
    pub fn new(settings: LabelSettings) -> Result<Self> {
        settings.validate()?;
        Ok(Self { settings })
    }

    pub fn settings(&self) -> &LabelSettings {
        &self.settings
    }

    pub fn render(&self, content: &LabelContent, typesetter: &dyn Typesetter) -> RenderedLabel {
        let (surface, font_size) = render_label(&self.settings, content, typesetter);
        info!(
            "rendered {}x{} label, font size {}",
            surface.width(),
            surface.height(),
            font_size.map_or_else(|| "none".to_string(), |pt| format!("{pt:.1}pt")),
        );
        RenderedLabel { surface, font_size, mirrored: self.settings.is_flipped }
    }

    /// Render and encode in one go.
    pub fn build_bmp(&self, content: &LabelContent, typesetter: &dyn Typesetter) -> Result<BmpBytes> {
        self.render(content, typesetter).to_bmp()
    }
}

/// Full-resolution render result.
#[derive(Debug, Clone)]
pub struct RenderedLabel {
    pub surface: RasterSurface,
    /// Resolved size in points, `None` when nothing was drawn
    pub font_size: Option<f32>,
    pub mirrored: bool,
}

impl RenderedLabel {
    pub fn to_bmp(&self) -> Result<BmpBytes> {
        encode(&self.surface, self.mirrored)
    }

    pub fn thumbnail(&self, max_w: u32, max_h: u32) -> RasterSurface {
        downscale(&self.surface, max_w, max_h)
    }
}
