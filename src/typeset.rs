//! Text measurement and drawing capability used by the layout engine.
//!
//! Auto-fit bisects over font size, so every [`Typesetter`] must report a
//! measured width that never shrinks when the font size grows.

use crate::surface::{RasterSurface, Rect};
use crate::text::{FontStyle, FontWeight, TextSpan};

/// Resolved font request for one run of text.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FontSpec<'a> {
    pub family: &'a str,
    pub size_px: f32,
    pub weight: FontWeight,
    pub style: FontStyle,
}

impl<'a> FontSpec<'a> {
    pub fn new(family: &'a str, size_px: f32) -> Self {
        Self { family, size_px, weight: FontWeight::Normal, style: FontStyle::Normal }
    }

    /// Font for `span` at `size_px`, keeping its family, weight and style.
    pub fn for_span(span: &'a TextSpan, size_px: f32) -> Self {
        Self {
            family: span.family_or_default(),
            size_px,
            weight: span.font_weight,
            style: span.font_style,
        }
    }
}

/// Vertical metrics in pixels; `descent` is negative below the baseline.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VMetrics {
    pub ascent: f32,
    pub descent: f32,
}

impl VMetrics {
    /// Offset from the em-box middle to the alphabetic baseline.
    pub fn middle_to_baseline(&self) -> f32 {
        (self.ascent + self.descent) / 2.0
    }
}

pub trait Typesetter {
    /// Advance width of `text` in pixels. Must be monotone non-decreasing in `font.size_px`.
    fn measure(&self, text: &str, font: &FontSpec<'_>) -> f32;

    fn v_metrics(&self, font: &FontSpec<'_>) -> VMetrics;

    /// Draw `text` with its left edge at `origin.0` and alphabetic baseline at `origin.1`.
    fn draw(&self, surface: &mut RasterSurface, text: &str, font: &FontSpec<'_>, origin: (f32, f32), color: [u8; 4]);
}

/// Font-less typesetter drawing every non-blank character as a solid box.
///
/// Widths are exact multiples of the font size, which makes it handy for
/// layout previews on machines without a font file.
#[derive(Debug, Clone, Copy, Default)]
pub struct BlockTypesetter;

impl BlockTypesetter {
    pub const ADVANCE: f32 = 0.6;
    pub const BOLD_ADVANCE: f32 = 0.66;
    pub const ASCENT: f32 = 0.8;
    pub const DESCENT: f32 = -0.2;

    fn advance(font: &FontSpec<'_>) -> f32 {
        let em = match font.weight {
            FontWeight::Normal => Self::ADVANCE,
            FontWeight::Bold => Self::BOLD_ADVANCE,
        };
        em * font.size_px.max(0.0)
    }
}

impl Typesetter for BlockTypesetter {
    fn measure(&self, text: &str, font: &FontSpec<'_>) -> f32 {
        text.chars().count() as f32 * Self::advance(font)
    }

    fn v_metrics(&self, font: &FontSpec<'_>) -> VMetrics {
        let size = font.size_px.max(0.0);
        VMetrics { ascent: Self::ASCENT * size, descent: Self::DESCENT * size }
    }

    fn draw(&self, surface: &mut RasterSurface, text: &str, font: &FontSpec<'_>, origin: (f32, f32), color: [u8; 4]) {
        if surface.is_empty() {
            return;
        }
        let advance = Self::advance(font);
        let cap = 0.7 * font.size_px;
        let gap = advance * 0.1;
        // italic boxes lean right but keep within their advance
        let slant = match font.style {
            FontStyle::Italic => gap,
            FontStyle::Normal => 0.0,
        };
        let mut x = origin.0;
        for c in text.chars() {
            if !c.is_whitespace() {
                surface.fill_rect(Rect::new(x + gap + slant, origin.1 - cap, x + advance - gap, origin.1), color);
            }
            x += advance;
        }
    }
}
