//! Label layout: background, dead-zone hatching and auto-fitted text.
//!
//! The surface splits into a dead zone `[0, padding)` on the left, reserved
//! for a fixed physical marking, and the engrave zone to its right. Text is
//! fitted into the engrave zone shrunk by a 5% safety margin on every side.

use log::{debug, warn};

use crate::consts::{
    BLACK, DEAD_ZONE_FILL, DEAD_ZONE_HATCH, DEFAULT_FAMILY, HATCH_SPACING, LINE_HEIGHT, PT_TO_PX, RICH_SCALE_EPSILON,
    RICH_SCALE_MIN, SAFETY_MARGIN, WHITE,
};
use crate::settings::{Geometry, LabelSettings};
use crate::surface::{RasterSurface, Rect};
use crate::text::{Decoration, LabelContent, PlainText, RichText, TextSpan};
use crate::typeset::{FontSpec, Typesetter};

/// Text box available after the safety margin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SafeArea {
    pub width: f32,
    pub height: f32,
}

impl SafeArea {
    pub fn of(geometry: &Geometry) -> Self {
        let keep = 1.0 - SAFETY_MARGIN * 2.0;
        Self {
            width: geometry.engrave_width() * keep,
            height: geometry.engrave_height() * keep,
        }
    }
}

/// Render `content` onto a fresh surface sized from `settings`.
///
/// Returns the surface and the resolved font size in points, `None` when
/// there was no text to draw.
pub fn render_label(
    settings: &LabelSettings,
    content: &LabelContent,
    typesetter: &dyn Typesetter,
) -> (RasterSurface, Option<f32>) {
    let geometry = settings.geometry();
    let mut surface = RasterSurface::new(geometry.width, geometry.height);
    let size = render_into(&mut surface, &geometry, settings, content, typesetter);
    (surface, size)
}

/// Draw background, dead zone and text onto an existing surface.
pub fn render_into(
    surface: &mut RasterSurface,
    geometry: &Geometry,
    settings: &LabelSettings,
    content: &LabelContent,
    typesetter: &dyn Typesetter,
) -> Option<f32> {
    draw_background(surface, geometry);
    match content {
        LabelContent::Plain(text) => render_plain(surface, geometry, settings, text, typesetter),
        LabelContent::Rich(text) => render_rich(surface, geometry, settings, text, typesetter),
    }
}

/// White background plus the hatched dead zone.
pub fn draw_background(surface: &mut RasterSurface, geometry: &Geometry) {
    surface.fill(WHITE);

    let h = geometry.height as f32;
    let zone = Rect::new(0.0, 0.0, geometry.padding, h);
    surface.fill_rect(zone, DEAD_ZONE_FILL);

    let mut i = -h;
    while i < geometry.padding {
        surface.draw_line((i, 0.0), (i + h, h), DEAD_ZONE_HATCH, zone);
        i += HATCH_SPACING;
    }
}

/// Fit and draw unformatted text; returns the font size in points.
pub fn render_plain(
    surface: &mut RasterSurface,
    geometry: &Geometry,
    settings: &LabelSettings,
    text: &PlainText,
    typesetter: &dyn Typesetter,
) -> Option<f32> {
    if text.is_blank() {
        return None;
    }
    let lines = text.lines();
    let safe = SafeArea::of(geometry);

    let font_px = if settings.auto_size {
        fit_plain(&lines, safe, settings.max_auto_px(), typesetter)
    } else {
        settings.explicit_font_pt() * PT_TO_PX
    };

    let font = FontSpec::new(DEFAULT_FAMILY, font_px);
    let middle = typesetter.v_metrics(&font).middle_to_baseline();
    let line_h = font_px * LINE_HEIGHT;
    let total_h = line_h * lines.len() as f32;
    let center_x = geometry.engrave_x() + geometry.engrave_width() / 2.0;
    let start_y = (geometry.engrave_height() - total_h) / 2.0 + line_h / 2.0;

    for (i, line) in lines.iter().enumerate() {
        let w = typesetter.measure(line, &font);
        let y = start_y + i as f32 * line_h;
        typesetter.draw(surface, line, &font, (center_x - w / 2.0, y + middle), BLACK);
    }

    debug!("plain text fitted at {font_px}px over {} line(s)", lines.len());
    Some(font_px / PT_TO_PX)
}

/// Whether `lines` fit the safe area at `font_px`.
pub fn plain_fits(lines: &[&str], font_px: f32, safe: SafeArea, typesetter: &dyn Typesetter) -> bool {
    let font = FontSpec::new(DEFAULT_FAMILY, font_px);
    let widest = lines
        .iter()
        .map(|l| typesetter.measure(l, &font))
        .fold(0.0_f32, f32::max);
    let total_h = font_px * lines.len() as f32 * LINE_HEIGHT;
    widest <= safe.width && total_h <= safe.height
}

/// Largest whole-pixel size in `[1, max_px]` that fits; 1 when nothing does.
///
/// No size taller than the safe area can fit a line, so the search is capped
/// there whatever `max_px` says.
pub fn fit_plain(lines: &[&str], safe: SafeArea, max_px: f32, typesetter: &dyn Typesetter) -> f32 {
    let tallest = (safe.height / LINE_HEIGHT).max(0.0);
    let mut low: i64 = 1;
    let mut high: i64 = max_px.min(tallest).floor() as i64;
    let mut best: i64 = low;
    let mut found = false;

    while low <= high {
        let mid = low + (high - low) / 2;
        if plain_fits(lines, mid as f32, safe, typesetter) {
            best = mid;
            found = true;
            low = mid + 1;
        } else {
            high = mid - 1;
        }
    }
    if !found {
        warn!("text does not fit the engrave zone, drawing at {best}px");
    }
    best as f32
}

/// Measured layout of one rich-text line at a given scale.
#[derive(Debug, Clone, PartialEq)]
pub struct LineMetrics {
    /// Per-span font size in pixels
    pub sizes: Vec<f32>,
    /// Per-span measured width in pixels
    pub widths: Vec<f32>,
}

impl LineMetrics {
    pub fn measure(spans: &[TextSpan], scale: f32, typesetter: &dyn Typesetter) -> Self {
        let sizes: Vec<f32> = spans.iter().map(|s| s.declared_pt() * scale * PT_TO_PX).collect();
        let widths = spans
            .iter()
            .zip(&sizes)
            .map(|(span, &px)| typesetter.measure(&span.text, &FontSpec::for_span(span, px)))
            .collect();
        Self { sizes, widths }
    }

    pub fn width(&self) -> f32 {
        self.widths.iter().sum()
    }

    /// Tallest span on the line.
    pub fn height(&self) -> f32 {
        self.sizes.iter().copied().fold(0.0_f32, f32::max)
    }
}

/// Whether every line fits the safe area at `scale`.
pub fn rich_fits(lines: &[Vec<TextSpan>], scale: f32, safe: SafeArea, typesetter: &dyn Typesetter) -> bool {
    let mut widest = 0.0_f32;
    let mut total_h = 0.0_f32;
    for line in lines {
        let m = LineMetrics::measure(line, scale, typesetter);
        widest = widest.max(m.width());
        total_h += m.height() * LINE_HEIGHT;
    }
    widest <= safe.width && total_h <= safe.height
}

/// Bisect the scale factor on `[0.01, max_scale]` until the interval is below
/// the convergence threshold; the lower bound is returned.
pub fn fit_rich(lines: &[Vec<TextSpan>], safe: SafeArea, max_scale: f32, typesetter: &dyn Typesetter) -> f32 {
    let mut low = RICH_SCALE_MIN;
    let mut high = max_scale.max(RICH_SCALE_MIN);

    while high - low > RICH_SCALE_EPSILON {
        let mid = (low + high) / 2.0;
        if rich_fits(lines, mid, safe, typesetter) {
            low = mid;
        } else {
            high = mid;
        }
    }
    if low == RICH_SCALE_MIN && !rich_fits(lines, low, safe, typesetter) {
        warn!("rich text does not fit the engrave zone, drawing at scale {low}");
    }
    low
}

/// Fit and draw span-formatted text; returns the mean span size times the scale.
pub fn render_rich(
    surface: &mut RasterSurface,
    geometry: &Geometry,
    settings: &LabelSettings,
    text: &RichText,
    typesetter: &dyn Typesetter,
) -> Option<f32> {
    let lines = text.lines();
    if lines.iter().all(Vec::is_empty) {
        return None;
    }
    let safe = SafeArea::of(geometry);

    let scale = if settings.auto_size {
        fit_rich(&lines, safe, settings.max_auto_px() / PT_TO_PX, typesetter)
    } else {
        1.0
    };

    let metrics: Vec<LineMetrics> = lines
        .iter()
        .map(|line| LineMetrics::measure(line, scale, typesetter))
        .collect();
    let total_h: f32 = metrics.iter().map(|m| m.height() * LINE_HEIGHT).sum();
    let center_x = geometry.engrave_x() + geometry.engrave_width() / 2.0;
    let mut top = (geometry.engrave_height() - total_h) / 2.0;

    for (line, m) in lines.iter().zip(&metrics) {
        let line_h = m.height() * LINE_HEIGHT;
        if line.is_empty() {
            top += line_h;
            continue;
        }
        // the tallest span sets the shared baseline, centred in the line box
        let tallest = m
            .sizes
            .iter()
            .position(|&s| s == m.height())
            .unwrap_or(0);
        let tall_font = FontSpec::for_span(&line[tallest], m.sizes[tallest]);
        let baseline = top + line_h / 2.0 + typesetter.v_metrics(&tall_font).middle_to_baseline();

        let mut x = center_x - m.width() / 2.0;
        for ((span, &px), &w) in line.iter().zip(&m.sizes).zip(&m.widths) {
            let font = FontSpec::for_span(span, px);
            typesetter.draw(surface, &span.text, &font, (x, baseline), BLACK);
            draw_decoration(surface, span.decoration, x, baseline, w, px);
            x += w;
        }
        top += line_h;
    }

    let mean = text.mean_declared_pt()?;
    debug!("rich text fitted at scale {scale:.3} over {} line(s)", lines.len());
    Some(mean * scale)
}

/// Underline sits below the baseline, strikethrough through the x-height.
fn draw_decoration(
    surface: &mut RasterSurface,
    decoration: Decoration,
    x: f32,
    baseline: f32,
    width: f32,
    font_px: f32,
) {
    let stroke = (font_px / 15.0).max(1.0);
    let y = match decoration {
        Decoration::None => return,
        Decoration::Underline => baseline + font_px * 0.1,
        Decoration::Strikethrough => baseline - font_px * 0.3,
    };
    surface.hline(x, y, width, stroke, BLACK);
}
