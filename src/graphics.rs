use std::collections::HashMap;
use std::fs;
use std::path::Path;

use ar_reshaper::{ArabicReshaper, ReshaperConfig};
use log::debug;
use rusttype::{point, Font, Scale};
use unicode_bidi::BidiInfo;

use crate::error::{Error, Result};
use crate::surface::RasterSurface;
use crate::text::{FontStyle, FontWeight};
use crate::typeset::{FontSpec, Typesetter, VMetrics};

const COVERAGE_THRESHOLD: f32 = 0.5; // hard threshold, the encoder is 1-bit anyway
const ITALIC_SHEAR: f32 = 0.2;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct FaceKey {
    family: String,
    weight: FontWeight,
    style: FontStyle,
}

impl FaceKey {
    fn new(family: &str, weight: FontWeight, style: FontStyle) -> Self {
        Self { family: family.trim().to_lowercase(), weight, style }
    }
}

/// TrueType faces keyed by family, weight and style.
///
/// Missing bold/italic faces are synthesised from the regular face: bold by
/// drawing twice with a small offset, italic by shearing glyph rows.
pub struct FontBook {
    faces: HashMap<FaceKey, Font<'static>>,
    fallback_family: Option<String>,
    reshaper: ArabicReshaper,
}

impl Default for FontBook {
    fn default() -> Self {
        Self::new()
    }
}

impl FontBook {
    pub fn new() -> Self {
        Self {
            faces: HashMap::new(),
            fallback_family: None,
            reshaper: ArabicReshaper::new(ReshaperConfig::default()),
        }
    }

    /// Register a face. The first family registered becomes the fallback for unknown families.
    pub fn add_face(&mut self, family: &str, weight: FontWeight, style: FontStyle, bytes: Vec<u8>) -> Result<()> {
        let font = Font::try_from_vec(bytes)
            .ok_or_else(|| Error::Font(format!("could not parse face for family {family:?}")))?;
        let key = FaceKey::new(family, weight, style);
        if self.fallback_family.is_none() {
            self.fallback_family = Some(key.family.clone());
        }
        debug!("registered face {family} {weight:?} {style:?}");
        self.faces.insert(key, font);
        Ok(())
    }

    pub fn add_face_file(
        &mut self,
        family: &str,
        weight: FontWeight,
        style: FontStyle,
        path: impl AsRef<Path>,
    ) -> Result<()> {
        let bytes = fs::read(path)?;
        self.add_face(family, weight, style, bytes)
    }

    pub fn is_empty(&self) -> bool {
        self.faces.is_empty()
    }

    /// Best face for `font` plus whether bold and italic must be synthesised.
    fn resolve(&self, font: &FontSpec<'_>) -> Option<(&Font<'static>, bool, bool)> {
        let wanted = FaceKey::new(font.family, font.weight, font.style);
        let families = std::iter::once(wanted.family.clone()).chain(self.fallback_family.clone());
        for family in families {
            let candidates = [
                (font.weight, font.style),
                (FontWeight::Normal, font.style),
                (font.weight, FontStyle::Normal),
                (FontWeight::Normal, FontStyle::Normal),
            ];
            for (weight, style) in candidates {
                let key = FaceKey { family: family.clone(), weight, style };
                if let Some(face) = self.faces.get(&key) {
                    let fake_bold = font.weight == FontWeight::Bold && weight != FontWeight::Bold;
                    let fake_italic = font.style == FontStyle::Italic && style != FontStyle::Italic;
                    return Some((face, fake_bold, fake_italic));
                }
            }
        }
        None
    }

    /// Visual-order string: BiDi runs, Arabic runs reshaped and reversed.
    fn visual(&self, text: &str) -> String {
        if text.is_empty() {
            return String::new();
        }
        let info = BidiInfo::new(text, None);
        let mut out = String::new();
        for para in &info.paragraphs {
            let (levels, runs) = info.visual_runs(para, para.range.clone());
            for run in runs {
                let level = levels[run.start];
                let slice = &text[run];
                if level.is_rtl() && slice.chars().any(|c| ('\u{0600}'..='\u{06FF}').contains(&c)) {
                    let shaped = self.reshaper.reshape(slice);
                    out.extend(shaped.chars().rev());
                } else {
                    out.push_str(slice);
                }
            }
        }
        out
    }
}

fn advance_width(font: &Font<'_>, text: &str, scale: Scale) -> f32 {
    font.layout(text, scale, point(0.0, 0.0))
        .last()
        .map(|g| g.position().x + g.unpositioned().h_metrics().advance_width)
        .unwrap_or(0.0)
}

/// Horizontal offset of the second synthetic-bold pass.
fn bold_offset(size_px: f32) -> f32 {
    (size_px / 24.0).round().max(1.0)
}

/// Extra ink right of the advance width left by synthetic bold and italic.
fn synthetic_overhang(size_px: f32, ascent: f32, fake_bold: bool, fake_italic: bool) -> f32 {
    let mut extra = 0.0;
    if fake_bold {
        extra += bold_offset(size_px);
    }
    if fake_italic {
        extra += (ascent.max(0.0) * ITALIC_SHEAR).ceil();
    }
    extra
}

impl Typesetter for FontBook {
    fn measure(&self, text: &str, font: &FontSpec<'_>) -> f32 {
        if font.size_px <= 0.0 {
            return 0.0;
        }
        let Some((face, fake_bold, fake_italic)) = self.resolve(font) else {
            return 0.0;
        };
        let scale = Scale::uniform(font.size_px);
        let width = advance_width(face, &self.visual(text), scale);
        if width <= 0.0 {
            return width;
        }
        // synthetic styles draw past the advance, so they count toward the width
        width + synthetic_overhang(font.size_px, face.v_metrics(scale).ascent, fake_bold, fake_italic)
    }

    fn v_metrics(&self, font: &FontSpec<'_>) -> VMetrics {
        match self.resolve(font) {
            Some((face, _, _)) if font.size_px > 0.0 => {
                let vm = face.v_metrics(Scale::uniform(font.size_px));
                VMetrics { ascent: vm.ascent, descent: vm.descent }
            }
            _ => VMetrics { ascent: 0.0, descent: 0.0 },
        }
    }

    fn draw(&self, surface: &mut RasterSurface, text: &str, font: &FontSpec<'_>, origin: (f32, f32), color: [u8; 4]) {
        if surface.is_empty() || font.size_px <= 0.0 {
            return;
        }
        let Some((face, fake_bold, fake_italic)) = self.resolve(font) else {
            return;
        };
        let visual = self.visual(text);
        let scale = Scale::uniform(font.size_px);
        let bold_dx = bold_offset(font.size_px);
        let passes: &[f32] = if fake_bold { &[0.0, bold_dx] } else { &[0.0] };
        let baseline = origin.1;

        for &dx in passes {
            for g in face.layout(&visual, scale, point(origin.0 + dx, baseline)) {
                if let Some(bb) = g.pixel_bounding_box() {
                    g.draw(|x, y, v| {
                        if v > COVERAGE_THRESHOLD {
                            let py = y as i64 + bb.min.y as i64;
                            let mut px = x as i64 + bb.min.x as i64;
                            if fake_italic {
                                px += ((baseline - py as f32) * ITALIC_SHEAR).round() as i64;
                            }
                            surface.put_pixel(px, py, color);
                        }
                    });
                }
            }
        }
    }
}
