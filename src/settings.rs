use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::consts::{DEFAULT_FONT_PT, MAX_AUTO_SIZE_PT, PT_TO_PX};
use crate::error::{Error, Result};
use crate::units::{pixels_for, surface_extent, Unit};

/// Physical label description as entered by the operator.
///
/// Keys use the camelCase names of the settings files written by the
/// label designer front-end, so a saved preset can be fed straight in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LabelSettings {
    pub width: f32,
    pub height: f32,
    /// Width of the dead zone reserved on the left edge
    pub padding: f32,
    pub unit: Unit,
    #[serde(alias = "mirrored")]
    pub is_flipped: bool,
    /// Explicit size in points when auto-size is off; `None`/`0` means 24pt
    pub font_size: Option<f32>,
    pub auto_size: bool,
    pub rich_text: bool,
    pub max_font_size: f32,
}

impl Default for LabelSettings {
    fn default() -> Self {
        Self {
            width: 50.0,
            height: 20.0,
            padding: 5.0,
            unit: Unit::Millimeter,
            is_flipped: false,
            font_size: Some(DEFAULT_FONT_PT),
            auto_size: true,
            rich_text: false,
            max_font_size: MAX_AUTO_SIZE_PT,
        }
    }
}

impl LabelSettings {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let raw = fs::read_to_string(path)?;
        Self::from_json(&raw)
    }

    /// Check width/height/padding are positive and the dead zone leaves room to engrave.
    pub fn validate(&self) -> Result<()> {
        for (name, v) in [("width", self.width), ("height", self.height), ("padding", self.padding)] {
            if !v.is_finite() || v <= 0.0 {
                return Err(Error::InvalidSettings(format!("{name} must be positive, got {v}")));
            }
        }
        if self.padding >= self.width {
            return Err(Error::InvalidSettings(format!(
                "padding {} must be smaller than width {}",
                self.padding, self.width
            )));
        }
        if !self.max_font_size.is_finite() || self.max_font_size <= 0.0 {
            return Err(Error::InvalidSettings(format!(
                "maxFontSize must be positive, got {}",
                self.max_font_size
            )));
        }
        Ok(())
    }

    /// Explicit font size in points, falling back to 24pt when unset or zero.
    pub fn explicit_font_pt(&self) -> f32 {
        match self.font_size {
            Some(pt) if pt > 0.0 && pt.is_finite() => pt,
            _ => DEFAULT_FONT_PT,
        }
    }

    /// Largest pixel size the plain-text auto-fit may pick.
    pub fn max_auto_px(&self) -> f32 {
        self.max_font_size * PT_TO_PX
    }

    pub fn geometry(&self) -> Geometry {
        Geometry {
            width: surface_extent(self.width, self.unit),
            height: surface_extent(self.height, self.unit),
            padding: pixels_for(self.padding, self.unit).max(0.0),
        }
    }
}

/// Pixel geometry of a label surface at 300 dpi.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Geometry {
    pub width: u32,
    pub height: u32,
    /// Dead-zone width in (fractional) pixels
    pub padding: f32,
}

impl Geometry {
    pub fn engrave_x(&self) -> f32 {
        self.padding
    }

    pub fn engrave_width(&self) -> f32 {
        (self.width as f32 - self.padding).max(0.0)
    }

    pub fn engrave_height(&self) -> f32 {
        self.height as f32
    }
}
