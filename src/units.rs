use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::consts::DPI;

/// Physical unit a label dimension is expressed in.
///
/// Unknown unit strings deserialize to [`Unit::Pixel`], which converts as a
/// passthrough instead of failing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Unit {
    #[default]
    Millimeter,
    Centimeter,
    Inch,
    Pixel,
}

impl Unit {
    pub fn as_str(self) -> &'static str {
        match self {
            Unit::Millimeter => "mm",
            Unit::Centimeter => "cm",
            Unit::Inch => "in",
            Unit::Pixel => "px",
        }
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Unit {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim().to_ascii_lowercase().as_str() {
            "mm" => Unit::Millimeter,
            "cm" => Unit::Centimeter,
            "in" => Unit::Inch,
            _ => Unit::Pixel,
        })
    }
}

impl Serialize for Unit {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Unit {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(raw.parse().unwrap_or(Unit::Pixel))
    }
}

/// Convert a physical length to pixels at 300 dpi.
pub fn pixels_for(value: f32, unit: Unit) -> f32 {
    match unit {
        Unit::Millimeter => value / 25.4 * DPI,
        Unit::Centimeter => value / 2.54 * DPI,
        Unit::Inch => value * DPI,
        Unit::Pixel => value,
    }
}

/// Same as [`pixels_for`] for a raw unit name; unrecognised names pass the value through.
pub fn pixels_for_str(value: f32, unit: &str) -> f32 {
    // FromStr for Unit is infallible
    let unit = unit.parse().unwrap_or(Unit::Pixel);
    pixels_for(value, unit)
}

/// Whole-pixel surface extent for a physical length (truncated toward zero).
pub fn surface_extent(value: f32, unit: Unit) -> u32 {
    let px = pixels_for(value, unit);
    if px.is_finite() && px > 0.0 { px as u32 } else { 0 }
}
