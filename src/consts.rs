// Engraving geometry and rendering constants
pub const DPI: f32 = 300.0;
pub const PT_TO_PX: f32 = DPI / 72.0;
pub const PIXELS_PER_METER: i32 = 11811; // 300 dpi

pub const SAFETY_MARGIN: f32 = 0.05;     // per side of the engrave zone
pub const LINE_HEIGHT: f32 = 1.2;
pub const HATCH_SPACING: f32 = 10.0;     // dead-zone hatch pitch, px

pub const DEFAULT_FONT_PT: f32 = 24.0;
pub const MAX_AUTO_SIZE_PT: f32 = 32.0;
pub const DEFAULT_FAMILY: &str = "sans-serif";

pub const RICH_SCALE_MIN: f32 = 0.01;
pub const RICH_SCALE_EPSILON: f32 = 0.1; // bisection stops below this interval width

pub const BLACK_THRESHOLD: f64 = 128.0;  // luminance <= threshold engraves

pub const WHITE: [u8; 4] = [0xFF, 0xFF, 0xFF, 0xFF];
pub const BLACK: [u8; 4] = [0x00, 0x00, 0x00, 0xFF];
pub const DEAD_ZONE_FILL: [u8; 4] = [0xF3, 0xF4, 0xF6, 0xFF];
pub const DEAD_ZONE_HATCH: [u8; 4] = [0xD1, 0xD5, 0xDB, 0xFF];

pub const PREVIEW_MAX_W: u32 = 200;
pub const PREVIEW_MAX_H: u32 = 100;
