//! Laser-engraving label renderer.
//! - Converts physical label sizes to pixels at 300 dpi
//! - Auto-fits plain or span-formatted text into the engrave zone,
//!   keeping clear of the hatched dead zone on the left edge
//! - Encodes the render as a byte-exact 1-bit BMP, optionally mirrored
//! - Scales thumbnails and saves with a reusable "overwrite" target

pub mod bmp;
pub mod builder;
pub mod consts;
pub mod error;
pub mod graphics;
pub mod layout;
pub mod preview;
pub mod save;
pub mod settings;
pub mod surface;
pub mod text;
pub mod typeset;
pub mod units;

pub use crate::{
    bmp::{encode, encode_rgba, row_size, BmpBytes},
    builder::{LabelJob, RenderedLabel},
    error::{Error, Result},
    graphics::FontBook,
    layout::{render_into, render_label, SafeArea},
    preview::{preview_dimensions, render_preview},
    save::{download_fallback, OverwriteSlot, PickError, SaveOutcome, SavePicker},
    settings::{Geometry, LabelSettings},
    surface::{RasterSurface, Rect},
    text::{Decoration, FontStyle, FontWeight, LabelContent, PlainText, RichText, TextSpan},
    typeset::{BlockTypesetter, FontSpec, Typesetter, VMetrics},
    units::{pixels_for, pixels_for_str, Unit},
};
