use thiserror::Error;

/// All errors the crate can produce while rendering, encoding or saving a label.
#[derive(Error, Debug)]
pub enum Error {
    /// Settings violate the label geometry invariants
    #[error("invalid label settings: {0}")]
    InvalidSettings(String),

    /// The raster buffer does not match its declared dimensions
    #[error("raster surface is unreadable: expected {expected} bytes, found {found}")]
    Surface { expected: usize, found: usize },

    /// [rusttype] could not parse a font file
    #[error("font error: {0}")]
    Font(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Image(#[from] image::ImageError),
}

pub type Result<T> = std::result::Result<T, Error>;
