//! "Overwrite same file" saving.
//!
//! The first save asks a [`SavePicker`] for a location and caches it in an
//! [`OverwriteSlot`]; later saves write there silently. A cancelled prompt or
//! write is reported as [`SaveOutcome::Cancelled`] and keeps the slot as is.
//! Any other failure clears the slot and returns [`SaveOutcome::Fallback`],
//! so the caller can fall back to a plain download and the next save asks again.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use log::{info, warn};

use crate::bmp::BmpBytes;
use crate::error::Result;

pub const DEFAULT_FILE_NAME: &str = "output.bmp";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PickError {
    /// The operator dismissed the prompt
    Cancelled,
    Failed(String),
}

/// Environment-provided "choose where to save" capability.
pub trait SavePicker {
    fn pick(&mut self, suggested_name: &str) -> std::result::Result<PathBuf, PickError>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveOutcome {
    Saved(PathBuf),
    Cancelled,
    /// Overwrite saving is unavailable or failed; use [`download_fallback`]
    Fallback,
}

/// Single cached save location. Last writer wins; `&mut self` keeps exports serialised.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct OverwriteSlot {
    target: Option<PathBuf>,
}

impl OverwriteSlot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn target(&self) -> Option<&Path> {
        self.target.as_deref()
    }

    pub fn invalidate(&mut self) {
        self.target = None;
    }

    /// Save `bmp`, prompting through `picker` only while the slot is empty.
    /// `picker` is `None` when the environment has no save prompt.
    pub fn save(&mut self, bmp: &BmpBytes, picker: Option<&mut dyn SavePicker>, suggested_name: &str) -> SaveOutcome {
        let Some(picker) = picker else {
            return SaveOutcome::Fallback;
        };

        let target = match self.target.clone() {
            Some(path) => path,
            None => match picker.pick(suggested_name) {
                Ok(path) => {
                    self.target = Some(path.clone());
                    path
                }
                Err(PickError::Cancelled) => return SaveOutcome::Cancelled,
                Err(PickError::Failed(reason)) => {
                    warn!("save prompt failed: {reason}");
                    self.invalidate();
                    return SaveOutcome::Fallback;
                }
            },
        };

        match fs::write(&target, bmp.as_bytes()) {
            Ok(()) => {
                info!("saved {} bytes to {}", bmp.len(), target.display());
                SaveOutcome::Saved(target)
            }
            Err(e) if e.kind() == ErrorKind::Interrupted => SaveOutcome::Cancelled,
            Err(e) => {
                warn!("overwrite of {} failed: {e}", target.display());
                self.invalidate();
                SaveOutcome::Fallback
            }
        }
    }
}

/// Plain "download": write `bmp` as `name` inside `dir`.
pub fn download_fallback(bmp: &BmpBytes, dir: impl AsRef<Path>, name: &str) -> Result<PathBuf> {
    let path = dir.as_ref().join(name);
    fs::write(&path, bmp.as_bytes())?;
    info!("downloaded {} bytes to {}", bmp.len(), path.display());
    Ok(path)
}
