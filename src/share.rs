//! Share/export sink for finished photos.
//!
//! The capture pipeline hands a PNG here; the system implementation
//! writes it under the user's pictures directory and asks the platform
//! to open it. Failures are reported but never fatal: the saved photo is
//! intact and the user can simply capture again.

use std::fs;
use std::path::PathBuf;

use chrono::Local;
use log::{info, warn};

use crate::error::ShareError;

/// Destination for captured photos. Boxed in the app so tests can
/// substitute a recording sink.
pub trait ShareSink {
    /// Hand off an encoded photo. Returns the path it ended up at.
    fn share(&self, png: &[u8], file_name: &str) -> Result<PathBuf, ShareError>;
}

/// Saves photos to `<pictures_dir>/Decocam` and opens them with the
/// platform's default handler.
#[derive(Debug, Default)]
pub struct SystemShare;

impl ShareSink for SystemShare {
    fn share(&self, png: &[u8], file_name: &str) -> Result<PathBuf, ShareError> {
        let dir = dirs::picture_dir()
            .ok_or(ShareError::NoTarget)?
            .join("Decocam");
        fs::create_dir_all(&dir)?;

        let path = dir.join(file_name);
        fs::write(&path, png)?;
        info!("photo saved to {}", path.display());

        if let Err(err) = open::that_detached(&path) {
            warn!("system handler refused {}: {err}", path.display());
            return Err(ShareError::Handler {
                path,
                reason: err.to_string(),
            });
        }
        Ok(path)
    }
}

/// Timestamped photo file name, e.g. `photo_20250704_142301.png`.
pub fn photo_file_name() -> String {
    format!("photo_{}.png", Local::now().format("%Y%m%d_%H%M%S"))
}
