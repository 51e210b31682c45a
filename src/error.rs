use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while opening or running a camera stream
#[derive(Error, Debug)]
pub enum CameraError {
    /// The OS refused camera access. Only recoverable by re-granting
    /// permission and restarting the app.
    #[error("camera access denied: {0}")]
    PermissionDenied(String),
    /// The requested device (or facing mode) is not present or is held
    /// by another process.
    #[error("camera unavailable: {0}")]
    DeviceUnavailable(String),
    #[error("no physical camera found")]
    NoDevice,
    #[error("capture thread failed to start: {0}")]
    Thread(String),
}

impl CameraError {
    pub fn is_permission_denied(&self) -> bool {
        matches!(self, CameraError::PermissionDenied(_))
    }
}

/// Errors raised by the persisted overlay store
#[derive(Error, Debug)]
pub enum StoreError {
    /// Byte-identical overlay already present; the store is unchanged.
    #[error("an identical overlay is already stored")]
    AlreadyExists,
    #[error("selection index {index} out of range (store holds {len})")]
    InvalidSelection { index: usize, len: usize },
    #[error("no overlay with id {0}")]
    UnknownId(uuid::Uuid),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("corrupt overlay index: {0}")]
    Index(#[from] serde_json::Error),
}

/// Errors raised while compositing a captured photo
#[derive(Error, Debug)]
pub enum CaptureError {
    #[error("no camera frame available yet")]
    NoFrame,
    #[error("frame buffer does not match its reported dimensions")]
    BadFrame,
    /// The selected overlay could not be decoded; nothing is drawn.
    #[error("overlay image failed to decode: {0}")]
    OverlayDecode(#[source] image::ImageError),
    #[error("png encoding failed: {0}")]
    Encode(#[from] image::ImageError),
}

/// Errors raised while handing a finished photo to the platform.
/// All of these are non-fatal: the composited photo is never corrupted
/// and the user may simply capture again.
#[derive(Error, Debug)]
pub enum ShareError {
    #[error("no pictures directory available on this system")]
    NoTarget,
    #[error("could not save photo: {0}")]
    Save(#[from] std::io::Error),
    /// The photo was written but the platform handler refused to open it.
    #[error("saved to {path:?} but the system handler failed: {reason}")]
    Handler { path: PathBuf, reason: String },
}
