//! Camera capture module
//!
//! Opens a camera device via nokhwa and pulls frames on a dedicated
//! worker thread. The newest decoded frame sits in a shared slot the UI
//! clones out once per repaint; a frame counter lets callers skip
//! texture re-uploads when nothing new arrived.

pub mod devices;

pub use devices::{DeviceDescriptor, Facing};

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::mpsc;
use std::thread::JoinHandle;
use std::time::Duration;

use image::RgbaImage;
use log::{info, warn};
use nokhwa::Camera;
use nokhwa::pixel_format::RgbAFormat;
use nokhwa::utils::{CameraIndex, RequestedFormat, RequestedFormatType, Resolution};
use parking_lot::Mutex;

use crate::error::{CameraError, CaptureError};

/// Requested stream resolution; not guaranteed by the device.
pub const REQUESTED_WIDTH: u32 = 1920;
pub const REQUESTED_HEIGHT: u32 = 1080;

/// One decoded RGBA frame from the camera
#[derive(Clone)]
pub struct CameraFrame {
    /// RGBA pixel data, `width * height * 4` bytes
    pub data: Vec<u8>,
    pub width: u32,
    pub height: u32,
    /// Monotonic per-stream frame number
    pub frame_number: u64,
}

impl CameraFrame {
    pub fn to_rgba(&self) -> Result<RgbaImage, CaptureError> {
        RgbaImage::from_raw(self.width, self.height, self.data.clone()).ok_or(CaptureError::BadFrame)
    }
}

/// An open camera stream backed by a capture worker thread.
///
/// The OS treats cameras as an exclusive resource, so [`close`] joins the
/// worker before returning; a new stream may then be opened safely.
///
/// [`close`]: CameraStream::close
pub struct CameraStream {
    label: String,
    latest: Arc<Mutex<Option<CameraFrame>>>,
    running: Arc<AtomicBool>,
    frame_count: Arc<AtomicU64>,
    thread: Option<JoinHandle<()>>,
}

impl CameraStream {
    /// Open a stream on the given device.
    ///
    /// The worker thread reports the outcome of opening the device back
    /// over a channel, so failures (permission, busy device) surface here
    /// rather than being swallowed in the background.
    pub fn open(device: &DeviceDescriptor) -> Result<Self, CameraError> {
        let latest: Arc<Mutex<Option<CameraFrame>>> = Arc::new(Mutex::new(None));
        let running = Arc::new(AtomicBool::new(true));
        let frame_count = Arc::new(AtomicU64::new(0));
        let (tx, rx) = mpsc::channel();

        let index = device.index.clone();
        let worker_latest = latest.clone();
        let worker_running = running.clone();
        let worker_frame_count = frame_count.clone();

        let thread = std::thread::Builder::new()
            .name("camera-capture".to_string())
            .spawn(move || {
                capture_worker(index, tx, worker_latest, worker_running, worker_frame_count);
            })
            .map_err(|e| CameraError::Thread(e.to_string()))?;

        match rx.recv() {
            Ok(Ok(())) => Ok(Self {
                label: device.label.clone(),
                latest,
                running,
                frame_count,
                thread: Some(thread),
            }),
            Ok(Err(err)) => {
                let _ = thread.join();
                Err(err)
            }
            Err(_) => {
                let _ = thread.join();
                Err(CameraError::Thread(
                    "capture thread exited before reporting".to_string(),
                ))
            }
        }
    }

    /// Latest decoded frame, if any arrived yet.
    pub fn latest_frame(&self) -> Option<CameraFrame> {
        self.latest.lock().clone()
    }

    /// Number of frames decoded so far. The UI compares this against the
    /// frame number of its uploaded preview texture.
    pub fn frame_number(&self) -> u64 {
        self.frame_count.load(Ordering::Acquire)
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// Stop the worker and release the device handle. Must complete
    /// before another stream is opened on the same hardware.
    pub fn close(&mut self) {
        self.running.store(false, Ordering::Release);
        if let Some(handle) = self.thread.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for CameraStream {
    fn drop(&mut self) {
        self.close();
    }
}

/// Open the preferred device for a facing mode. A failed rear-camera
/// request is retried once against the front camera; the facing actually
/// opened is returned alongside the stream.
pub fn open_facing(
    devices: &[DeviceDescriptor],
    facing: Facing,
) -> Result<(CameraStream, Facing), CameraError> {
    let device = devices::preferred_default(devices, facing).ok_or(CameraError::NoDevice)?;

    match CameraStream::open(device) {
        Ok(stream) => Ok((stream, facing)),
        Err(err) if facing == Facing::Back && !err.is_permission_denied() => {
            warn!("rear camera failed ({err}), retrying with front camera");
            let fallback =
                devices::preferred_default(devices, Facing::Front).ok_or(CameraError::NoDevice)?;
            let stream = CameraStream::open(fallback)?;
            Ok((stream, Facing::Front))
        }
        Err(err) => Err(err),
    }
}

fn capture_worker(
    index: CameraIndex,
    ready: mpsc::Sender<Result<(), CameraError>>,
    latest: Arc<Mutex<Option<CameraFrame>>>,
    running: Arc<AtomicBool>,
    frame_count: Arc<AtomicU64>,
) {
    let mut camera = match open_camera(index) {
        Ok(camera) => camera,
        Err(err) => {
            let _ = ready.send(Err(err));
            return;
        }
    };

    if let Err(err) = camera.open_stream() {
        let _ = ready.send(Err(devices::classify(&err)));
        return;
    }

    info!(
        "camera opened: {} ({}x{})",
        camera.info().human_name(),
        camera.resolution().width(),
        camera.resolution().height()
    );
    let _ = ready.send(Ok(()));

    while running.load(Ordering::Acquire) {
        match camera.frame() {
            Ok(buffer) => match buffer.decode_image::<RgbAFormat>() {
                Ok(decoded) => {
                    let number = frame_count.fetch_add(1, Ordering::AcqRel) + 1;
                    let frame = CameraFrame {
                        width: buffer.resolution().width(),
                        height: buffer.resolution().height(),
                        data: decoded.into_raw(),
                        frame_number: number,
                    };
                    *latest.lock() = Some(frame);
                }
                Err(err) => warn!("failed to decode frame: {err}"),
            },
            Err(err) => {
                warn!("failed to capture frame: {err}");
                std::thread::sleep(Duration::from_millis(10));
            }
        }
    }

    if let Err(err) = camera.stop_stream() {
        warn!("stopping stream: {err}");
    }
    info!("camera capture thread stopped");
}

/// Open the device, walking down a ladder of format requests until one
/// is accepted.
fn open_camera(index: CameraIndex) -> Result<Camera, CameraError> {
    let requested =
        RequestedFormat::new::<RgbAFormat>(RequestedFormatType::AbsoluteHighestResolution);
    match Camera::new(index.clone(), requested) {
        Ok(camera) => return Ok(camera),
        Err(err) => warn!("highest-resolution format refused: {err}"),
    }

    let requested = RequestedFormat::new::<RgbAFormat>(RequestedFormatType::HighestResolution(
        Resolution::new(REQUESTED_WIDTH, REQUESTED_HEIGHT),
    ));
    match Camera::new(index.clone(), requested) {
        Ok(camera) => return Ok(camera),
        Err(err) => warn!("{REQUESTED_WIDTH}x{REQUESTED_HEIGHT} format refused: {err}"),
    }

    let requested = RequestedFormat::new::<RgbAFormat>(RequestedFormatType::None);
    Camera::new(index, requested).map_err(|e| devices::classify(&e))
}
