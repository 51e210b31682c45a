use eframe::egui;
use egui::{ColorImage, TextureHandle, TextureOptions, Vec2};
use log::{error, info, warn};
use serde::{Deserialize, Serialize};

use crate::camera::{self, CameraStream, DeviceDescriptor, Facing, devices};
use crate::capture;
use crate::editor::{OverlayEditor, TouchTracker};
use crate::error::{CameraError, StoreError};
use crate::file_intake::{FileIntake, IntakeResult};
use crate::panels;
use crate::share::{ShareSink, SystemShare, photo_file_name};
use crate::store::{OverlayStore, default_store_dir};
use crate::texture_cache::{TextureCache, overlay_key};

/// Which surface the app is currently showing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Capture,
    Editor,
}

/// Restored across runs via eframe storage
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct Prefs {
    pub facing: Facing,
}

impl Default for Prefs {
    fn default() -> Self {
        Self {
            facing: Facing::Back,
        }
    }
}

/// Transient user-visible message (duplicate overlay, share failure, ...)
pub(crate) struct Notice {
    pub text: String,
}

pub struct DecoCamApp {
    pub(crate) screen: Screen,
    prefs: Prefs,

    devices: Vec<DeviceDescriptor>,
    camera: Option<CameraStream>,
    /// Set when the camera could not be opened; a permission denial
    /// blocks capture but leaves the picker and editor usable.
    pub(crate) camera_error: Option<CameraError>,

    pub(crate) store: OverlayStore,
    pub(crate) editor: OverlayEditor,
    share: Box<dyn ShareSink>,

    pub(crate) intake: FileIntake,
    pub(crate) touches: TouchTracker,
    pub(crate) textures: TextureCache,

    preview_texture: Option<TextureHandle>,
    preview_frame: u64,
    preview_size: Vec2,

    pub(crate) picker_open: bool,
    notice: Option<Notice>,
}

impl DecoCamApp {
    /// Called once before the first frame.
    pub fn new(cc: &eframe::CreationContext<'_>) -> Self {
        let prefs: Prefs = cc
            .storage
            .and_then(|storage| eframe::get_value(storage, eframe::APP_KEY))
            .unwrap_or_default();

        let store = match default_store_dir() {
            Some(dir) => OverlayStore::load(dir).unwrap_or_else(|err| {
                error!("overlay store unavailable, continuing in memory: {err}");
                OverlayStore::ephemeral()
            }),
            None => {
                warn!("no data directory on this system; overlays will not persist");
                OverlayStore::ephemeral()
            }
        };

        let mut app = Self {
            screen: Screen::Capture,
            prefs,
            devices: Vec::new(),
            camera: None,
            camera_error: None,
            store,
            editor: OverlayEditor::new(),
            share: Box::new(SystemShare),
            intake: FileIntake::default(),
            touches: TouchTracker::default(),
            textures: TextureCache::new(64),
            preview_texture: None,
            preview_frame: 0,
            preview_size: Vec2::ZERO,
            picker_open: false,
            notice: None,
        };
        app.init_camera();
        app
    }

    /// Probe permission, enumerate devices, open the preferred stream.
    fn init_camera(&mut self) {
        if let Err(err) = devices::ensure_permission() {
            if err.is_permission_denied() {
                error!("camera permission denied: {err}");
                self.camera_error = Some(err);
                return;
            }
            // A failed probe without a denial just means enumeration may
            // still succeed (e.g. the probe device is busy).
            warn!("permission probe failed: {err}");
        }

        match devices::list_physical_cameras() {
            Ok(devices) => self.devices = devices,
            Err(err) => {
                error!("device enumeration failed: {err}");
                self.camera_error = Some(err);
                return;
            }
        }

        self.open_camera(self.prefs.facing);
    }

    fn open_camera(&mut self, facing: Facing) {
        match camera::open_facing(&self.devices, facing) {
            Ok((stream, actual)) => {
                info!("streaming from {} ({actual:?})", stream.label());
                self.camera = Some(stream);
                self.prefs.facing = actual;
                self.camera_error = None;
            }
            Err(err) => {
                error!("could not open camera: {err}");
                self.camera = None;
                self.camera_error = Some(err);
            }
        }
    }

    /// Toggle between front and back cameras. The old stream's hardware
    /// handle is fully released before the new request.
    pub(crate) fn switch_camera(&mut self) {
        if let Some(mut stream) = self.camera.take() {
            stream.close();
        }
        self.preview_texture = None;
        self.preview_frame = 0;
        self.open_camera(self.prefs.facing.toggled());
    }

    pub(crate) fn can_switch(&self) -> bool {
        devices::can_switch_camera(&self.devices)
    }

    /// Upload the newest camera frame as the preview texture, skipping
    /// the upload when no new frame arrived since last repaint.
    pub(crate) fn preview(&mut self, ctx: &egui::Context) -> Option<(egui::TextureId, Vec2)> {
        let stream = self.camera.as_ref()?;
        let current = stream.frame_number();

        if current != self.preview_frame || self.preview_texture.is_none() {
            let frame = stream.latest_frame()?;
            if frame.data.len() != (frame.width * frame.height * 4) as usize {
                warn!("skipping malformed frame #{}", frame.frame_number);
                return None;
            }
            let image = ColorImage::from_rgba_unmultiplied(
                [frame.width as usize, frame.height as usize],
                &frame.data,
            );
            match &mut self.preview_texture {
                Some(handle) => handle.set(image, TextureOptions::LINEAR),
                None => {
                    self.preview_texture =
                        Some(ctx.load_texture("camera-preview", image, TextureOptions::LINEAR));
                }
            }
            self.preview_frame = frame.frame_number;
            self.preview_size = Vec2::new(frame.width as f32, frame.height as f32);
        }

        self.preview_texture
            .as_ref()
            .map(|handle| (handle.id(), self.preview_size))
    }

    /// Shutter press: crop the live frame, composite the selected
    /// overlay, and hand the photo to the share sink.
    pub(crate) fn capture_photo(&mut self) {
        let Some(stream) = &self.camera else {
            self.notify("The camera is not running.");
            return;
        };
        let Some(frame) = stream.latest_frame() else {
            self.notify("No camera frame yet, try again.");
            return;
        };

        // The overlay decode must complete before the draw that uses it.
        let overlay = match self.store.selected() {
            Some(entry) => match capture::decode_overlay(entry.png()) {
                Ok(raster) => Some(raster),
                Err(err) => {
                    warn!("selected overlay is unusable: {err}");
                    self.notify(format!("Overlay failed to decode: {err}"));
                    return;
                }
            },
            None => None,
        };

        let photo = match capture::compose(&frame, overlay.as_ref()) {
            Ok(photo) => photo,
            Err(err) => {
                error!("capture failed: {err}");
                self.notify(format!("Capture failed: {err}"));
                return;
            }
        };

        let png = match capture::encode_png(&photo) {
            Ok(png) => png,
            Err(err) => {
                error!("encoding failed: {err}");
                self.notify(format!("Capture failed: {err}"));
                return;
            }
        };

        match self.share.share(&png, &photo_file_name()) {
            Ok(path) => self.notify(format!("Saved to {}", path.display())),
            Err(err) => {
                // Non-fatal: the photo (if written) is intact and the
                // user may capture again.
                warn!("share failed: {err}");
                self.notify(err.to_string());
            }
        }
    }

    /// Toggle an overlay selection from the picker.
    pub(crate) fn toggle_overlay(&mut self, index: usize) {
        let next = if self.store.selection() == Some(index) {
            None
        } else {
            Some(index)
        };
        if let Err(err) = self.store.select(next) {
            warn!("selection refused: {err}");
        }
    }

    pub(crate) fn remove_overlay(&mut self, id: uuid::Uuid) {
        self.textures.invalidate(overlay_key(&id));
        if let Err(err) = self.store.remove(id) {
            warn!("remove failed: {err}");
            self.notify(format!("Could not delete overlay: {err}"));
        }
    }

    pub(crate) fn open_editor(&mut self) {
        self.editor.reset();
        self.picker_open = false;
        self.screen = Screen::Editor;
    }

    /// Add picked/dropped files to the editor session, reporting any
    /// that failed to decode.
    pub(crate) fn apply_intake(&mut self, result: IntakeResult) {
        if result.is_empty() {
            return;
        }
        if !result.rasters.is_empty() {
            self.editor.add_images(result.rasters);
        }
        if !result.rejected.is_empty() {
            self.notify(format!(
                "Not a valid image: {}",
                result.rejected.join(", ")
            ));
        }
    }

    /// Flatten the session and append it to the store; duplicates are
    /// refused with a notice and the session stays open.
    pub(crate) fn editor_save(&mut self) {
        let flattened = self.editor.export();
        let png = match capture::encode_png(&flattened) {
            Ok(png) => png,
            Err(err) => {
                error!("export failed: {err}");
                self.notify(format!("Export failed: {err}"));
                return;
            }
        };

        match self.store.append(png) {
            Ok(id) => {
                info!("saved overlay {id}");
                // select the overlay that was just created
                let last = self.store.len() - 1;
                let _ = self.store.select(Some(last));
                self.editor.reset();
                self.screen = Screen::Capture;
            }
            Err(StoreError::AlreadyExists) => {
                self.notify("An identical overlay is already stored.");
            }
            Err(err) => {
                error!("store append failed: {err}");
                self.notify(format!("Could not save overlay: {err}"));
            }
        }
    }

    pub(crate) fn editor_cancel(&mut self) {
        self.editor.reset();
        self.screen = Screen::Capture;
    }

    pub(crate) fn notify(&mut self, text: impl Into<String>) {
        self.notice = Some(Notice { text: text.into() });
    }

    fn show_notice(&mut self, ctx: &egui::Context) {
        let Some(notice) = &self.notice else {
            return;
        };
        let mut dismissed = false;
        egui::Window::new("Notice")
            .anchor(egui::Align2::CENTER_TOP, [0.0, 24.0])
            .collapsible(false)
            .resizable(false)
            .show(ctx, |ui| {
                ui.label(&notice.text);
                if ui.button("Dismiss").clicked() {
                    dismissed = true;
                }
            });
        if dismissed {
            self.notice = None;
        }
    }
}

impl eframe::App for DecoCamApp {
    /// Called by the framework to save state before shutdown.
    fn save(&mut self, storage: &mut dyn eframe::Storage) {
        eframe::set_value(storage, eframe::APP_KEY, &self.prefs);
    }

    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.textures.begin_frame();

        match self.screen {
            Screen::Capture => {
                panels::capture_panel(self, ctx);
                panels::picker_panel(self, ctx);
            }
            Screen::Editor => panels::editor_panel(self, ctx),
        }

        self.show_notice(ctx);

        // Live preview: keep repainting while a stream is open
        if self.camera.is_some() && self.screen == Screen::Capture {
            ctx.request_repaint();
        }
    }
}
