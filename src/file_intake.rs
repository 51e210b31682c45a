//! Image intake for the editor: native file dialog and drag-and-drop.
//!
//! Every accepted file is fully decoded to RGBA before it reaches the
//! editor; files that fail to decode are collected by name so the shell
//! can report them, and nothing else changes.

use eframe::egui;
use image::RgbaImage;
use log::{info, warn};

const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "webp", "bmp"];

/// Outcome of one intake pass: decoded rasters plus the names of files
/// that were refused.
#[derive(Default)]
pub struct IntakeResult {
    pub rasters: Vec<RgbaImage>,
    pub rejected: Vec<String>,
}

impl IntakeResult {
    pub fn is_empty(&self) -> bool {
        self.rasters.is_empty() && self.rejected.is_empty()
    }
}

#[derive(Default)]
pub struct FileIntake;

impl FileIntake {
    /// Open the native file dialog and decode whatever the user picked.
    pub fn pick_files(&self) -> IntakeResult {
        let mut result = IntakeResult::default();

        let Some(paths) = rfd::FileDialog::new()
            .add_filter("Images", IMAGE_EXTENSIONS)
            .pick_files()
        else {
            return result;
        };

        for path in paths {
            let name = path.display().to_string();
            match std::fs::read(&path) {
                Ok(bytes) => push_decoded(&mut result, &bytes, name),
                Err(err) => {
                    warn!("could not read {name}: {err}");
                    result.rejected.push(name);
                }
            }
        }
        result
    }

    /// Collect files dropped onto the window this frame.
    pub fn take_dropped(&self, ctx: &egui::Context) -> IntakeResult {
        let mut result = IntakeResult::default();

        let dropped = ctx.input(|i| i.raw.dropped_files.clone());
        for file in dropped {
            let name = if let Some(path) = &file.path {
                path.display().to_string()
            } else if !file.name.is_empty() {
                file.name.clone()
            } else {
                "unknown".to_owned()
            };

            if !is_image_file(&file) {
                warn!("dropped file is not a supported type: {name}");
                result.rejected.push(name);
                continue;
            }

            if let Some(bytes) = &file.bytes {
                push_decoded(&mut result, bytes, name);
            } else if let Some(path) = &file.path {
                match std::fs::read(path) {
                    Ok(bytes) => push_decoded(&mut result, &bytes, name),
                    Err(err) => {
                        warn!("failed to read dropped file {name}: {err}");
                        result.rejected.push(name);
                    }
                }
            } else {
                warn!("dropped file has no accessible data: {name}");
                result.rejected.push(name);
            }
        }
        result
    }

    /// Dim the window and list hovered files while a drag is in flight.
    pub fn preview_files_being_dropped(&self, ctx: &egui::Context) {
        use egui::{Align2, Color32, Id, LayerId, Order, TextStyle};

        if ctx.input(|i| i.raw.hovered_files.is_empty()) {
            return;
        }

        let text = ctx.input(|i| {
            let mut text = "Dropping images:\n".to_owned();
            for file in &i.raw.hovered_files {
                if let Some(path) = &file.path {
                    text += &format!("\n{}", path.display());
                } else {
                    text += "\n(path not available)";
                }
            }
            text
        });

        let painter = ctx.layer_painter(LayerId::new(Order::Foreground, Id::new("file_drop_target")));
        let screen_rect = ctx.screen_rect();
        painter.rect_filled(screen_rect, 0.0, Color32::from_black_alpha(192));
        painter.text(
            screen_rect.center(),
            Align2::CENTER_CENTER,
            text,
            ctx.style()
                .text_styles
                .get(&TextStyle::Heading)
                .cloned()
                .unwrap_or_else(|| egui::FontId::proportional(20.0)),
            Color32::WHITE,
        );
    }
}

fn push_decoded(result: &mut IntakeResult, bytes: &[u8], name: String) {
    match image::load_from_memory(bytes) {
        Ok(decoded) => {
            info!("decoded {name}: {}x{}", decoded.width(), decoded.height());
            result.rasters.push(decoded.to_rgba8());
        }
        Err(err) => {
            warn!("failed to decode {name}: {err}");
            result.rejected.push(name);
        }
    }
}

fn is_image_file(file: &egui::DroppedFile) -> bool {
    if !file.mime.is_empty() {
        file.mime.starts_with("image/")
    } else if let Some(path) = &file.path {
        path.extension()
            .map(|ext| {
                let ext = ext.to_string_lossy().to_lowercase();
                IMAGE_EXTENSIONS.contains(&ext.as_str())
            })
            .unwrap_or(false)
    } else {
        // In-memory drops without a mime type: let the decoder decide
        file.bytes.is_some()
    }
}
