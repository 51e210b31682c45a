//! Capture screen: live preview with the selected overlay on top, and
//! the shutter / picker / camera-switch controls.

use eframe::egui::{self, Align2, Color32, Pos2, Rect, RichText, Vec2};

use crate::app::DecoCamApp;
use crate::texture_cache::overlay_key;

/// Full UV rect (0,0) to (1,1)
const FULL_UV: Rect = Rect {
    min: egui::pos2(0.0, 0.0),
    max: egui::pos2(1.0, 1.0),
};

pub fn capture_panel(app: &mut DecoCamApp, ctx: &egui::Context) {
    // A permission denial blocks capture until re-granted; the picker
    // and editor stay usable.
    if app
        .camera_error
        .as_ref()
        .is_some_and(|err| err.is_permission_denied())
    {
        egui::Window::new("Camera access denied")
            .anchor(Align2::CENTER_CENTER, [0.0, 0.0])
            .collapsible(false)
            .resizable(false)
            .show(ctx, |ui| {
                ui.label("Grant camera access in your system settings, then restart the app.");
            });
    }

    egui::TopBottomPanel::bottom("capture_bar")
        .exact_height(88.0)
        .show(ctx, |ui| {
            bottom_bar(app, ui);
        });

    egui::CentralPanel::default().show(ctx, |ui| {
        let area = ui.available_rect_before_wrap();
        let viewport = portrait_viewport(area);
        let painter = ui.painter();
        painter.rect_filled(viewport, 4.0, Color32::BLACK);

        match app.preview(ctx) {
            Some((texture, frame_size)) => {
                painter.image(texture, viewport, crop_uv(frame_size), Color32::WHITE);
            }
            None => {
                let message = match &app.camera_error {
                    Some(err) => err.to_string(),
                    None => "Waiting for the camera…".to_owned(),
                };
                painter.text(
                    viewport.center(),
                    Align2::CENTER_CENTER,
                    message,
                    egui::FontId::proportional(16.0),
                    Color32::WHITE,
                );
            }
        }

        // Selected overlay, stretched over the whole viewport like it
        // will be on the captured photo
        if let Some(entry) = app.store.selected() {
            let key = overlay_key(&entry.id());
            let png = entry.png();
            let texture = app
                .textures
                .get_or_create(key, 0, || decode_thumbnail(png), ctx);
            ui.painter().image(texture, viewport, FULL_UV, Color32::WHITE);
        }
    });
}

fn bottom_bar(app: &mut DecoCamApp, ui: &mut egui::Ui) {
    ui.columns(3, |columns| {
        columns[0].centered_and_justified(|ui| {
            if ui
                .button(RichText::new("🖼").size(24.0))
                .on_hover_text("Choose overlay")
                .clicked()
            {
                app.picker_open = !app.picker_open;
            }
        });
        columns[1].centered_and_justified(|ui| {
            if ui
                .button(RichText::new("📷").size(32.0))
                .on_hover_text("Take photo")
                .clicked()
            {
                app.capture_photo();
            }
        });
        columns[2].centered_and_justified(|ui| {
            if app.can_switch()
                && ui
                    .button(RichText::new("🔄").size(24.0))
                    .on_hover_text("Switch camera")
                    .clicked()
            {
                app.switch_camera();
            }
        });
    });
}

/// Largest 9:16 rectangle centered in the available area.
fn portrait_viewport(area: Rect) -> Rect {
    let scale = (area.width() / 9.0).min(area.height() / 16.0);
    let size = Vec2::new(9.0 * scale, 16.0 * scale);
    Rect::from_center_size(area.center(), size)
}

/// Uv coordinates center-cropping a frame to 9:16, mirroring the crop
/// the capture engine will apply.
fn crop_uv(frame_size: Vec2) -> Rect {
    if frame_size.x <= 0.0 || frame_size.y <= 0.0 {
        return FULL_UV;
    }
    let crop_width = frame_size.y * 9.0 / 16.0;
    if crop_width >= frame_size.x {
        return FULL_UV;
    }
    let margin = (frame_size.x - crop_width) / 2.0 / frame_size.x;
    Rect::from_min_max(Pos2::new(margin, 0.0), Pos2::new(1.0 - margin, 1.0))
}

pub(crate) fn decode_thumbnail(png: &[u8]) -> egui::ColorImage {
    match image::load_from_memory(png) {
        Ok(decoded) => {
            let rgba = decoded.to_rgba8();
            egui::ColorImage::from_rgba_unmultiplied(
                [rgba.width() as usize, rgba.height() as usize],
                rgba.as_raw(),
            )
        }
        // Store blobs are produced by the editor, so this is unexpected;
        // a transparent pixel keeps the preview usable.
        Err(_) => egui::ColorImage::new([1, 1], Color32::TRANSPARENT),
    }
}
