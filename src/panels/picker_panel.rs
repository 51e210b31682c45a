//! Overlay picker: a bottom sheet listing stored overlays. Tapping a
//! thumbnail selects (or deselects) it, the cross deletes it, and the
//! editor is opened from here.

use eframe::egui::{self, Align2, Color32, Sense, Stroke, Vec2};
use uuid::Uuid;

use crate::app::DecoCamApp;
use crate::texture_cache::overlay_key;

const THUMBNAIL_SIZE: f32 = 64.0;

/// Full UV rect (0,0) to (1,1)
const FULL_UV: egui::Rect = egui::Rect {
    min: egui::pos2(0.0, 0.0),
    max: egui::pos2(1.0, 1.0),
};

pub fn picker_panel(app: &mut DecoCamApp, ctx: &egui::Context) {
    if !app.picker_open {
        return;
    }

    let mut open = true;
    egui::Window::new("Overlays")
        .anchor(Align2::CENTER_BOTTOM, [0.0, -96.0])
        .collapsible(false)
        .resizable(false)
        .open(&mut open)
        .show(ctx, |ui| {
            if ui.button("Open editor").clicked() {
                app.open_editor();
                return;
            }
            ui.separator();

            if app.store.is_empty() {
                ui.label("No overlays yet. Create one in the editor.");
                return;
            }

            // Defer mutations: the loop below borrows the entry list.
            let mut toggled: Option<usize> = None;
            let mut deleted: Option<Uuid> = None;

            egui::ScrollArea::horizontal().show(ui, |ui| {
                ui.horizontal(|ui| {
                    for (index, entry) in app.store.entries().iter().enumerate() {
                        let key = overlay_key(&entry.id());
                        let png = entry.png();
                        let texture = app.textures.get_or_create(
                            key,
                            0,
                            || super::capture_panel::decode_thumbnail(png),
                            ctx,
                        );

                        ui.vertical(|ui| {
                            let (rect, response) = ui
                                .allocate_exact_size(Vec2::splat(THUMBNAIL_SIZE), Sense::click());
                            ui.painter().image(texture, rect, FULL_UV, Color32::WHITE);
                            if app.store.selection() == Some(index) {
                                ui.painter().rect_stroke(
                                    rect,
                                    2.0,
                                    Stroke::new(2.0, Color32::LIGHT_BLUE),
                                );
                            }
                            if response.clicked() {
                                toggled = Some(index);
                            }
                            if ui.small_button("✖").clicked() {
                                deleted = Some(entry.id());
                            }
                        });
                    }
                });
            });

            if let Some(index) = toggled {
                app.toggle_overlay(index);
            }
            if let Some(id) = deleted {
                app.remove_overlay(id);
            }
        });

    if !open {
        app.picker_open = false;
    }
}
