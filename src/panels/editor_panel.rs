//! Overlay editor screen.
//!
//! The fixed 1080x1920 working surface is displayed scaled to fit the
//! panel; every interaction is translated back into logical canvas
//! coordinates before it reaches the editor, so the display scale never
//! leaks into the model (or into exports).

use eframe::egui::{self, Color32, Pos2, Rect, Sense, Stroke, Vec2};

use crate::app::DecoCamApp;
use crate::editor::{CANVAS_HEIGHT, CANVAS_WIDTH, MIN_SCALE, TwoFingerTouch};

/// Full UV rect (0,0) to (1,1)
const FULL_UV: Rect = Rect {
    min: egui::pos2(0.0, 0.0),
    max: egui::pos2(1.0, 1.0),
};

pub fn editor_panel(app: &mut DecoCamApp, ctx: &egui::Context) {
    toolbar(app, ctx);

    egui::CentralPanel::default().show(ctx, |ui| {
        let (response, painter) =
            ui.allocate_painter(ui.available_size(), Sense::click_and_drag());
        let rect = response.rect;

        // Fit the logical surface into the panel
        let view_scale = (rect.width() / CANVAS_WIDTH as f32)
            .min(rect.height() / CANVAS_HEIGHT as f32)
            .max(f32::EPSILON);
        let canvas_size = Vec2::new(CANVAS_WIDTH as f32, CANVAS_HEIGHT as f32) * view_scale;
        let canvas_rect = Rect::from_center_size(rect.center(), canvas_size);

        let to_screen = |pos: Pos2| canvas_rect.min + pos.to_vec2() * view_scale;
        let to_canvas = |pos: Pos2| ((pos - canvas_rect.min) / view_scale).to_pos2();

        handle_touches(app, ctx, view_scale, &to_canvas);
        handle_pointer(app, &response, view_scale, &to_canvas);
        handle_wheel(app, ctx, &response, &to_canvas);

        // Working surface
        painter.rect_filled(canvas_rect, 0.0, Color32::WHITE);

        // Paint strictly in ascending depth order
        for img in app.editor.images_by_depth() {
            let texture =
                app.textures
                    .get_or_create(img.id() as u64, 0, || img.to_color_image(), ctx);
            let screen_rect = Rect::from_min_size(
                to_screen(img.position()),
                img.base_size() * img.scale() * view_scale,
            );
            painter.image(texture, screen_rect, FULL_UV, Color32::WHITE);
        }

        // Selection highlight: display chrome only, never exported
        if let Some(active) = app.editor.active_image() {
            let screen_rect = Rect::from_min_size(
                to_screen(active.position()),
                active.base_size() * active.scale() * view_scale,
            );
            painter.rect_stroke(screen_rect, 0.0, Stroke::new(2.0, Color32::LIGHT_BLUE));
        }

        // Frame of the working surface
        painter.rect_stroke(canvas_rect, 0.0, Stroke::new(1.0, Color32::DARK_GRAY));
    });

    // Drag-and-drop intake
    app.intake.preview_files_being_dropped(ctx);
    let dropped = app.intake.take_dropped(ctx);
    app.apply_intake(dropped);
}

fn toolbar(app: &mut DecoCamApp, ctx: &egui::Context) {
    egui::TopBottomPanel::top("editor_toolbar").show(ctx, |ui| {
        ui.horizontal(|ui| {
            if ui.button("Add images…").clicked() {
                let picked = app.intake.pick_files();
                app.apply_intake(picked);
            }

            // External scale control bound to the selected image
            let active = app.editor.active_image().map(|img| (img.id(), img.scale()));
            if let Some((id, mut scale)) = active {
                if ui
                    .add(egui::Slider::new(&mut scale, MIN_SCALE..=5.0).text("Scale"))
                    .changed()
                {
                    app.editor.set_scale_centered(id, scale);
                }
                if ui.button("Delete").clicked() {
                    app.editor.delete_selected();
                }
            }

            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                if ui.button("Save overlay").clicked() {
                    app.editor_save();
                }
                if ui.button("Discard").clicked() {
                    app.editor_cancel();
                }
                ui.label(format!("{} images", app.editor.len()));
            });
        });
    });
}

/// Two-finger pinch on the canvas. All distances and positions are
/// converted to logical coordinates; the scale ratio itself is
/// display-scale independent.
fn handle_touches(
    app: &mut DecoCamApp,
    ctx: &egui::Context,
    view_scale: f32,
    to_canvas: &impl Fn(Pos2) -> Pos2,
) {
    let events = ctx.input(|i| i.events.clone());
    app.touches.update(&events);

    match app.touches.two_finger() {
        Some(touch) => {
            let canvas_touch = TwoFingerTouch {
                distance: touch.distance / view_scale,
                center: to_canvas(touch.center),
            };
            if app.editor.pinch_target().is_some() {
                app.editor.update_pinch(canvas_touch);
            } else {
                let target = app
                    .editor
                    .topmost_hit(canvas_touch.center)
                    .or_else(|| app.editor.active());
                if let Some(id) = target {
                    app.editor.begin_pinch(id, canvas_touch);
                }
            }
        }
        // Pinch state clears once fewer than two touches remain
        None => app.editor.end_pinch(),
    }
}

fn handle_pointer(
    app: &mut DecoCamApp,
    response: &egui::Response,
    view_scale: f32,
    to_canvas: &impl Fn(Pos2) -> Pos2,
) {
    if app.editor.pinch_target().is_some() {
        return;
    }

    if response.drag_started() || response.clicked() {
        if let Some(pos) = response.interact_pointer_pos() {
            match app.editor.topmost_hit(to_canvas(pos)) {
                // Selecting also brings the image to the front
                Some(id) => app.editor.select(id),
                None => app.editor.clear_selection(),
            }
        }
    }

    if response.dragged() {
        if let Some(id) = app.editor.active() {
            app.editor.drag(id, response.drag_delta() / view_scale);
        }
    }
}

fn handle_wheel(
    app: &mut DecoCamApp,
    ctx: &egui::Context,
    response: &egui::Response,
    to_canvas: &impl Fn(Pos2) -> Pos2,
) {
    if !response.hovered() {
        return;
    }
    let scroll = ctx.input(|i| i.raw_scroll_delta);
    if scroll.y == 0.0 {
        return;
    }
    if let Some(pos) = response.hover_pos() {
        if let Some(id) = app.editor.topmost_hit(to_canvas(pos)) {
            app.editor.scale_by_wheel(id, scroll.y);
        }
    }
}
