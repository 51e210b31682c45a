//! Overlay editor
//!
//! A session on a fixed 1080x1920 logical working surface where uploaded
//! rasters can be dragged, scaled (wheel or pinch) and depth-reordered,
//! then flattened into one overlay raster. The surface matches the 9:16
//! aspect of the capture pipeline so a saved overlay maps 1:1 onto a
//! captured photo.

pub mod element;
pub mod gestures;

pub use element::{EditorImage, MIN_SCALE};
pub use gestures::{PinchSession, TouchTracker, TwoFingerTouch};

use egui::{Pos2, Vec2};
use image::{RgbaImage, imageops};
use log::debug;

use crate::id_generator::generate_id;

/// Logical working surface size, in pixels. Exports are always rendered
/// at exactly this size regardless of how the surface is displayed.
pub const CANVAS_WIDTH: u32 = 1080;
pub const CANVAS_HEIGHT: u32 = 1920;

/// Wheel scaling increment per scroll unit (scroll up enlarges)
const WHEEL_SCALE_STEP: f32 = -0.001;

/// Offset between consecutively added images so a batch doesn't stack
/// into one pile
const CASCADE_OFFSET: f32 = 20.0;
const CASCADE_ORIGIN: f32 = 100.0;

/// An editing session over a set of transformable images.
#[derive(Default)]
pub struct OverlayEditor {
    images: Vec<EditorImage>,
    /// Id of the image targeted by the external scale control
    active: Option<usize>,
    /// In-flight pinch: which image plus the state recorded at start
    pinch: Option<(usize, PinchSession)>,
}

impl OverlayEditor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add decoded rasters, cascading each a little further from the
    /// last so they land visibly separate. Returns the new ids.
    pub fn add_images(&mut self, rasters: Vec<RgbaImage>) -> Vec<usize> {
        let mut ids = Vec::with_capacity(rasters.len());
        for (k, raster) in rasters.into_iter().enumerate() {
            let offset = CASCADE_ORIGIN + k as f32 * CASCADE_OFFSET;
            let id = generate_id();
            let z = self.next_z();
            self.images
                .push(EditorImage::new(id, raster, Pos2::new(offset, offset), z));
            ids.push(id);
        }
        debug!("editor now holds {} images", self.images.len());
        ids
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    pub fn image(&self, id: usize) -> Option<&EditorImage> {
        self.images.iter().find(|img| img.id() == id)
    }

    /// Images in paint order: lowest depth key first, highest on top.
    pub fn images_by_depth(&self) -> Vec<&EditorImage> {
        let mut ordered: Vec<&EditorImage> = self.images.iter().collect();
        ordered.sort_by_key(|img| img.z());
        ordered
    }

    /// Topmost image under the given canvas position, if any.
    pub fn topmost_hit(&self, pos: Pos2) -> Option<usize> {
        self.images_by_depth()
            .into_iter()
            .rev()
            .find(|img| img.hit_test(pos))
            .map(|img| img.id())
    }

    /// Move an image by a delta in logical pixels. Unclamped: images may
    /// sit partially or fully outside the working surface.
    pub fn drag(&mut self, id: usize, delta: Vec2) {
        if let Some(img) = self.image_mut(id) {
            img.translate(delta);
        }
    }

    /// Additive wheel zoom, floored at [`MIN_SCALE`].
    pub fn scale_by_wheel(&mut self, id: usize, delta_y: f32) {
        if let Some(img) = self.image_mut(id) {
            let scale = img.scale() + delta_y * WHEEL_SCALE_STEP;
            img.set_scale(scale);
        }
    }

    /// Directly set an image's scale (external slider control), keeping
    /// its center fixed like a pinch would.
    pub fn set_scale_centered(&mut self, id: usize, scale: f32) {
        if let Some(img) = self.image_mut(id) {
            let center = img.center();
            img.set_scale(scale);
            let rect = img.rect();
            img.set_position(center - rect.size() / 2.0);
        }
    }

    /// Start a pinch on an image, recording the initial finger distance,
    /// the image's scale and its current center.
    pub fn begin_pinch(&mut self, id: usize, touch: TwoFingerTouch) {
        if let Some(img) = self.image(id) {
            let session = PinchSession::begin(touch.distance, img.scale(), img.center());
            self.pinch = Some((id, session));
        }
    }

    /// Apply a pinch update. The image's center stays where it was when
    /// the pinch began.
    pub fn update_pinch(&mut self, touch: TwoFingerTouch) {
        let Some((id, session)) = self.pinch else {
            return;
        };
        if let Some(img) = self.image_mut(id) {
            let scale = session.rescale(touch.distance);
            img.set_scale(scale);
            let position = session.reposition(img.base_size(), img.scale());
            img.set_position(position);
        }
    }

    /// Clear pinch state; called once fewer than two touches remain.
    pub fn end_pinch(&mut self) {
        self.pinch = None;
    }

    pub fn pinch_target(&self) -> Option<usize> {
        self.pinch.map(|(id, _)| id)
    }

    /// Raise an image above everything else without renumbering the rest.
    pub fn bring_to_front(&mut self, id: usize) {
        let top = self.next_z();
        if let Some(img) = self.image_mut(id) {
            img.set_z(top);
        }
    }

    /// Mark an image as the target for the external scale control.
    /// Selecting also raises it to the top.
    pub fn select(&mut self, id: usize) {
        if self.image(id).is_some() {
            self.active = Some(id);
            self.bring_to_front(id);
        }
    }

    pub fn active(&self) -> Option<usize> {
        self.active
    }

    pub fn active_image(&self) -> Option<&EditorImage> {
        self.active.and_then(|id| self.image(id))
    }

    pub fn clear_selection(&mut self) {
        self.active = None;
    }

    /// Remove the active image and clear the selection.
    pub fn delete_selected(&mut self) -> bool {
        let Some(id) = self.active.take() else {
            return false;
        };
        if self.pinch_target() == Some(id) {
            self.pinch = None;
        }
        let before = self.images.len();
        self.images.retain(|img| img.id() != id);
        before != self.images.len()
    }

    /// Discard the whole session.
    pub fn reset(&mut self) {
        self.images.clear();
        self.active = None;
        self.pinch = None;
    }

    /// Flatten the session into one raster at the fixed logical size.
    ///
    /// Rasterization happens from the model, never from the screen, so
    /// the display fit-scale and any selection highlight cannot leak into
    /// the exported pixels. Zero images yield a fully transparent canvas,
    /// and repeated exports without edits are pixel-identical.
    pub fn export(&self) -> RgbaImage {
        let mut canvas = RgbaImage::new(CANVAS_WIDTH, CANVAS_HEIGHT);
        for img in self.images_by_depth() {
            let size = img.base_size() * img.scale();
            let width = size.x.round().max(1.0) as u32;
            let height = size.y.round().max(1.0) as u32;
            let scaled = imageops::resize(img.pixels(), width, height, imageops::FilterType::Triangle);
            let pos = img.position();
            imageops::overlay(&mut canvas, &scaled, pos.x.round() as i64, pos.y.round() as i64);
        }
        canvas
    }

    fn image_mut(&mut self, id: usize) -> Option<&mut EditorImage> {
        self.images.iter_mut().find(|img| img.id() == id)
    }

    fn next_z(&self) -> u32 {
        self.images.iter().map(|img| img.z()).max().unwrap_or(0) + 1
    }
}
