use egui::{ColorImage, Pos2, Rect, Vec2};
use image::RgbaImage;

/// Scale floor preventing degenerate zero/negative scale
pub const MIN_SCALE: f32 = 0.1;

/// One transformable raster inside an editor session.
///
/// Lives only for the session: discarded on cancel, flattened into a
/// stored overlay on save. Position is the top-left corner in logical
/// canvas pixels and is never clamped to the canvas bounds.
#[derive(Clone)]
pub struct EditorImage {
    id: usize,
    pixels: RgbaImage,
    position: Pos2,
    scale: f32,
    z: u32,
}

impl std::fmt::Debug for EditorImage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EditorImage")
            .field("id", &self.id)
            .field("size", &self.base_size())
            .field("position", &self.position)
            .field("scale", &self.scale)
            .field("z", &self.z)
            .finish()
    }
}

impl EditorImage {
    pub fn new(id: usize, pixels: RgbaImage, position: Pos2, z: u32) -> Self {
        Self {
            id,
            pixels,
            position,
            scale: 1.0,
            z,
        }
    }

    pub fn id(&self) -> usize {
        self.id
    }

    pub fn pixels(&self) -> &RgbaImage {
        &self.pixels
    }

    /// Unscaled raster size in logical pixels
    pub fn base_size(&self) -> Vec2 {
        Vec2::new(self.pixels.width() as f32, self.pixels.height() as f32)
    }

    pub fn position(&self) -> Pos2 {
        self.position
    }

    pub fn set_position(&mut self, position: Pos2) {
        self.position = position;
    }

    pub fn translate(&mut self, delta: Vec2) {
        self.position += delta;
    }

    pub fn scale(&self) -> f32 {
        self.scale
    }

    pub fn set_scale(&mut self, scale: f32) {
        self.scale = scale.max(MIN_SCALE);
    }

    pub fn z(&self) -> u32 {
        self.z
    }

    pub fn set_z(&mut self, z: u32) {
        self.z = z;
    }

    /// Bounding rectangle at the current scale
    pub fn rect(&self) -> Rect {
        Rect::from_min_size(self.position, self.base_size() * self.scale)
    }

    /// Visual center; the fixed point of a pinch gesture
    pub fn center(&self) -> Pos2 {
        self.rect().center()
    }

    pub fn hit_test(&self, pos: Pos2) -> bool {
        self.rect().contains(pos)
    }

    /// Texture upload form of the raster
    pub fn to_color_image(&self) -> ColorImage {
        ColorImage::from_rgba_unmultiplied(
            [self.pixels.width() as usize, self.pixels.height() as usize],
            self.pixels.as_raw(),
        )
    }
}
