//! Capture/composite engine
//!
//! Turns a live camera frame plus an optional overlay into a single
//! portrait photo. The frame is center-cropped to a 9:16 region spanning
//! the full frame height, then the overlay (if any) is stretched over the
//! whole output and composited on top.

use image::{RgbaImage, imageops};
use log::debug;

use crate::camera::CameraFrame;
use crate::error::CaptureError;

/// Output aspect ratio, width : height
pub const ASPECT_W: u32 = 9;
pub const ASPECT_H: u32 = 16;

/// Sub-rectangle of a source frame selected for the output photo
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CropRegion {
    pub sx: u32,
    pub sy: u32,
    pub width: u32,
    pub height: u32,
}

/// Compute the centered 9:16 crop for a frame of the given size.
///
/// The crop spans the full frame height; its width is `height * 9/16`,
/// rounded to the nearest pixel and clamped to the frame width for
/// frames narrower than 9:16.
pub fn crop_region(frame_width: u32, frame_height: u32) -> CropRegion {
    let width = (f64::from(frame_height) * f64::from(ASPECT_W) / f64::from(ASPECT_H)).round() as u32;
    let width = width.min(frame_width).max(1);
    let sx = (frame_width - width) / 2;
    CropRegion {
        sx,
        sy: 0,
        width,
        height: frame_height.max(1),
    }
}

/// Composite a camera frame and an optional overlay into a finished photo.
///
/// The overlay must already be fully decoded; it is stretched to exactly
/// the crop dimensions and painted over the cropped frame. Every call
/// allocates a fresh output image, so overlapping captures can never
/// observe each other's pixels.
pub fn compose(frame: &CameraFrame, overlay: Option<&RgbaImage>) -> Result<RgbaImage, CaptureError> {
    let source = frame.to_rgba()?;
    let region = crop_region(frame.width, frame.height);

    debug!(
        "compositing {}x{} frame, crop {}x{} at x={}",
        frame.width, frame.height, region.width, region.height, region.sx
    );

    let mut output =
        imageops::crop_imm(&source, region.sx, region.sy, region.width, region.height).to_image();

    if let Some(overlay) = overlay {
        let stretched =
            imageops::resize(overlay, region.width, region.height, imageops::FilterType::Triangle);
        imageops::overlay(&mut output, &stretched, 0, 0);
    }

    Ok(output)
}

/// Encode a finished photo as PNG bytes for the share sink.
pub fn encode_png(photo: &RgbaImage) -> Result<Vec<u8>, CaptureError> {
    let mut png = Vec::new();
    photo.write_to(&mut std::io::Cursor::new(&mut png), image::ImageFormat::Png)?;
    Ok(png)
}

/// Decode an overlay for compositing. Decoding completes (or fails)
/// before any draw call can use the result.
pub fn decode_overlay(png: &[u8]) -> Result<RgbaImage, CaptureError> {
    let decoded = image::load_from_memory(png).map_err(CaptureError::OverlayDecode)?;
    Ok(decoded.to_rgba8())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crop_is_portrait_and_centered() {
        let region = crop_region(1920, 1080);
        assert_eq!(region.height, 1080);
        assert_eq!(region.width, 608); // 1080 * 9/16 = 607.5, rounds up
        assert_eq!(region.sx, 656);
        assert_eq!(region.sy, 0);
        assert!(region.sx + region.width <= 1920);
    }

    #[test]
    fn crop_clamps_on_narrow_frames() {
        // A frame already narrower than 9:16 keeps its full width
        let region = crop_region(400, 1080);
        assert_eq!(region.width, 400);
        assert_eq!(region.sx, 0);
    }
}
