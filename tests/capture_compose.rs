use std::path::PathBuf;

use decocam::camera::CameraFrame;
use decocam::capture::{compose, crop_region, decode_overlay, encode_png};
use decocam::error::ShareError;
use decocam::share::ShareSink;
use image::{Rgba, RgbaImage};

fn solid_frame(width: u32, height: u32, color: [u8; 4]) -> CameraFrame {
    let mut data = Vec::with_capacity((width * height * 4) as usize);
    for _ in 0..width * height {
        data.extend_from_slice(&color);
    }
    CameraFrame {
        data,
        width,
        height,
        frame_number: 1,
    }
}

fn solid_raster(width: u32, height: u32, color: [u8; 4]) -> RgbaImage {
    RgbaImage::from_pixel(width, height, Rgba(color))
}

#[test]
fn crop_matches_portrait_ratio_for_common_frames() {
    for (width, height) in [(1920, 1080), (1280, 720), (3840, 2160), (640, 480)] {
        let region = crop_region(width, height);

        let ratio = region.width as f64 / region.height as f64;
        assert!(
            (ratio - 9.0 / 16.0).abs() < 1.0 / region.height as f64,
            "{width}x{height} produced ratio {ratio}"
        );
        assert_eq!(region.sy, 0);
        assert!(region.sx + region.width <= width);
    }
}

#[test]
fn full_hd_frame_crops_to_reference_values() {
    let region = crop_region(1920, 1080);
    assert_eq!(region.width, 608); // 1080 * 9/16 = 607.5
    assert_eq!(region.height, 1080);
    assert_eq!(region.sx, 656);
}

#[test]
fn compose_without_overlay_is_the_bare_crop() {
    let frame = solid_frame(1920, 1080, [10, 200, 30, 255]);
    let photo = compose(&frame, None).unwrap();

    assert_eq!(photo.dimensions(), (608, 1080));
    assert!(photo.pixels().all(|p| p.0 == [10, 200, 30, 255]));
}

#[test]
fn opaque_overlay_wins_over_the_frame() {
    let frame = solid_frame(1920, 1080, [10, 200, 30, 255]);
    let overlay = solid_raster(10, 20, [250, 0, 0, 255]);

    let photo = compose(&frame, Some(&overlay)).unwrap();

    assert_eq!(photo.dimensions(), (608, 1080));
    assert!(photo.pixels().all(|p| p.0 == [250, 0, 0, 255]));
}

#[test]
fn transparent_overlay_leaves_the_frame_visible() {
    let frame = solid_frame(1920, 1080, [10, 200, 30, 255]);
    let overlay = solid_raster(10, 20, [255, 255, 255, 0]);

    let photo = compose(&frame, Some(&overlay)).unwrap();
    assert!(photo.pixels().all(|p| p.0 == [10, 200, 30, 255]));
}

#[test]
fn each_capture_gets_a_fresh_surface() {
    let frame = solid_frame(1280, 720, [77, 77, 77, 255]);
    let overlay = solid_raster(8, 8, [0, 0, 250, 255]);

    // An overlayed capture in between must not contaminate a later
    // overlay-free capture.
    let first = compose(&frame, None).unwrap();
    let _with_overlay = compose(&frame, Some(&overlay)).unwrap();
    let second = compose(&frame, None).unwrap();

    assert_eq!(first.as_raw(), second.as_raw());
}

#[test]
fn encoded_photo_survives_a_decode() {
    let frame = solid_frame(640, 480, [1, 2, 3, 255]);
    let photo = compose(&frame, None).unwrap();

    let png = encode_png(&photo).unwrap();
    let decoded = decode_overlay(&png).unwrap();

    assert_eq!(decoded.dimensions(), photo.dimensions());
    assert_eq!(decoded.as_raw(), photo.as_raw());
}

#[test]
fn decode_overlay_rejects_garbage() {
    assert!(decode_overlay(b"not an image at all").is_err());
}

struct RecordingSink {
    received: std::sync::Mutex<Vec<(usize, String)>>,
}

impl ShareSink for RecordingSink {
    fn share(&self, png: &[u8], file_name: &str) -> Result<PathBuf, ShareError> {
        self.received
            .lock()
            .unwrap()
            .push((png.len(), file_name.to_owned()));
        Ok(PathBuf::from(file_name))
    }
}

#[test]
fn share_sink_is_substitutable() {
    let sink = RecordingSink {
        received: std::sync::Mutex::new(Vec::new()),
    };
    let boxed: Box<dyn ShareSink> = Box::new(sink);

    let frame = solid_frame(1920, 1080, [9, 9, 9, 255]);
    let png = encode_png(&compose(&frame, None).unwrap()).unwrap();
    let path = boxed.share(&png, "photo_test.png").unwrap();

    assert_eq!(path, PathBuf::from("photo_test.png"));
}

#[test]
fn photo_file_names_are_png() {
    let name = decocam::share::photo_file_name();
    assert!(name.starts_with("photo_"));
    assert!(name.ends_with(".png"));
}
