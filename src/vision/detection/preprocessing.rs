// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Image preprocessing for the YOLO detector

use image::{DynamicImage, GenericImageView, Rgb, RgbImage};
use ndarray::Array4;

/// Default square input size for YOLOv8 exports
pub const DETECTION_INPUT_SIZE: u32 = 640;

/// Letterbox padding value (YOLO convention)
pub const PAD_VALUE: u8 = 114;

/// Geometry of the letterbox transform, needed to map boxes back
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Letterbox {
    /// Scale applied to the source image
    pub scale: f32,
    /// Horizontal padding added on the left
    pub pad_x: f32,
    /// Vertical padding added on the top
    pub pad_y: f32,
    /// Source image width
    pub orig_width: u32,
    /// Source image height
    pub orig_height: u32,
}

impl Letterbox {
    /// Map a point from model input space back to source image space
    pub fn to_source(&self, x: f32, y: f32) -> (f32, f32) {
        let sx = ((x - self.pad_x) / self.scale).clamp(0.0, self.orig_width as f32);
        let sy = ((y - self.pad_y) / self.scale).clamp(0.0, self.orig_height as f32);
        (sx, sy)
    }
}

/// Preprocess an image for the detector
///
/// Steps:
/// 1. Resize with aspect ratio preservation to fit `target_size`
/// 2. Pad to square with gray (114), image centered
/// 3. Scale pixels to [0, 1]
/// 4. Convert to NCHW tensor format [1, 3, H, W]
pub fn preprocess_for_detection(image: &DynamicImage, target_size: u32) -> (Array4<f32>, Letterbox) {
    let (padded, letterbox) = letterbox(image, target_size);

    let size = target_size as usize;
    let mut tensor = Array4::zeros((1, 3, size, size));

    for (x, y, pixel) in padded.enumerate_pixels() {
        for c in 0..3 {
            tensor[[0, c, y as usize, x as usize]] = pixel[c] as f32 / 255.0;
        }
    }

    (tensor, letterbox)
}

/// Resize with padding, returning the padded image and the transform used
pub fn letterbox(image: &DynamicImage, target_size: u32) -> (RgbImage, Letterbox) {
    let (orig_w, orig_h) = image.dimensions();

    if orig_w == 0 || orig_h == 0 {
        let canvas = RgbImage::from_pixel(target_size, target_size, Rgb([PAD_VALUE; 3]));
        return (
            canvas,
            Letterbox {
                scale: 1.0,
                pad_x: 0.0,
                pad_y: 0.0,
                orig_width: orig_w,
                orig_height: orig_h,
            },
        );
    }

    let scale = (target_size as f32 / orig_w as f32).min(target_size as f32 / orig_h as f32);
    let new_w = ((orig_w as f32 * scale).round() as u32).clamp(1, target_size);
    let new_h = ((orig_h as f32 * scale).round() as u32).clamp(1, target_size);

    let resized = image
        .resize_exact(new_w, new_h, image::imageops::FilterType::Triangle)
        .to_rgb8();

    let offset_x = (target_size - new_w) / 2;
    let offset_y = (target_size - new_h) / 2;

    let mut canvas = RgbImage::from_pixel(target_size, target_size, Rgb([PAD_VALUE; 3]));
    image::imageops::replace(&mut canvas, &resized, offset_x as i64, offset_y as i64);

    (
        canvas,
        Letterbox {
            scale,
            pad_x: offset_x as f32,
            pad_y: offset_y as f32,
            orig_width: orig_w,
            orig_height: orig_h,
        },
    )
}
