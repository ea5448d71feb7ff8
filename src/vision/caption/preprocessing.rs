// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Image preprocessing for the BLIP vision encoder

use image::DynamicImage;
use ndarray::Array4;

/// Square input size of the BLIP base vision encoder
pub const CAPTION_INPUT_SIZE: u32 = 384;

/// CLIP normalization mean values
pub const MEAN: [f32; 3] = [0.481_454_66, 0.457_827_5, 0.408_210_73];

/// CLIP normalization std values
pub const STD: [f32; 3] = [0.268_629_54, 0.261_302_58, 0.275_777_11];

/// Preprocess an image for the caption encoder
///
/// Steps:
/// 1. Resize to `size` x `size` with bicubic filtering (aspect ratio not kept)
/// 2. Normalize with CLIP mean/std: (pixel/255 - mean) / std
/// 3. Convert to NCHW tensor format [1, 3, H, W]
pub fn preprocess_for_caption(image: &DynamicImage, size: u32) -> Array4<f32> {
    let rgb = image
        .resize_exact(size, size, image::imageops::FilterType::CatmullRom)
        .to_rgb8();

    let size = size as usize;
    let mut tensor = Array4::zeros((1, 3, size, size));
    for (x, y, pixel) in rgb.enumerate_pixels() {
        for c in 0..3 {
            tensor[[0, c, y as usize, x as usize]] = (pixel[c] as f32 / 255.0 - MEAN[c]) / STD[c];
        }
    }
    tensor
}
