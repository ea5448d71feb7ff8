// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Rendering of detection boxes and labels onto a copy of the input image

use ab_glyph::{FontVec, PxScale};
use image::{DynamicImage, Rgb, RgbImage};
use imageproc::drawing::{draw_filled_rect_mut, draw_hollow_rect_mut, draw_text_mut, text_size};
use imageproc::rect::Rect;
use std::path::Path;
use tracing::{debug, info};

use crate::models::Detection;

/// Per-class box colors, cycled by label hash
const PALETTE: [Rgb<u8>; 10] = [
    Rgb([255, 56, 56]),
    Rgb([255, 157, 151]),
    Rgb([255, 112, 31]),
    Rgb([255, 178, 29]),
    Rgb([207, 210, 49]),
    Rgb([72, 249, 10]),
    Rgb([26, 147, 52]),
    Rgb([0, 212, 187]),
    Rgb([44, 153, 168]),
    Rgb([0, 194, 255]),
];

const TEXT_COLOR: Rgb<u8> = Rgb([255, 255, 255]);

/// Fonts tried in order when no explicit font is given
const SYSTEM_FONT_PATHS: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/System/Library/Fonts/Supplemental/Arial.ttf",
    "/System/Library/Fonts/Arial.ttf",
    "C:\\Windows\\Fonts\\arial.ttf",
];

/// Draws detections onto images
///
/// Without a font only the boxes are drawn; labels need a TrueType font.
pub struct Annotator {
    font: Option<FontVec>,
    font_scale: f32,
    line_thickness: i32,
}

impl Default for Annotator {
    fn default() -> Self {
        Self {
            font: None,
            font_scale: 16.0,
            line_thickness: 2,
        }
    }
}

impl Annotator {
    /// Load the font at `font_path`
    pub fn with_font_path(font_path: &Path) -> anyhow::Result<Self> {
        let data = std::fs::read(font_path)?;
        let font = FontVec::try_from_vec(data)
            .map_err(|_| anyhow::anyhow!("Failed to parse font file: {}", font_path.display()))?;
        Ok(Self {
            font: Some(font),
            ..Default::default()
        })
    }

    /// Use the first system font found, or draw boxes only
    pub fn with_system_font() -> Self {
        for path in SYSTEM_FONT_PATHS {
            if let Ok(annotator) = Self::with_font_path(Path::new(path)) {
                info!("Loaded label font: {}", path);
                return annotator;
            }
        }
        debug!("No system font found, labels will not be drawn");
        Self::default()
    }

    /// Render `detections` onto an RGB copy of `image`
    pub fn render(&self, image: &DynamicImage, detections: &[Detection]) -> RgbImage {
        let mut canvas = image.to_rgb8();
        for detection in detections {
            self.draw_detection(&mut canvas, detection);
        }
        canvas
    }

    fn draw_detection(&self, canvas: &mut RgbImage, detection: &Detection) {
        let (img_w, img_h) = (canvas.width() as i32, canvas.height() as i32);
        if img_w == 0 || img_h == 0 {
            return;
        }

        let x1 = (detection.bbox[0].round() as i32).clamp(0, img_w - 1);
        let y1 = (detection.bbox[1].round() as i32).clamp(0, img_h - 1);
        let x2 = (detection.bbox[2].round() as i32).clamp(0, img_w - 1);
        let y2 = (detection.bbox[3].round() as i32).clamp(0, img_h - 1);
        if x2 < x1 || y2 < y1 {
            return;
        }

        let color = color_for(&detection.label);

        for t in 0..self.line_thickness {
            let (left, top) = (x1 + t, y1 + t);
            let (right, bottom) = (x2 - t, y2 - t);
            if right < left || bottom < top {
                break;
            }
            let rect = Rect::at(left, top)
                .of_size((right - left + 1) as u32, (bottom - top + 1) as u32);
            draw_hollow_rect_mut(canvas, rect, color);
        }

        let Some(ref font) = self.font else { return };

        let text = format!("{} {:.2}", detection.label, detection.confidence);
        let scale = PxScale::from(self.font_scale);
        let (text_w, text_h) = text_size(scale, font, &text);
        let (tag_w, tag_h) = (text_w as i32 + 4, text_h as i32 + 4);

        // Tag sits above the box, or just inside it when the box touches the top edge
        let tag_y = if y1 - tag_h >= 0 { y1 - tag_h } else { y1 };
        let tag_w = tag_w.min(img_w - x1);
        let tag_h = tag_h.min(img_h - tag_y);
        if tag_w <= 0 || tag_h <= 0 {
            return;
        }

        draw_filled_rect_mut(
            canvas,
            Rect::at(x1, tag_y).of_size(tag_w as u32, tag_h as u32),
            color,
        );
        draw_text_mut(canvas, TEXT_COLOR, x1 + 2, tag_y + 2, scale, font, &text);
    }
}

/// Stable color for a label
fn color_for(label: &str) -> Rgb<u8> {
    let hash = label
        .bytes()
        .fold(0usize, |acc, b| acc.wrapping_mul(31).wrapping_add(b as usize));
    PALETTE[hash % PALETTE.len()]
}
