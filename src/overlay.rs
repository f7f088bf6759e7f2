// src/overlay.rs
//
// Center-of-mass overlay rendering. Converts each grayscale frame to RGB
// by channel replication and writes a marker pixel at the rounded
// centroid. The stack itself is never mutated; this consumes the
// trajectory the way any other renderer would.

use crate::trajectory::RoundedTrajectory;
use crate::types::FrameStack;
use image::{Rgb, RgbImage};

/// Render one RGB frame per stack frame with the marker applied.
///
/// Intensities are scaled against the stack-wide maximum so dim frames
/// stay dim relative to bright ones. A stack with no positive intensity
/// renders black frames (the marker still shows).
///
/// The rounded trajectory must have one entry per frame.
pub fn overlay_stack(
    stack: &FrameStack,
    rounded: &RoundedTrajectory,
    marker_rgb: [u8; 3],
) -> Vec<RgbImage> {
    debug_assert_eq!(stack.len(), rounded.len());

    let scale = intensity_scale(stack);
    let marker = Rgb(marker_rgb);

    stack
        .frames()
        .iter()
        .zip(rounded.x_idx.iter().zip(&rounded.y_idx))
        .map(|(frame, (&x_idx, &y_idx))| {
            let mut image = RgbImage::new(frame.width() as u32, frame.height() as u32);
            for ((row, col), &value) in frame.data.indexed_iter() {
                let gray = (value as f64 * scale).round().clamp(0.0, 255.0) as u8;
                image.put_pixel(col as u32, row as u32, Rgb([gray, gray, gray]));
            }
            image.put_pixel(x_idx as u32, y_idx as u32, marker);
            image
        })
        .collect()
}

fn intensity_scale(stack: &FrameStack) -> f64 {
    let max = stack
        .frames()
        .iter()
        .flat_map(|frame| frame.data.iter())
        .fold(0.0f32, |acc, &v| acc.max(v));

    if max > 0.0 {
        255.0 / max as f64
    } else {
        0.0
    }
}
