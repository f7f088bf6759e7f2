// src/centroid.rs
//
// Intensity-weighted center of mass of a single frame.
//
// The frame is projected onto each axis by summing along the orthogonal
// axis, giving one mass profile per axis. The centroid coordinate on an
// axis is the weighted mean pixel index of that profile:
//
//   cm = sum(m_i * i) / sum(m_i)
//
// Column = x, row = y. A weighted mean of bounded indices is itself
// bounded, so each coordinate lies in [0, axis_length - 1] whenever the
// total mass is positive. A blank frame is a typed error, never NaN.

use crate::error::{AnalysisError, Result};
use crate::types::Frame;
use ndarray::ArrayView2;
use serde::Serialize;

/// Sub-pixel center-of-mass position within one frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Centroid {
    pub x: f64,
    pub y: f64,
}

/// Project the frame onto both axes in a single pass.
///
/// Returns `(m_x, m_y)`: `m_x[c]` is the intensity sum of column `c`
/// (length = width), `m_y[r]` the intensity sum of row `r` (length =
/// height). Accumulation is f64 so large 16-bit stacks do not lose
/// precision.
pub fn mass_profiles(data: &ArrayView2<f32>) -> (Vec<f64>, Vec<f64>) {
    let mut m_x = vec![0.0f64; data.ncols()];
    let mut m_y = vec![0.0f64; data.nrows()];

    for (r, row) in data.rows().into_iter().enumerate() {
        for (c, &value) in row.iter().enumerate() {
            let value = value as f64;
            m_x[c] += value;
            m_y[r] += value;
        }
    }

    (m_x, m_y)
}

/// Weighted mean index of a mass profile, or `None` when the profile
/// carries no mass.
pub fn weighted_mean_index(profile: &[f64]) -> Option<f64> {
    let total: f64 = profile.iter().sum();
    if total <= 0.0 {
        return None;
    }

    let weighted: f64 = profile
        .iter()
        .enumerate()
        .map(|(i, &mass)| mass * i as f64)
        .sum();

    Some(weighted / total)
}

/// Compute the weighted centroid of one frame.
///
/// Pure: depends only on the frame passed in, no state across calls.
/// Fails with `EmptyMass` when the frame's total intensity is zero.
pub fn weighted_centroid(frame: &Frame) -> Result<Centroid> {
    let (m_x, m_y) = mass_profiles(&frame.data.view());

    match (weighted_mean_index(&m_x), weighted_mean_index(&m_y)) {
        (Some(x), Some(y)) => Ok(Centroid { x, y }),
        _ => Err(AnalysisError::EmptyMass { frame: frame.index }),
    }
}
