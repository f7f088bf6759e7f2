// src/trajectory.rs
//
// Aggregates per-frame centroids into an ordered trajectory.
//
// Extraction has no cross-frame dependency, so large stacks fan out over
// rayon; the collected results are always in frame-index order, and a
// failure is reported for the lowest failing frame index regardless of
// which worker finished first. No frame is ever skipped: dropping frame k
// would desynchronize the trajectory from the timestamp series downstream.

use crate::centroid::{weighted_centroid, Centroid};
use crate::error::Result;
use crate::types::FrameStack;
use rayon::prelude::*;
use serde::Serialize;
use tracing::debug;

/// Minimum frame count before extraction fans out across threads.
pub const DEFAULT_PARALLEL_FRAME_THRESHOLD: usize = 4;

/// Ordered per-frame centroid coordinates, one entry per frame.
///
/// Built once, then immutable.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Trajectory {
    x_coords: Vec<f64>,
    y_coords: Vec<f64>,
}

impl Trajectory {
    pub fn len(&self) -> usize {
        self.x_coords.len()
    }

    pub fn is_empty(&self) -> bool {
        self.x_coords.is_empty()
    }

    pub fn x_coords(&self) -> &[f64] {
        &self.x_coords
    }

    pub fn y_coords(&self) -> &[f64] {
        &self.y_coords
    }

    /// Integer pixel positions for overlay consumers.
    ///
    /// Each coordinate is rounded half-away-from-zero, then clamped into
    /// [0, dimension - 1]. Clamping happens after rounding so a value like
    /// W - 0.5 lands on W - 1 instead of escaping the frame.
    pub fn rounded(&self, width: usize, height: usize) -> RoundedTrajectory {
        RoundedTrajectory {
            x_idx: self.x_coords.iter().map(|&x| round_clamped(x, width)).collect(),
            y_idx: self.y_coords.iter().map(|&y| round_clamped(y, height)).collect(),
        }
    }
}

/// Rounded, clamped trajectory guaranteed valid for pixel indexing.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoundedTrajectory {
    pub x_idx: Vec<usize>,
    pub y_idx: Vec<usize>,
}

impl RoundedTrajectory {
    pub fn len(&self) -> usize {
        self.x_idx.len()
    }

    pub fn is_empty(&self) -> bool {
        self.x_idx.is_empty()
    }
}

fn round_clamped(coord: f64, dimension: usize) -> usize {
    let max = dimension.saturating_sub(1) as f64;
    coord.round().clamp(0.0, max) as usize
}

/// Visits frames strictly in index order and collects their centroids.
#[derive(Debug, Clone)]
pub struct TrajectoryBuilder {
    parallel_frame_threshold: usize,
}

impl Default for TrajectoryBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TrajectoryBuilder {
    pub fn new() -> Self {
        Self {
            parallel_frame_threshold: DEFAULT_PARALLEL_FRAME_THRESHOLD,
        }
    }

    /// A threshold of `usize::MAX` forces sequential extraction.
    pub fn with_parallel_threshold(threshold: usize) -> Self {
        Self {
            parallel_frame_threshold: threshold,
        }
    }

    /// Extract one centroid per frame, preserving frame order.
    ///
    /// Fails with the error of the lowest-indexed failing frame.
    pub fn build(&self, stack: &FrameStack) -> Result<Trajectory> {
        let centroids = if stack.len() >= self.parallel_frame_threshold {
            debug!("extracting {} centroids in parallel", stack.len());
            self.extract_parallel(stack)?
        } else {
            self.extract_sequential(stack)?
        };

        let mut x_coords = Vec::with_capacity(centroids.len());
        let mut y_coords = Vec::with_capacity(centroids.len());
        for c in centroids {
            x_coords.push(c.x);
            y_coords.push(c.y);
        }

        Ok(Trajectory { x_coords, y_coords })
    }

    fn extract_sequential(&self, stack: &FrameStack) -> Result<Vec<Centroid>> {
        let mut centroids = Vec::with_capacity(stack.len());
        for frame in stack.frames() {
            centroids.push(weighted_centroid(frame)?);
        }
        Ok(centroids)
    }

    fn extract_parallel(&self, stack: &FrameStack) -> Result<Vec<Centroid>> {
        // par_iter + collect keeps results in frame order; the sequential
        // re-collect below surfaces the first error deterministically.
        let results: Vec<Result<Centroid>> = stack
            .frames()
            .par_iter()
            .map(weighted_centroid)
            .collect();

        results.into_iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AnalysisError;
    use ndarray::Array2;

    fn stack_with_bright_pixels(positions: &[(usize, usize)]) -> FrameStack {
        let matrices = positions
            .iter()
            .map(|&(row, col)| {
                let mut data = Array2::<f32>::zeros((4, 4));
                data[[row, col]] = 100.0;
                data
            })
            .collect();
        FrameStack::from_matrices(matrices).unwrap()
    }

    #[test]
    fn test_trajectory_length_matches_frame_count() {
        let stack = stack_with_bright_pixels(&[(1, 1), (2, 1), (2, 2)]);
        let trajectory = TrajectoryBuilder::new().build(&stack).unwrap();
        assert_eq!(trajectory.len(), stack.len());
    }

    #[test]
    fn test_trajectory_preserves_frame_order() {
        // column = x, row = y
        let stack = stack_with_bright_pixels(&[(1, 1), (2, 1), (2, 2)]);
        let trajectory = TrajectoryBuilder::new().build(&stack).unwrap();
        assert_eq!(trajectory.x_coords(), &[1.0, 1.0, 2.0]);
        assert_eq!(trajectory.y_coords(), &[1.0, 2.0, 2.0]);
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let positions: Vec<(usize, usize)> =
            (0..16).map(|i| (i % 4, (i * 3) % 4)).collect();
        let stack = stack_with_bright_pixels(&positions);

        let sequential = TrajectoryBuilder::with_parallel_threshold(usize::MAX)
            .build(&stack)
            .unwrap();
        let parallel = TrajectoryBuilder::with_parallel_threshold(1)
            .build(&stack)
            .unwrap();

        assert_eq!(sequential, parallel);
    }

    #[test]
    fn test_blank_frame_reports_its_index() {
        let mut matrices = vec![Array2::<f32>::from_elem((4, 4), 1.0); 6];
        matrices[3] = Array2::<f32>::zeros((4, 4));
        matrices[5] = Array2::<f32>::zeros((4, 4));
        let stack = FrameStack::from_matrices(matrices).unwrap();

        // Lowest failing index wins in both modes.
        for builder in [
            TrajectoryBuilder::with_parallel_threshold(usize::MAX),
            TrajectoryBuilder::with_parallel_threshold(1),
        ] {
            let err = builder.build(&stack).unwrap_err();
            assert_eq!(err, AnalysisError::EmptyMass { frame: 3 });
        }
    }

    #[test]
    fn test_empty_stack_builds_empty_trajectory() {
        let stack = FrameStack::from_matrices(Vec::new()).unwrap();
        let trajectory = TrajectoryBuilder::new().build(&stack).unwrap();
        assert!(trajectory.is_empty());
    }

    #[test]
    fn test_rounding_half_away_from_zero() {
        let trajectory = Trajectory {
            x_coords: vec![1.5, 2.4, 0.5],
            y_coords: vec![0.49, 2.5, 3.5],
        };
        let rounded = trajectory.rounded(8, 8);
        assert_eq!(rounded.x_idx, vec![2, 2, 1]);
        assert_eq!(rounded.y_idx, vec![0, 3, 4]);
    }

    #[test]
    fn test_rounding_clamps_to_frame_bounds() {
        let trajectory = Trajectory {
            x_coords: vec![3.6, -0.2],
            y_coords: vec![2.7, 0.0],
        };
        // Width 4: 3.6 rounds to 4, clamps to 3. Height 3: 2.7 rounds to 3, clamps to 2.
        let rounded = trajectory.rounded(4, 3);
        assert_eq!(rounded.x_idx, vec![3, 0]);
        assert_eq!(rounded.y_idx, vec![2, 0]);
    }
}
