// src/types.rs

use crate::error::AnalysisError;
use ndarray::Array2;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub io: IoConfig,
    pub analysis: AnalysisConfig,
    pub overlay: OverlayConfig,
    pub histogram: HistogramConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IoConfig {
    pub input_dir: String,
    pub output_dir: String,
    /// Extension of the metadata timestamp file next to each stack ("txt").
    pub metadata_extension: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Minimum frame count before centroid extraction fans out across threads.
    pub parallel_frame_threshold: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OverlayConfig {
    pub enabled: bool,
    /// RGB color of the center-of-mass marker pixel.
    pub marker_rgb: [u8; 3],
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistogramConfig {
    pub enabled: bool,
    /// Number of bins; 0 selects an automatic bin count.
    pub bins: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
}

/// A single grayscale frame of the stack.
///
/// Pixel values are non-negative raw intensities, row-major, indexed
/// `data[[row, col]]`. A frame is identified by its position in the
/// sequence and never mutated after it is read.
#[derive(Debug, Clone)]
pub struct Frame {
    pub index: usize,
    pub data: Array2<f32>,
}

impl Frame {
    pub fn new(index: usize, data: Array2<f32>) -> Self {
        Self { index, data }
    }

    pub fn width(&self) -> usize {
        self.data.ncols()
    }

    pub fn height(&self) -> usize {
        self.data.nrows()
    }
}

/// An ordered sequence of frames sharing one set of dimensions.
///
/// Construction is the single place where frame shape is validated;
/// everything downstream can rely on identical HxW across the stack.
#[derive(Debug, Clone)]
pub struct FrameStack {
    frames: Vec<Frame>,
    height: usize,
    width: usize,
}

impl FrameStack {
    /// Build a stack from raw matrices, assigning frame indices 0..N-1.
    ///
    /// Fails with `ShapeMismatch` on the first frame whose dimensions
    /// differ from frame 0. An empty sequence is a valid (empty) stack.
    pub fn from_matrices(matrices: Vec<Array2<f32>>) -> Result<Self, AnalysisError> {
        let (height, width) = matrices
            .first()
            .map(|m| (m.nrows(), m.ncols()))
            .unwrap_or((0, 0));

        let mut frames = Vec::with_capacity(matrices.len());
        for (index, data) in matrices.into_iter().enumerate() {
            if data.nrows() != height || data.ncols() != width {
                return Err(AnalysisError::ShapeMismatch {
                    frame: index,
                    expected_height: height,
                    expected_width: width,
                    actual_height: data.nrows(),
                    actual_width: data.ncols(),
                });
            }
            frames.push(Frame::new(index, data));
        }

        Ok(Self {
            frames,
            height,
            width,
        })
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array2;

    #[test]
    fn test_stack_assigns_indices_in_order() {
        let mats = vec![Array2::<f32>::zeros((3, 4)); 5];
        let stack = FrameStack::from_matrices(mats).unwrap();
        assert_eq!(stack.len(), 5);
        assert_eq!(stack.height(), 3);
        assert_eq!(stack.width(), 4);
        for (i, frame) in stack.frames().iter().enumerate() {
            assert_eq!(frame.index, i);
        }
    }

    #[test]
    fn test_stack_rejects_shape_mismatch() {
        let mats = vec![
            Array2::<f32>::zeros((3, 4)),
            Array2::<f32>::zeros((3, 4)),
            Array2::<f32>::zeros((4, 4)),
        ];
        let err = FrameStack::from_matrices(mats).unwrap_err();
        assert_eq!(
            err,
            AnalysisError::ShapeMismatch {
                frame: 2,
                expected_height: 3,
                expected_width: 4,
                actual_height: 4,
                actual_width: 4,
            }
        );
    }

    #[test]
    fn test_empty_stack_is_valid() {
        let stack = FrameStack::from_matrices(Vec::new()).unwrap();
        assert!(stack.is_empty());
        assert_eq!(stack.height(), 0);
        assert_eq!(stack.width(), 0);
    }
}
