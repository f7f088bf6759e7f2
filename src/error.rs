// src/error.rs
//
// Typed failures for the trajectory/kinematics pipeline. Every variant
// carries the offending frame or sample index. All of them are terminal
// for the current analysis: the pipeline is a deterministic numeric
// transform, so retrying on identical input cannot change the outcome.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, AnalysisError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AnalysisError {
    /// The frame has zero total intensity, so the weighted mean is undefined.
    #[error("frame {frame}: total intensity is zero, center of mass is undefined")]
    EmptyMass { frame: usize },

    /// A frame's dimensions differ from the first frame of the stack.
    #[error(
        "frame {frame}: dimensions {actual_height}x{actual_width} do not match \
         stack dimensions {expected_height}x{expected_width}"
    )]
    ShapeMismatch {
        frame: usize,
        expected_height: usize,
        expected_width: usize,
        actual_height: usize,
        actual_width: usize,
    },

    /// Timestamp count differs from frame count.
    #[error("timestamp series has {timestamps} samples for {frames} frames")]
    Alignment { frames: usize, timestamps: usize },

    /// Two consecutive timestamps are identical, making velocity undefined.
    #[error("duplicate consecutive timestamps: zero time step over interval {interval}")]
    ZeroTimestep { interval: usize },
}
