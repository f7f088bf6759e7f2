// src/pipeline.rs
//
// Wires the stages into one pass over a stack.
//
// Signal flow:
//   ImageSource    → FrameStack ─→ TrajectoryBuilder → Trajectory ─┐
//   MetadataSource → timestamps ──────────────────────────────────┼→ kinematics → AnalysisOutput
//
// The chain is a pure transform with no retryable intermediate state:
// any failure aborts the whole analysis and reports the failing stage
// and index. There is no partial result; downstream consumers need the
// coordinate, displacement, and velocity series fully aligned.

use crate::error::{AnalysisError, Result};
use crate::kinematics::{derive_kinematics, KinematicsResult};
use crate::sources::{ImageSource, MetadataSource};
use crate::trajectory::{RoundedTrajectory, Trajectory, TrajectoryBuilder};
use crate::types::FrameStack;
use serde::Serialize;
use tracing::{debug, info};

/// Everything the analysis produces for one stack.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisOutput {
    pub frame_count: usize,
    pub height: usize,
    pub width: usize,
    pub trajectory: Trajectory,
    pub rounded: RoundedTrajectory,
    pub kinematics: KinematicsResult,
}

/// Inputs plus output for one analyzed stack. The materialized inputs
/// stay available so renderers can consume them alongside the results.
#[derive(Debug, Clone)]
pub struct StackAnalysis {
    pub stack: FrameStack,
    pub timestamps: Vec<f64>,
    pub output: AnalysisOutput,
}

/// Run the full trajectory/kinematics chain over materialized inputs.
///
/// The timestamp alignment check runs first, before any centroid is
/// extracted, so a misaligned request fails without wasted work and
/// long before any velocity could be produced.
pub fn analyze(
    stack: &FrameStack,
    timestamps: &[f64],
    builder: &TrajectoryBuilder,
) -> Result<AnalysisOutput> {
    if timestamps.len() != stack.len() {
        return Err(AnalysisError::Alignment {
            frames: stack.len(),
            timestamps: timestamps.len(),
        });
    }

    debug!("extracting trajectory over {} frame(s)", stack.len());
    let trajectory = builder.build(stack)?;
    let kinematics = derive_kinematics(&trajectory, timestamps)?;
    let rounded = trajectory.rounded(stack.width(), stack.height());

    Ok(AnalysisOutput {
        frame_count: stack.len(),
        height: stack.height(),
        width: stack.width(),
        trajectory,
        rounded,
        kinematics,
    })
}

/// Materialize both sources, then analyze.
pub fn run_request(
    images: &dyn ImageSource,
    metadata: &dyn MetadataSource,
    builder: &TrajectoryBuilder,
) -> anyhow::Result<StackAnalysis> {
    let stack = images.load()?;
    let timestamps = metadata.load()?;
    info!(
        "Analyzing {} frame(s) of {}x{}",
        stack.len(),
        stack.height(),
        stack.width()
    );

    let output = analyze(&stack, &timestamps, builder)?;
    Ok(StackAnalysis {
        stack,
        timestamps,
        output,
    })
}
