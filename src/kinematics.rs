// src/kinematics.rs
//
// Displacement and instantaneous velocity from a trajectory plus an
// aligned timestamp series.
//
// Strictly sequential: element i depends on samples i and i+1, so the
// derived series have length N - 1. Velocity units are pixels per
// timestamp-unit; no physical calibration happens here. Division by a
// zero time step is a typed error, never a silent infinity.

use crate::error::{AnalysisError, Result};
use crate::trajectory::Trajectory;
use serde::Serialize;

/// Derived series, each of length N - 1 (empty for N <= 1).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KinematicsResult {
    pub x_displacement: Vec<f64>,
    pub y_displacement: Vec<f64>,
    pub x_velocity: Vec<f64>,
    pub y_velocity: Vec<f64>,
}

/// Consecutive differences: `d[i] = v[i+1] - v[i]`.
pub fn displacement_series(values: &[f64]) -> Vec<f64> {
    values.windows(2).map(|pair| pair[1] - pair[0]).collect()
}

/// Elapsed time per interval: `step[i] = t[i+1] - t[i]`.
pub fn time_steps(timestamps: &[f64]) -> Vec<f64> {
    timestamps.windows(2).map(|pair| pair[1] - pair[0]).collect()
}

/// Elementwise `displacement[i] / steps[i]`.
///
/// Fails with `ZeroTimestep` at the first interval whose step is zero.
pub fn velocity_series(displacement: &[f64], steps: &[f64]) -> Result<Vec<f64>> {
    debug_assert_eq!(displacement.len(), steps.len());

    let mut velocity = Vec::with_capacity(displacement.len());
    for (interval, (&d, &dt)) in displacement.iter().zip(steps).enumerate() {
        if dt == 0.0 {
            return Err(AnalysisError::ZeroTimestep { interval });
        }
        velocity.push(d / dt);
    }
    Ok(velocity)
}

/// Derive displacement and velocity series for both axes.
///
/// The alignment check runs before anything else: a timestamp count that
/// differs from the frame count halts the computation with `Alignment`
/// before any displacement or velocity is produced.
pub fn derive_kinematics(trajectory: &Trajectory, timestamps: &[f64]) -> Result<KinematicsResult> {
    if timestamps.len() != trajectory.len() {
        return Err(AnalysisError::Alignment {
            frames: trajectory.len(),
            timestamps: timestamps.len(),
        });
    }

    let x_displacement = displacement_series(trajectory.x_coords());
    let y_displacement = displacement_series(trajectory.y_coords());
    let steps = time_steps(timestamps);

    let x_velocity = velocity_series(&x_displacement, &steps)?;
    let y_velocity = velocity_series(&y_displacement, &steps)?;

    Ok(KinematicsResult {
        x_displacement,
        y_displacement,
        x_velocity,
        y_velocity,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trajectory::TrajectoryBuilder;
    use crate::types::FrameStack;
    use ndarray::Array2;

    fn trajectory_from_pixels(positions: &[(usize, usize)]) -> Trajectory {
        let matrices = positions
            .iter()
            .map(|&(row, col)| {
                let mut data = Array2::<f32>::zeros((4, 4));
                data[[row, col]] = 50.0;
                data
            })
            .collect();
        let stack = FrameStack::from_matrices(matrices).unwrap();
        TrajectoryBuilder::new().build(&stack).unwrap()
    }

    #[test]
    fn test_worked_example() {
        // Bright pixel walks (row, col): (1,1) -> (2,1) -> (2,2).
        let trajectory = trajectory_from_pixels(&[(1, 1), (2, 1), (2, 2)]);
        let result = derive_kinematics(&trajectory, &[0.0, 0.5, 1.0]).unwrap();

        assert_eq!(result.x_displacement, vec![0.0, 1.0]);
        assert_eq!(result.y_displacement, vec![1.0, 0.0]);
        assert_eq!(result.x_velocity, vec![0.0, 2.0]);
        assert_eq!(result.y_velocity, vec![2.0, 0.0]);
    }

    #[test]
    fn test_series_lengths() {
        let trajectory = trajectory_from_pixels(&[(0, 0), (1, 1), (2, 2), (3, 3)]);
        let result = derive_kinematics(&trajectory, &[0.0, 1.0, 2.0, 3.0]).unwrap();

        assert_eq!(result.x_displacement.len(), trajectory.len() - 1);
        assert_eq!(result.y_displacement.len(), trajectory.len() - 1);
        assert_eq!(result.x_velocity.len(), result.x_displacement.len());
        assert_eq!(result.y_velocity.len(), result.y_displacement.len());
    }

    #[test]
    fn test_single_frame_yields_empty_series() {
        let trajectory = trajectory_from_pixels(&[(2, 2)]);
        let result = derive_kinematics(&trajectory, &[0.0]).unwrap();
        assert!(result.x_displacement.is_empty());
        assert!(result.x_velocity.is_empty());
    }

    #[test]
    fn test_reconstruction_by_cumulative_sum() {
        let trajectory = trajectory_from_pixels(&[(0, 1), (1, 3), (3, 2), (2, 0), (3, 3)]);
        let timestamps: Vec<f64> = (0..trajectory.len()).map(|i| i as f64 * 0.1).collect();
        let result = derive_kinematics(&trajectory, &timestamps).unwrap();

        let mut x = trajectory.x_coords()[0];
        let mut y = trajectory.y_coords()[0];
        for i in 1..trajectory.len() {
            x += result.x_displacement[i - 1];
            y += result.y_displacement[i - 1];
            assert!((x - trajectory.x_coords()[i]).abs() < 1e-9);
            assert!((y - trajectory.y_coords()[i]).abs() < 1e-9);
        }
    }

    #[test]
    fn test_misaligned_timestamps() {
        let trajectory = trajectory_from_pixels(&[(1, 1), (2, 2), (3, 3)]);
        let err = derive_kinematics(&trajectory, &[0.0, 0.5]).unwrap_err();
        assert_eq!(
            err,
            AnalysisError::Alignment {
                frames: 3,
                timestamps: 2,
            }
        );
    }

    #[test]
    fn test_duplicate_timestamp_is_zero_timestep() {
        let trajectory = trajectory_from_pixels(&[(1, 1), (2, 2), (3, 3)]);
        let err = derive_kinematics(&trajectory, &[0.0, 0.5, 0.5]).unwrap_err();
        // The second interval carries the zero step.
        assert_eq!(err, AnalysisError::ZeroTimestep { interval: 1 });
    }

    #[test]
    fn test_time_steps() {
        assert_eq!(time_steps(&[0.0, 0.5, 1.25]), vec![0.5, 0.75]);
        assert!(time_steps(&[1.0]).is_empty());
        assert!(time_steps(&[]).is_empty());
    }
}
