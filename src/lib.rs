// comtrace: center-of-mass trajectory and kinematics analysis for
// intensity image stacks.
//
// A stack of grayscale frames goes in; per-frame weighted centroids,
// the ordered trajectory, and displacement/velocity series come out.
// Loading (TIFF stacks, metadata timestamps) and rendering (overlays,
// histograms) live at the edges and talk to the analysis through the
// source traits and result types.

pub mod centroid;
mod config;
pub mod error;
pub mod histogram;
pub mod kinematics;
pub mod overlay;
pub mod pipeline;
pub mod sources;
pub mod stack_io;
pub mod trajectory;
pub mod types;

// Re-exports for ergonomic access from the binary and embedding callers
pub use centroid::{weighted_centroid, Centroid};
pub use error::AnalysisError;
pub use kinematics::{derive_kinematics, KinematicsResult};
pub use pipeline::{analyze, run_request, AnalysisOutput, StackAnalysis};
pub use sources::{ImageSource, InMemoryImageSource, InMemoryMetadataSource, MetadataSource};
pub use trajectory::{RoundedTrajectory, Trajectory, TrajectoryBuilder};
pub use types::{Config, Frame, FrameStack};
