// src/sources.rs
//
// Collaborator seams feeding the pipeline. The analysis itself never
// touches the filesystem: an ImageSource materializes the full frame
// stack and a MetadataSource the full timestamp series up front, and the
// pipeline consumes both from memory.

use crate::types::FrameStack;
use anyhow::Result;

/// Supplies the ordered frame sequence, already validated to share one
/// set of dimensions.
pub trait ImageSource {
    fn load(&self) -> Result<FrameStack>;
}

/// Supplies one timestamp per frame, strictly increasing, in seconds (or
/// whatever unit the downstream velocity should be expressed against).
pub trait MetadataSource {
    fn load(&self) -> Result<Vec<f64>>;
}

/// An already-materialized stack, for tests and embedding callers.
#[derive(Debug, Clone)]
pub struct InMemoryImageSource {
    stack: FrameStack,
}

impl InMemoryImageSource {
    pub fn new(stack: FrameStack) -> Self {
        Self { stack }
    }
}

impl ImageSource for InMemoryImageSource {
    fn load(&self) -> Result<FrameStack> {
        Ok(self.stack.clone())
    }
}

/// An already-materialized timestamp series.
#[derive(Debug, Clone)]
pub struct InMemoryMetadataSource {
    timestamps: Vec<f64>,
}

impl InMemoryMetadataSource {
    pub fn new(timestamps: Vec<f64>) -> Self {
        Self { timestamps }
    }
}

impl MetadataSource for InMemoryMetadataSource {
    fn load(&self) -> Result<Vec<f64>> {
        Ok(self.timestamps.clone())
    }
}
