// src/stack_io.rs
//
// Filesystem-backed sources: multi-page TIFF stacks and camera metadata
// timestamp files. Everything here stays outside the analysis itself;
// it only materializes inputs for the pipeline.

use crate::sources::{ImageSource, MetadataSource};
use crate::types::FrameStack;
use anyhow::{bail, Context, Result};
use ndarray::Array2;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use tiff::decoder::{Decoder, DecodingResult};
use tracing::info;
use walkdir::WalkDir;

/// Scan the input directory for TIFF stacks, sorted for a deterministic
/// processing order.
pub fn find_stack_files(input_dir: &str) -> Result<Vec<PathBuf>> {
    let mut stacks = Vec::new();

    let stack_extensions = ["tif", "tiff", "TIF", "TIFF"];

    for entry in WalkDir::new(input_dir)
        .follow_links(true)
        .into_iter()
        .filter_map(|e| e.ok())
    {
        let path = entry.path();
        if let Some(ext) = path.extension() {
            if stack_extensions.contains(&ext.to_str().unwrap_or("")) {
                stacks.push(path.to_path_buf());
            }
        }
    }
    stacks.sort();

    info!("Found {} TIFF stack(s)", stacks.len());
    Ok(stacks)
}

/// Path of the metadata file paired with a stack: same location and stem,
/// the configured extension.
pub fn metadata_path_for(stack_path: &Path, extension: &str) -> PathBuf {
    stack_path.with_extension(extension)
}

/// Reads every page of a grayscale TIFF stack into memory.
///
/// 8- and 16-bit integer pages and 32-bit float pages are accepted and
/// converted to f32 raw intensity. Page dimensions must agree across the
/// stack; that check lives in `FrameStack::from_matrices`.
pub struct TiffStackSource {
    path: PathBuf,
}

impl TiffStackSource {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

impl ImageSource for TiffStackSource {
    fn load(&self) -> Result<FrameStack> {
        let file = File::open(&self.path)
            .with_context(|| format!("failed to open stack {}", self.path.display()))?;
        let mut decoder = Decoder::new(BufReader::new(file))
            .with_context(|| format!("not a TIFF file: {}", self.path.display()))?;

        let mut matrices = Vec::new();
        loop {
            let (width, height) = decoder.dimensions()?;
            let page = decoder.read_image()?;
            matrices.push(page_to_matrix(page, width as usize, height as usize)?);

            if !decoder.more_images() {
                break;
            }
            decoder.next_image()?;
        }

        let stack = FrameStack::from_matrices(matrices)?;
        info!(
            "Loaded {}: {} frame(s), {}x{}",
            self.path.display(),
            stack.len(),
            stack.height(),
            stack.width()
        );
        Ok(stack)
    }
}

fn page_to_matrix(page: DecodingResult, width: usize, height: usize) -> Result<Array2<f32>> {
    let pixels: Vec<f32> = match page {
        DecodingResult::U8(data) => data.into_iter().map(|v| v as f32).collect(),
        DecodingResult::U16(data) => data.into_iter().map(|v| v as f32).collect(),
        DecodingResult::F32(data) => data,
        _ => bail!("unsupported TIFF sample format (expected u8, u16, or f32 samples)"),
    };

    if pixels.len() != width * height {
        bail!(
            "TIFF page has {} samples for {}x{} (multi-channel stacks are not supported)",
            pixels.len(),
            width,
            height
        );
    }

    Array2::from_shape_vec((height, width), pixels).map_err(Into::into)
}

/// Reads timestamps from a metadata text file.
///
/// One sample per line; the last whitespace-separated token on the line
/// is the timestamp value, so both bare values and `index value` pairs
/// parse. Blank lines and `#` comments are skipped. The series must be
/// strictly increasing: zero or negative steps at the file boundary are
/// reported with their line number rather than surfacing later as a
/// velocity failure.
pub struct TimestampFileSource {
    path: PathBuf,
}

impl TimestampFileSource {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

impl MetadataSource for TimestampFileSource {
    fn load(&self) -> Result<Vec<f64>> {
        let contents = std::fs::read_to_string(&self.path)
            .with_context(|| format!("failed to read metadata file {}", self.path.display()))?;
        parse_timestamps(&contents)
            .with_context(|| format!("bad metadata file {}", self.path.display()))
    }
}

fn parse_timestamps(contents: &str) -> Result<Vec<f64>> {
    let mut timestamps = Vec::new();

    for (line_no, line) in contents.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let token = line.split_whitespace().last().unwrap();
        let value: f64 = token
            .parse()
            .with_context(|| format!("line {}: not a number: {:?}", line_no + 1, token))?;
        if !value.is_finite() {
            bail!("line {}: timestamp is not finite: {}", line_no + 1, value);
        }

        if let Some(&previous) = timestamps.last() {
            if value <= previous {
                bail!(
                    "line {}: timestamps must be strictly increasing, got {} after {}",
                    line_no + 1,
                    value,
                    previous
                );
            }
        }
        timestamps.push(value);
    }

    Ok(timestamps)
}
