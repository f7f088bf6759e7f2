// src/main.rs

use anyhow::Result;
use comtrace::histogram::{histogram, Histogram};
use comtrace::overlay::overlay_stack;
use comtrace::stack_io::{
    find_stack_files, metadata_path_for, TiffStackSource, TimestampFileSource,
};
use comtrace::{run_request, Config, TrajectoryBuilder};
use std::fs::File;
use std::io::Write;
use std::path::Path;
use std::time::Instant;
use tracing::{error, info};

fn main() -> Result<()> {
    let config = Config::load("config.yaml")?;

    tracing_subscriber::fmt()
        .with_env_filter(format!("comtrace={}", config.logging.level))
        .init();

    info!("Center-of-mass trajectory analysis starting");
    info!("✓ Configuration loaded");

    let stacks = find_stack_files(&config.io.input_dir)?;
    if stacks.is_empty() {
        error!("No TIFF stacks found in {}", config.io.input_dir);
        return Ok(());
    }

    std::fs::create_dir_all(&config.io.output_dir)?;

    let builder =
        TrajectoryBuilder::with_parallel_threshold(config.analysis.parallel_frame_threshold);

    let start_time = Instant::now();
    let mut stats = BatchStats::default();

    for (idx, stack_path) in stacks.iter().enumerate() {
        info!(
            "Processing stack {}/{}: {}",
            idx + 1,
            stacks.len(),
            stack_path.display()
        );

        match process_stack(stack_path, &builder, &config) {
            Ok(frame_count) => {
                stats.stacks_analyzed += 1;
                stats.total_frames += frame_count as u64;
            }
            Err(e) => {
                error!("Failed to process {}: {:#}", stack_path.display(), e);
                stats.stacks_failed += 1;
            }
        }
    }

    let elapsed = start_time.elapsed().as_secs_f64();
    info!("Final report:");
    info!("  Stacks analyzed: {}", stats.stacks_analyzed);
    info!("  Stacks failed: {}", stats.stacks_failed);
    info!("  Total frames: {}", stats.total_frames);
    if elapsed > 0.0 && stats.total_frames > 0 {
        info!(
            "  Elapsed: {:.1}s ({:.1} frames/s)",
            elapsed,
            stats.total_frames as f64 / elapsed
        );
    }

    Ok(())
}

#[derive(Default)]
struct BatchStats {
    stacks_analyzed: usize,
    stacks_failed: usize,
    total_frames: u64,
}

fn process_stack(stack_path: &Path, builder: &TrajectoryBuilder, config: &Config) -> Result<usize> {
    let metadata_path = metadata_path_for(stack_path, &config.io.metadata_extension);
    let images = TiffStackSource::new(stack_path);
    let metadata = TimestampFileSource::new(&metadata_path);

    let analysis = run_request(&images, &metadata, builder)?;

    let stem = stack_stem(stack_path);
    let output_dir = Path::new(&config.io.output_dir);

    let json_path = output_dir.join(format!("{stem}_analysis.json"));
    serde_json::to_writer_pretty(File::create(&json_path)?, &analysis.output)?;
    info!("✓ Results written to {}", json_path.display());

    let kinematics = &analysis.output.kinematics;
    if let Some((mean_x, mean_y)) =
        mean(&kinematics.x_velocity).zip(mean(&kinematics.y_velocity))
    {
        info!(
            "  Mean velocity: x={:.3}, y={:.3} (px per time unit)",
            mean_x, mean_y
        );
    }

    if config.histogram.enabled {
        let x_hist = histogram(&kinematics.x_velocity, config.histogram.bins);
        let y_hist = histogram(&kinematics.y_velocity, config.histogram.bins);
        write_histogram_csv(
            &output_dir.join(format!("{stem}_x_velocity_hist.csv")),
            &x_hist,
        )?;
        write_histogram_csv(
            &output_dir.join(format!("{stem}_y_velocity_hist.csv")),
            &y_hist,
        )?;
        info!(
            "✓ Velocity histograms written ({} x-bins, {} y-bins)",
            x_hist.bin_count(),
            y_hist.bin_count()
        );
    }

    if config.overlay.enabled {
        let frames = overlay_stack(
            &analysis.stack,
            &analysis.output.rounded,
            config.overlay.marker_rgb,
        );
        let overlay_dir = output_dir.join(format!("{stem}_overlay"));
        std::fs::create_dir_all(&overlay_dir)?;
        for (i, frame) in frames.iter().enumerate() {
            frame.save(overlay_dir.join(format!("frame_{i:04}.png")))?;
        }
        info!(
            "✓ {} overlay frame(s) written to {}",
            frames.len(),
            overlay_dir.display()
        );
    }

    Ok(analysis.output.frame_count)
}

fn stack_stem(path: &Path) -> String {
    path.file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("stack")
        .to_string()
}

fn write_histogram_csv(path: &Path, hist: &Histogram) -> Result<()> {
    let mut file = File::create(path)?;
    writeln!(file, "bin_start,bin_end,count")?;
    for (i, count) in hist.counts.iter().enumerate() {
        writeln!(
            file,
            "{},{},{}",
            hist.bin_edges[i],
            hist.bin_edges[i + 1],
            count
        )?;
    }
    Ok(())
}

fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}
