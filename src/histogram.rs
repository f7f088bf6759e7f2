// src/histogram.rs
//
// Velocity histograms. Bin counts are either fixed by config or chosen
// automatically: the larger of the Freedman-Diaconis and Sturges
// estimates, so narrow peaks and small samples both bin sensibly.

use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Histogram {
    /// Bin boundaries, length = number of bins + 1.
    pub bin_edges: Vec<f64>,
    /// Samples per bin; the final bin includes its right edge.
    pub counts: Vec<u64>,
}

impl Histogram {
    pub fn bin_count(&self) -> usize {
        self.counts.len()
    }

    pub fn total(&self) -> u64 {
        self.counts.iter().sum()
    }
}

/// Bin a sample series. `bins = 0` selects the bin count automatically.
pub fn histogram(values: &[f64], bins: usize) -> Histogram {
    if values.is_empty() {
        return Histogram {
            bin_edges: Vec::new(),
            counts: Vec::new(),
        };
    }

    let min = values.iter().cloned().fold(f64::INFINITY, f64::min);
    let max = values.iter().cloned().fold(f64::NEG_INFINITY, f64::max);

    // Degenerate range: a single bin centered on the shared value.
    if max == min {
        return Histogram {
            bin_edges: vec![min - 0.5, min + 0.5],
            counts: vec![values.len() as u64],
        };
    }

    let bins = if bins > 0 { bins } else { auto_bin_count(values, min, max) };
    let width = (max - min) / bins as f64;

    let bin_edges: Vec<f64> = (0..=bins).map(|i| min + i as f64 * width).collect();
    let mut counts = vec![0u64; bins];
    for &v in values {
        let idx = (((v - min) / width) as usize).min(bins - 1);
        counts[idx] += 1;
    }

    Histogram { bin_edges, counts }
}

/// max(Freedman-Diaconis, Sturges), with Sturges alone when the IQR
/// collapses to zero.
fn auto_bin_count(values: &[f64], min: f64, max: f64) -> usize {
    let n = values.len();
    let sturges = (n as f64).log2().ceil() as usize + 1;

    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let iqr = percentile(&sorted, 0.75) - percentile(&sorted, 0.25);
    if iqr <= 0.0 {
        return sturges.max(1);
    }

    let fd_width = 2.0 * iqr / (n as f64).cbrt();
    let fd = ((max - min) / fd_width).ceil() as usize;

    fd.max(sturges).max(1)
}

/// Linear-interpolated percentile of an already-sorted slice.
fn percentile(sorted: &[f64], q: f64) -> f64 {
    let position = q * (sorted.len() - 1) as f64;
    let lower = position.floor() as usize;
    let fraction = position - lower as f64;
    if lower + 1 < sorted.len() {
        sorted[lower] + fraction * (sorted[lower + 1] - sorted[lower])
    } else {
        sorted[lower]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_bins() {
        let values = [0.0, 0.1, 0.9, 1.0, 2.0];
        let h = histogram(&values, 2);
        assert_eq!(h.bin_count(), 2);
        assert_eq!(h.bin_edges, vec![0.0, 1.0, 2.0]);
        // Last bin includes its right edge: [0, 1) gets three, [1, 2] gets two.
        assert_eq!(h.counts, vec![3, 2]);
        assert_eq!(h.total(), 5);
    }

    #[test]
    fn test_every_sample_lands_in_a_bin() {
        let values: Vec<f64> = (0..100).map(|i| (i as f64 * 0.37).sin()).collect();
        let h = histogram(&values, 0);
        assert_eq!(h.total(), 100);
        assert_eq!(h.bin_edges.len(), h.bin_count() + 1);
    }

    #[test]
    fn test_empty_series() {
        let h = histogram(&[], 0);
        assert!(h.counts.is_empty());
        assert!(h.bin_edges.is_empty());
    }

    #[test]
    fn test_constant_series_single_bin() {
        let h = histogram(&[2.5; 10], 0);
        assert_eq!(h.bin_count(), 1);
        assert_eq!(h.counts, vec![10]);
        assert!(h.bin_edges[0] < 2.5 && 2.5 < h.bin_edges[1]);
    }

    #[test]
    fn test_auto_bins_scale_with_sample_count() {
        let small: Vec<f64> = (0..8).map(|i| i as f64).collect();
        let large: Vec<f64> = (0..4096).map(|i| (i as f64 * 0.731).fract()).collect();
        assert!(histogram(&large, 0).bin_count() > histogram(&small, 0).bin_count());
    }
}
