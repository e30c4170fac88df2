use std::error::Error;
use std::f64::consts::PI;
use std::fmt;

use rustfft::num_complex::Complex;
use rustfft::FftPlanner;
use serde::{Deserialize, Serialize};

use super::snip_pair;

/// Growth oscillations below this frequency are indistinguishable from
/// drift, so peak searches start here.
pub const MIN_PEAK_FREQUENCY: f64 = 0.5;
/// Absolute floor under the adaptive peak threshold.
pub const PEAK_HEIGHT_FLOOR: f64 = 1.5;
/// Minimum index separation between reported peaks.
pub const MIN_PEAK_DISTANCE: usize = 50;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AnalysisConfig {
    pub min_peak_frequency: f64,
    pub peak_height_floor: f64,
    pub min_peak_distance: usize,
    pub fft_window_min: Option<f64>,
    pub fft_window_max: Option<f64>,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            min_peak_frequency: MIN_PEAK_FREQUENCY,
            peak_height_floor: PEAK_HEIGHT_FLOOR,
            min_peak_distance: MIN_PEAK_DISTANCE,
            fft_window_min: None,
            fft_window_max: None,
        }
    }
}

/// One-sided amplitude spectrum of an intensity series.
///
/// The series is truncated to a common length, assumed uniformly sampled at
/// (t_last - t_first) / n, mean-removed, Hann-windowed (periodic form) and
/// transformed; bin k maps to frequency k / (n * spacing) and the magnitudes
/// are normalized by the windowed signal power. Returns `None` on empty or
/// non-finite input and whenever a non-finite value would reach the output;
/// spectra are computed fresh per call and never cached.
pub fn compute_fft(time: &[f64], values: &[f64]) -> Option<(Vec<f64>, Vec<f64>)> {
    let (t, v) = snip_pair(time, values);
    let n = t.len();
    if n == 0 {
        return None;
    }
    if t.iter().any(|x| !x.is_finite()) || v.iter().any(|x| !x.is_finite()) {
        return None;
    }
    let spacing = (t[n - 1] - t[0]) / n as f64;
    if !(spacing > 0.0) {
        return None;
    }

    let mean = v.iter().sum::<f64>() / n as f64;
    let windowed: Vec<f64> = (0..n)
        .map(|i| {
            let w = 0.5 - 0.5 * (2.0 * PI * i as f64 / n as f64).cos();
            (v[i] - mean) * w
        })
        .collect();
    let power: f64 = windowed.iter().map(|x| x * x).sum();
    if power <= 0.0 {
        // Constant input windows to silence; there is no spectrum to report.
        return None;
    }

    let mut planner = FftPlanner::new();
    let fft = planner.plan_fft_forward(n);
    let mut buffer: Vec<Complex<f64>> = windowed
        .iter()
        .map(|&x| Complex::new(x, 0.0))
        .collect();
    fft.process(&mut buffer);

    let bins = n / 2 + 1;
    let mut freqs = Vec::with_capacity(bins);
    let mut psd = Vec::with_capacity(bins);
    for (k, bin) in buffer.iter().take(bins).enumerate() {
        let frequency = k as f64 / (n as f64 * spacing);
        let amplitude = (2.0 * bin.norm_sqr() / power).sqrt();
        if !frequency.is_finite() || !amplitude.is_finite() {
            return None;
        }
        freqs.push(frequency);
        psd.push(amplitude);
    }
    Some((freqs, psd))
}

/// Restricts an (x, y) pair to the x interval [min, max] (either bound
/// optional, both inclusive). With no bounds at all, or with both inputs
/// empty, the pair passes through untouched.
pub fn apply_cutoffs(
    x: &[f64],
    y: &[f64],
    min: Option<f64>,
    max: Option<f64>,
) -> (Vec<f64>, Vec<f64>) {
    if (min.is_none() && max.is_none()) || (x.is_empty() && y.is_empty()) {
        return (x.to_vec(), y.to_vec());
    }
    let (x, y) = snip_pair(x, y);
    let mut out_x = Vec::with_capacity(x.len());
    let mut out_y = Vec::with_capacity(y.len());
    for (&xi, &yi) in x.iter().zip(y.iter()) {
        if min.map_or(true, |lo| xi >= lo) && max.map_or(true, |hi| xi <= hi) {
            out_x.push(xi);
            out_y.push(yi);
        }
    }
    (out_x, out_y)
}

/// Peak frequencies in a spectrum, tallest first within each exclusion
/// window.
///
/// Frequencies below `min_freq` are cut first. A bin is a peak when it
/// strictly exceeds both neighbors and clears max(median + 3 sigma,
/// `height_floor`); of any two peaks closer than `min_distance` bins the
/// taller survives. Returns `None` when the statistics cannot be computed
/// (nothing left after the cutoff, or non-finite data); a flat spectrum is
/// a valid result with no peaks, reported as an empty list.
pub fn detect_peaks(
    x: &[f64],
    y: &[f64],
    min_freq: f64,
    height_floor: f64,
    min_distance: usize,
) -> Option<Vec<f64>> {
    let (x, y) = apply_cutoffs(x, y, Some(min_freq), None);
    if x.is_empty() || y.is_empty() {
        return None;
    }
    if x.iter().any(|v| !v.is_finite()) || y.iter().any(|v| !v.is_finite()) {
        return None;
    }

    let threshold = (median(&y) + 3.0 * population_std(&y)).max(height_floor);
    let mut candidates: Vec<usize> = (1..y.len().saturating_sub(1))
        .filter(|&i| y[i] > y[i - 1] && y[i] > y[i + 1] && y[i] >= threshold)
        .collect();
    candidates.sort_by(|&a, &b| y[b].partial_cmp(&y[a]).unwrap());

    let mut kept: Vec<usize> = Vec::new();
    for candidate in candidates {
        let suppressed = kept
            .iter()
            .any(|&peak| peak.abs_diff(candidate) < min_distance);
        if !suppressed {
            kept.push(candidate);
        }
    }
    kept.sort_unstable();
    Some(kept.into_iter().map(|i| x[i]).collect())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CalibrationError {
    ZeroPeriod,
}

impl fmt::Display for CalibrationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CalibrationError::ZeroPeriod => {
                write!(f, "calibration span covers no oscillation period")
            }
        }
    }
}

impl Error for CalibrationError {}

/// Manual growth-rate calibration: the user marks two points on a series
/// that bracket `peak_count` oscillations. Returns (period, frequency).
pub fn calibrate(x1: f64, x2: f64, peak_count: usize) -> Result<(f64, f64), CalibrationError> {
    let period = (x2 - x1) / peak_count as f64;
    if period == 0.0 || !period.is_finite() {
        return Err(CalibrationError::ZeroPeriod);
    }
    Ok((period, 1.0 / period))
}

fn median(values: &[f64]) -> f64 {
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap());
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}

fn population_std(values: &[f64]) -> f64 {
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    (values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n).sqrt()
}
