//! Clock edge recovery from the co-transmitted clock carrier.

use crate::config::DecoderOptions;
use crate::signal_processing::spectrogram::Spectrogram;

/// Central-difference gradient, matching the numpy `gradient` convention:
/// forward/backward differences at the endpoints, centered differences
/// elsewhere.
fn gradient(values: &[f64]) -> Vec<f64> {
    let n = values.len();
    if n < 2 {
        return vec![0.0; n];
    }
    let mut out = vec![0.0; n];
    out[0] = values[1] - values[0];
    out[n - 1] = values[n - 1] - values[n - 2];
    for i in 1..n - 1 {
        out[i] = (values[i + 1] - values[i - 1]) / 2.0;
    }
    out
}

fn min_max_normalize(values: &[f64]) -> Vec<f64> {
    let min = values.iter().cloned().fold(f64::INFINITY, f64::min);
    let max = values.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    let span = max - min;
    if span <= f64::EPSILON {
        return vec![0.0; values.len()];
    }
    values.iter().map(|&v| (v - min) / span).collect()
}

/// Peaks of `values` above `height`, at least `min_distance` frames apart.
///
/// When two candidate peaks fall within `min_distance` of each other the
/// taller one wins, mirroring `scipy.signal.find_peaks`'s distance
/// suppression.
fn find_peaks(values: &[f64], height: f64, min_distance: usize) -> Vec<usize> {
    let mut candidates = Vec::new();
    for i in 0..values.len() {
        let v = values[i];
        if v < height {
            continue;
        }
        let left_ok = i == 0 || values[i - 1] <= v;
        let right_ok = i + 1 == values.len() || values[i + 1] <= v;
        if left_ok && right_ok {
            candidates.push(i);
        }
    }

    let mut accepted: Vec<usize> = Vec::new();
    for &idx in &candidates {
        if let Some(&last) = accepted.last() {
            if idx - last < min_distance {
                if values[idx] > values[last] {
                    accepted.pop();
                    accepted.push(idx);
                }
                continue;
            }
        }
        accepted.push(idx);
    }
    accepted
}

/// Default minimum peak spacing when the caller leaves it unconfigured.
///
/// `data_rate` is the clock's observable *transition* rate (`2 * clock_speed`):
/// the carrier flips every half symbol period, so two transitions land inside
/// every data symbol, `frames_per_transition` frames apart. Those two belong
/// to the same symbol and must collapse into one accepted edge, while the
/// next symbol's first transition, `2 * frames_per_transition` away, must
/// still get through. Splitting the difference keeps `find_peaks`'s
/// compare-to-last-accepted distance check strictly inside `(d, 2d]` for both
/// cases, so it thins the uniform transition train to one edge per symbol
/// instead of one edge per transition.
fn default_min_edge_distance(spectrogram: &Spectrogram, data_rate: f64) -> usize {
    if spectrogram.times.len() < 2 || data_rate <= 0.0 {
        return 1;
    }
    let hop_duration = spectrogram.times[1] - spectrogram.times[0];
    let frames_per_transition = (1.0 / data_rate) / hop_duration;
    ((frames_per_transition * 1.5).round() as usize).max(1)
}

/// Detect clock transition instants (in seconds) within `spectrogram`.
///
/// Averages power across the two clock-carrier bins, min-max normalizes it
/// to [0, 1], takes the gradient, and peak-picks its absolute value. Working
/// on the gradient rather than the raw level sidesteps the ambiguity of the
/// clock tone alternating between two absolute power levels.
pub fn detect_edges(
    spectrogram: &Spectrogram,
    clock_freqs: [f64; 2],
    options: &DecoderOptions,
) -> Vec<f64> {
    if spectrogram.frame_count() == 0 {
        return Vec::new();
    }

    let clock_bins = [
        spectrogram.nearest_bin(clock_freqs[0]),
        spectrogram.nearest_bin(clock_freqs[1]),
    ];

    let clock_power: Vec<f64> = (0..spectrogram.frame_count())
        .map(|frame| {
            clock_bins
                .iter()
                .map(|&bin| spectrogram.power[[bin, frame]])
                .sum::<f64>()
                / clock_bins.len() as f64
        })
        .collect();

    let normalized = min_max_normalize(&clock_power);
    let grad = gradient(&normalized);
    let abs_grad: Vec<f64> = grad.iter().map(|v| v.abs()).collect();

    let min_distance = options
        .min_edge_distance_frames
        .unwrap_or_else(|| default_min_edge_distance(spectrogram, options.data_rate));
    let peaks = find_peaks(&abs_grad, options.edge_height_threshold, min_distance);

    peaks.into_iter().map(|idx| spectrogram.times[idx]).collect()
}
