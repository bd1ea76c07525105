//! Short-time Fourier transform power spectrogram.

use ndarray::Array2;
use rustfft::num_complex::Complex64;
use rustfft::FftPlanner;
use std::f64::consts::PI;

/// A power spectrogram: `power[[bin, frame]]` is the magnitude-squared of
/// the STFT at frequency `freqs[bin]` and time `times[frame]`.
#[derive(Debug, Clone)]
pub struct Spectrogram {
    pub freqs: Vec<f64>,
    pub times: Vec<f64>,
    pub power: Array2<f64>,
}

impl Spectrogram {
    /// Index of the frequency bin nearest `target_hz`.
    pub fn nearest_bin(&self, target_hz: f64) -> usize {
        self.freqs
            .iter()
            .enumerate()
            .min_by(|(_, a), (_, b)| {
                (*a - target_hz)
                    .abs()
                    .partial_cmp(&(*b - target_hz).abs())
                    .unwrap()
            })
            .map(|(idx, _)| idx)
            .expect("spectrogram has at least one frequency bin")
    }

    /// Index of the time frame nearest `target_secs`.
    pub fn nearest_frame(&self, target_secs: f64) -> usize {
        self.times
            .iter()
            .enumerate()
            .min_by(|(_, a), (_, b)| {
                (*a - target_secs)
                    .abs()
                    .partial_cmp(&(*b - target_secs).abs())
                    .unwrap()
            })
            .map(|(idx, _)| idx)
            .expect("spectrogram has at least one time frame")
    }

    pub fn frame_count(&self) -> usize {
        self.times.len()
    }
}

fn hann_window(length: usize) -> Vec<f64> {
    if length == 1 {
        return vec![1.0];
    }
    (0..length)
        .map(|i| 0.5 * (1.0 - (2.0 * PI * i as f64 / (length - 1) as f64).cos()))
        .collect()
}

/// Compute a Hann-windowed power spectrogram of `samples`.
///
/// `fft_size` is the STFT window length; `hop_size` is the stride between
/// successive windows. Frames that would run past the end of `samples` are
/// dropped rather than zero-padded.
pub fn compute_spectrogram(
    samples: &[f64],
    sample_rate: u32,
    fft_size: usize,
    hop_size: usize,
) -> Spectrogram {
    assert!(fft_size > 0, "fft_size must be positive");
    assert!(hop_size > 0, "hop_size must be positive");

    let window = hann_window(fft_size);
    let n_bins = fft_size / 2 + 1;
    let n_frames = if samples.len() >= fft_size {
        (samples.len() - fft_size) / hop_size + 1
    } else {
        0
    };

    let mut planner = FftPlanner::<f64>::new();
    let fft = planner.plan_fft_forward(fft_size);

    let mut power = Array2::<f64>::zeros((n_bins, n_frames));
    let mut buffer = vec![Complex64::new(0.0, 0.0); fft_size];

    for frame in 0..n_frames {
        let start = frame * hop_size;
        for (n, slot) in buffer.iter_mut().enumerate() {
            *slot = Complex64::new(samples[start + n] * window[n], 0.0);
        }
        fft.process(&mut buffer);
        for bin in 0..n_bins {
            power[[bin, frame]] = buffer[bin].norm_sqr();
        }
    }

    let freqs: Vec<f64> = (0..n_bins)
        .map(|bin| bin as f64 * sample_rate as f64 / fft_size as f64)
        .collect();
    let times: Vec<f64> = (0..n_frames)
        .map(|frame| (frame * hop_size) as f64 / sample_rate as f64)
        .collect();

    Spectrogram {
        freqs,
        times,
        power,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI as PI64;

    fn sine(freq: f64, sample_rate: u32, n: usize) -> Vec<f64> {
        (0..n)
            .map(|i| (2.0 * PI64 * freq * i as f64 / sample_rate as f64).sin())
            .collect()
    }

    #[test]
    fn pure_tone_peaks_at_its_own_bin() {
        let sample_rate = 8_000;
        let samples = sine(1000.0, sample_rate, 4096);
        let spec = compute_spectrogram(&samples, sample_rate, 2048, 512);
        let target_bin = spec.nearest_bin(1000.0);
        let mid_frame = spec.frame_count() / 2;
        let column: Vec<f64> = (0..spec.freqs.len())
            .map(|bin| spec.power[[bin, mid_frame]])
            .collect();
        let max_bin = column
            .iter()
            .enumerate()
            .max_by(|(_, a), (_, b)| a.partial_cmp(b).unwrap())
            .map(|(idx, _)| idx)
            .unwrap();
        assert_eq!(max_bin, target_bin);
    }

    #[test]
    fn frame_count_respects_hop_and_window() {
        let samples = vec![0.0; 5000];
        let spec = compute_spectrogram(&samples, 8_000, 2048, 512);
        assert_eq!(spec.frame_count(), (5000 - 2048) / 512 + 1);
    }

    #[test]
    fn nearest_bin_finds_closest_frequency() {
        let spec = Spectrogram {
            freqs: vec![0.0, 100.0, 200.0, 300.0],
            times: vec![0.0],
            power: Array2::zeros((4, 1)),
        };
        assert_eq!(spec.nearest_bin(190.0), 2);
    }
}
