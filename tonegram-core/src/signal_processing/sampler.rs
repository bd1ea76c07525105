//! Per-edge symbol sampling: reading bit decisions out of the spectrogram.

use crate::config::FrequencyPlan;
use crate::signal_processing::spectrogram::Spectrogram;

/// Bit decisions for every role, sampled at one clock transition.
#[derive(Debug, Clone, PartialEq)]
pub struct SampledSymbol {
    pub time: f64,
    pub header: Vec<u8>,
    pub content: Vec<u8>,
    pub footer: Vec<u8>,
    pub modes: Vec<u8>,
}

fn bin_indices(spectrogram: &Spectrogram, freqs: &[f64]) -> Vec<usize> {
    freqs.iter().map(|&hz| spectrogram.nearest_bin(hz)).collect()
}

/// Decide each tone's bit by comparing its power at `frame` against
/// `threshold_ratio` times the strongest tone in the same role. This makes
/// the decision scale-free: it survives arbitrary overall signal
/// attenuation as long as relative tone strength is preserved.
fn threshold_bits(
    spectrogram: &Spectrogram,
    bins: &[usize],
    frame: usize,
    threshold_ratio: f64,
) -> Vec<u8> {
    if bins.is_empty() {
        return Vec::new();
    }
    let powers: Vec<f64> = bins.iter().map(|&bin| spectrogram.power[[bin, frame]]).collect();
    let max_power = powers.iter().cloned().fold(0.0, f64::max);
    let threshold = max_power * threshold_ratio;
    powers
        .into_iter()
        .map(|p| if p > threshold { 1 } else { 0 })
        .collect()
}

/// Sample header/content/footer/mode bits at each clock transition instant.
pub fn sample_symbols(
    spectrogram: &Spectrogram,
    plan: &FrequencyPlan,
    edge_times: &[f64],
    threshold_ratio: f64,
) -> Vec<SampledSymbol> {
    let header_bins = bin_indices(spectrogram, &plan.header);
    let content_bins = bin_indices(spectrogram, &plan.content);
    let footer_bins = bin_indices(spectrogram, &plan.footer);
    let mode_bins = bin_indices(spectrogram, &plan.modes);

    edge_times
        .iter()
        .map(|&time| {
            let frame = spectrogram.nearest_frame(time);
            SampledSymbol {
                time,
                header: threshold_bits(spectrogram, &header_bins, frame, threshold_ratio),
                content: threshold_bits(spectrogram, &content_bins, frame, threshold_ratio),
                footer: threshold_bits(spectrogram, &footer_bins, frame, threshold_ratio),
                modes: threshold_bits(spectrogram, &mode_bins, frame, threshold_ratio),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array2;

    fn single_frame_spectrogram(freqs: Vec<f64>, powers: Vec<f64>) -> Spectrogram {
        let mut power = Array2::zeros((freqs.len(), 1));
        for (i, p) in powers.into_iter().enumerate() {
            power[[i, 0]] = p;
        }
        Spectrogram {
            freqs,
            times: vec![0.0],
            power,
        }
    }

    #[test]
    fn threshold_bits_picks_tones_above_relative_threshold() {
        let spectrogram = single_frame_spectrogram(vec![100.0, 200.0, 300.0], vec![1.0, 0.05, 0.9]);
        let bins = vec![0, 1, 2];
        let bits = threshold_bits(&spectrogram, &bins, 0, 0.2);
        assert_eq!(bits, vec![1, 0, 1]);
    }

    #[test]
    fn sample_symbols_reads_all_roles_at_each_edge() {
        let plan = FrequencyPlan::example();
        let mut all_freqs = plan.clock.to_vec();
        all_freqs.extend(&plan.header);
        all_freqs.extend(&plan.content);
        all_freqs.extend(&plan.footer);
        all_freqs.extend(&plan.modes);
        let powers = vec![1.0; all_freqs.len()];
        let spectrogram = single_frame_spectrogram(all_freqs, powers);

        let samples = sample_symbols(&spectrogram, &plan, &[0.0], 0.2);
        assert_eq!(samples.len(), 1);
        assert_eq!(samples[0].header.len(), plan.header.len());
        assert_eq!(samples[0].content.len(), plan.content.len());
        assert_eq!(samples[0].footer.len(), plan.footer.len());
        assert_eq!(samples[0].modes.len(), plan.modes.len());
        assert!(samples[0].modes.iter().all(|&b| b == 1));
    }
}
