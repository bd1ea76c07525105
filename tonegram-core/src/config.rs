//! Frequency plan and codec configuration types.

use serde::{Deserialize, Serialize};

use crate::errors::PlanError;

/// Default FFT window used by the spectrogram front-end; plan validation
/// checks tone separation against the bin width this implies.
pub const DEFAULT_FFT_SIZE: usize = 2048;

/// Declarative map from transmission role to the frequencies that carry it.
///
/// Consumed symmetrically by the encoder and decoder: both sides must agree
/// on the same plan for a transmission to round-trip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrequencyPlan {
    /// Exactly two tones: `[f_clk0, f_clk1]`.
    pub clock: [f64; 2],
    /// One tone per header bit; list length is the header symbol width.
    pub header: Vec<f64>,
    /// One tone per content bit; list length is the content symbol width.
    pub content: Vec<f64>,
    /// One tone per footer bit; list length is the footer symbol width.
    pub footer: Vec<f64>,
    /// Exactly three tones `[m_h, m_c, m_f]` marking header/content/footer.
    pub modes: [f64; 3],
}

impl FrequencyPlan {
    /// A worked-example plan: header=3 tones, content=8 tones, footer=3
    /// tones, clock=[1000,1200], modes=[2000,2200,2400].
    pub fn example() -> Self {
        Self {
            clock: [1000.0, 1200.0],
            header: vec![300.0, 400.0, 500.0],
            content: vec![
                600.0, 700.0, 800.0, 900.0, 1400.0, 1500.0, 1600.0, 1700.0,
            ],
            footer: vec![1800.0, 1900.0, 2100.0],
            modes: [2000.0, 2200.0, 2400.0],
        }
    }

    /// All tones in the plan, tagged with the role name they belong to.
    fn tones_by_role(&self) -> [(&'static str, &[f64]); 5] {
        [
            ("clock", &self.clock),
            ("header", &self.header),
            ("content", &self.content),
            ("footer", &self.footer),
            ("modes", &self.modes),
        ]
    }

    /// Validate structural invariants and Nyquist compliance at `sample_rate`.
    ///
    /// Does not check pairwise tone separation; call [`Self::validate_separation`]
    /// for that (it needs an FFT size to define the bin width).
    pub fn validate(&self, sample_rate: u32) -> std::result::Result<(), PlanError> {
        if self.clock[0] == self.clock[1] {
            return Err(PlanError::TonesTooClose {
                a: self.clock[0],
                b: self.clock[1],
                separation: 0.0,
                min_separation: 0.0,
            });
        }
        for role in ["header", "content", "footer"] {
            let tones = match role {
                "header" => &self.header,
                "content" => &self.content,
                _ => &self.footer,
            };
            if tones.is_empty() {
                return Err(PlanError::EmptyRole { role });
            }
        }

        let nyquist = sample_rate as f64 / 2.0;
        for (role, tones) in self.tones_by_role() {
            for &hz in tones {
                if hz <= 0.0 {
                    return Err(PlanError::NonPositiveTone { role, hz });
                }
                if hz > nyquist {
                    return Err(PlanError::ExceedsNyquist {
                        role,
                        hz,
                        nyquist,
                        sample_rate,
                    });
                }
            }
        }

        Ok(())
    }

    /// Validate that every pair of tones in the plan is separated by more
    /// than the spectrogram bin width implied by `fft_size` at `sample_rate`.
    pub fn validate_separation(
        &self,
        sample_rate: u32,
        fft_size: usize,
    ) -> std::result::Result<(), PlanError> {
        let bin_width = sample_rate as f64 / fft_size as f64;
        let mut all_tones: Vec<f64> = self
            .tones_by_role()
            .iter()
            .flat_map(|(_, tones)| tones.iter().copied())
            .collect();
        all_tones.sort_by(|a, b| a.partial_cmp(b).unwrap());
        for window in all_tones.windows(2) {
            let separation = window[1] - window[0];
            if separation <= bin_width {
                return Err(PlanError::TonesTooClose {
                    a: window[0],
                    b: window[1],
                    separation,
                    min_separation: bin_width,
                });
            }
        }
        Ok(())
    }
}

impl Default for FrequencyPlan {
    fn default() -> Self {
        Self::example()
    }
}

/// Options controlling the encoder pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EncoderOptions {
    pub sample_rate: u32,
    /// Clock cycles per second; the symbol period for every section equals
    /// `1 / clock_speed`.
    pub clock_speed: f64,
    /// Linear amplitude for data/header/footer tones, before normalization.
    pub data_amplitude: f64,
    /// Linear amplitude for the clock carrier, before normalization.
    pub clock_amplitude: f64,
    /// Linear amplitude for the mode carriers, before normalization.
    pub mode_amplitude: f64,
    /// Fraction of full scale left as headroom after normalization (0.1 = 90% full scale).
    pub normalization_headroom: f64,
}

impl Default for EncoderOptions {
    fn default() -> Self {
        Self {
            sample_rate: 44_100,
            clock_speed: 5.0,
            data_amplitude: 0.5,
            clock_amplitude: 0.2,
            mode_amplitude: 0.2,
            normalization_headroom: 0.1,
        }
    }
}

/// Options controlling the decoder pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecoderOptions {
    /// Expected clock-edge rate in transitions/second; nominally
    /// `2 * clock_speed` used at encode time.
    pub data_rate: f64,
    /// STFT window length in samples.
    pub fft_size: usize,
    /// STFT hop length in samples (`fft_size - noverlap`).
    pub hop_size: usize,
    /// Minimum peak height for clock-edge detection, on the normalized [0,1] gradient.
    pub edge_height_threshold: f64,
    /// Minimum spacing between detected edges, in frames. `None` derives a
    /// default strictly between one and two inter-transition frame counts,
    /// so the two clock transitions within a data symbol collapse into a
    /// single accepted edge while the next symbol's edge still gets through.
    pub min_edge_distance_frames: Option<usize>,
    /// Relative-to-max threshold used to decide each bit within a symbol column.
    pub bit_threshold_ratio: f64,
}

impl Default for DecoderOptions {
    fn default() -> Self {
        Self {
            data_rate: 10.0,
            fft_size: DEFAULT_FFT_SIZE,
            hop_size: DEFAULT_FFT_SIZE - 1500,
            edge_height_threshold: 0.25,
            min_edge_distance_frames: None,
            bit_threshold_ratio: 0.2,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn example_plan_is_valid_at_default_rate() {
        let plan = FrequencyPlan::example();
        plan.validate(44_100).unwrap();
        plan.validate_separation(44_100, DEFAULT_FFT_SIZE).unwrap();
    }

    #[test]
    fn empty_header_is_rejected() {
        let mut plan = FrequencyPlan::example();
        plan.header.clear();
        assert!(matches!(
            plan.validate(44_100),
            Err(PlanError::EmptyRole { role: "header" })
        ));
    }

    #[test]
    fn non_positive_tone_is_rejected() {
        let mut plan = FrequencyPlan::example();
        plan.content[0] = 0.0;
        assert!(matches!(
            plan.validate(44_100),
            Err(PlanError::NonPositiveTone { role: "content", .. })
        ));
    }

    #[test]
    fn tone_above_nyquist_is_rejected() {
        let mut plan = FrequencyPlan::example();
        plan.footer[0] = 30_000.0;
        assert!(matches!(
            plan.validate(44_100),
            Err(PlanError::ExceedsNyquist { role: "footer", .. })
        ));
    }

    #[test]
    fn duplicate_clock_tones_are_rejected() {
        let mut plan = FrequencyPlan::example();
        plan.clock = [1000.0, 1000.0];
        assert!(matches!(
            plan.validate(44_100),
            Err(PlanError::TonesTooClose { .. })
        ));
    }

    #[test]
    fn close_tones_fail_separation_check() {
        let mut plan = FrequencyPlan::example();
        plan.header[0] = plan.content[0] + 1.0;
        assert!(plan
            .validate_separation(44_100, DEFAULT_FFT_SIZE)
            .is_err());
    }
}
