//! Encoder pipeline: message → framed bitstreams → MFSK waveform.

use std::path::Path;

use crate::config::{EncoderOptions, FrequencyPlan, DEFAULT_FFT_SIZE};
use crate::errors::{EncodeError, TonegramError};
use crate::framing::frame_message;
use crate::message::Message;
use crate::signal_processing::{overlay_mode, synthesize_clock, synthesize_symbols};
use crate::wav::write_wav;

/// WAV sample-count ceiling (`2^31 - 1`), matching the RIFF chunk-size limit.
const MAX_SAMPLE_COUNT: usize = i32::MAX as usize;

/// A fully rendered waveform ready to be written to a WAV container.
#[derive(Debug, Clone, PartialEq)]
pub struct EncodedWaveform {
    pub samples: Vec<f64>,
    pub sample_rate: u32,
}

/// Encode `message` against `plan` into a normalized waveform.
///
/// Frames the message, renders each section's MFSK symbols, overlays the
/// section's mode carrier, sums the concatenated sections with a clock
/// carrier of matching length, then peak-normalizes leaving
/// `options.normalization_headroom` of full scale unused.
pub fn encode(
    message: &Message,
    plan: &FrequencyPlan,
    options: &EncoderOptions,
) -> Result<EncodedWaveform, EncodeError> {
    plan.validate(options.sample_rate)?;
    plan.validate_separation(options.sample_rate, DEFAULT_FFT_SIZE)?;

    let framed = frame_message(message, plan);
    let symbol_period = 1.0 / options.clock_speed;

    let mut header_wave = synthesize_symbols(
        &framed.header,
        &plan.header,
        symbol_period,
        options.sample_rate,
        options.data_amplitude,
    );
    overlay_mode(
        &mut header_wave,
        plan.modes[0],
        options.sample_rate,
        options.mode_amplitude,
    );

    let mut content_wave = synthesize_symbols(
        &framed.content,
        &plan.content,
        symbol_period,
        options.sample_rate,
        options.data_amplitude,
    );
    overlay_mode(
        &mut content_wave,
        plan.modes[1],
        options.sample_rate,
        options.mode_amplitude,
    );

    let mut footer_wave = synthesize_symbols(
        &framed.footer,
        &plan.footer,
        symbol_period,
        options.sample_rate,
        options.data_amplitude,
    );
    overlay_mode(
        &mut footer_wave,
        plan.modes[2],
        options.sample_rate,
        options.mode_amplitude,
    );

    let mut data_wave = header_wave;
    data_wave.extend(content_wave);
    data_wave.extend(footer_wave);

    if data_wave.len() > MAX_SAMPLE_COUNT {
        return Err(EncodeError::Oversized {
            sample_count: data_wave.len(),
            max: MAX_SAMPLE_COUNT,
        });
    }

    let clock_wave = synthesize_clock(
        plan.clock,
        options.clock_speed,
        data_wave.len(),
        options.sample_rate,
        options.clock_amplitude,
    );

    for (sample, clock_sample) in data_wave.iter_mut().zip(clock_wave) {
        *sample += clock_sample;
    }

    normalize(&mut data_wave, options.normalization_headroom);

    Ok(EncodedWaveform {
        samples: data_wave,
        sample_rate: options.sample_rate,
    })
}

/// Encode `message` against `plan` and write the resulting waveform straight
/// to a WAV file at `path`, combining [`encode`] and [`crate::wav::write_wav`]
/// into the one call most callers actually want.
pub fn encode_to_wav(
    message: &Message,
    plan: &FrequencyPlan,
    options: &EncoderOptions,
    path: impl AsRef<Path>,
) -> Result<(), TonegramError> {
    let waveform = encode(message, plan, options)?;
    write_wav(path, &waveform.samples, waveform.sample_rate)?;
    Ok(())
}

/// Peak-normalize `samples` in place so the loudest sample sits at
/// `1.0 - headroom` of full scale. Silent input is left untouched.
fn normalize(samples: &mut [f64], headroom: f64) {
    let peak = samples.iter().fold(0.0_f64, |acc, &s| acc.max(s.abs()));
    if peak <= f64::EPSILON {
        return;
    }
    let target = 1.0 - headroom;
    let gain = target / peak;
    for sample in samples.iter_mut() {
        *sample *= gain;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::Json;

    fn sample_message() -> Message {
        Message::new(Json::empty_object(), b"Hi".to_vec(), "end")
    }

    #[test]
    fn encode_produces_a_non_empty_waveform() {
        let plan = FrequencyPlan::example();
        let options = EncoderOptions::default();
        let waveform = encode(&sample_message(), &plan, &options).unwrap();
        assert!(!waveform.samples.is_empty());
        assert_eq!(waveform.sample_rate, options.sample_rate);
    }

    #[test]
    fn encode_normalizes_to_requested_headroom() {
        let plan = FrequencyPlan::example();
        let options = EncoderOptions::default();
        let waveform = encode(&sample_message(), &plan, &options).unwrap();
        let peak = waveform
            .samples
            .iter()
            .fold(0.0_f64, |acc, &s| acc.max(s.abs()));
        assert!((peak - (1.0 - options.normalization_headroom)).abs() < 1e-9);
    }

    #[test]
    fn encode_empty_message_still_carries_the_clock() {
        let plan = FrequencyPlan::example();
        let options = EncoderOptions::default();
        let message = Message::new(Json::empty_object(), Vec::new(), "");
        let waveform = encode(&message, &plan, &options).unwrap();
        assert!(waveform.samples.iter().any(|&s| s != 0.0));
    }

    #[test]
    fn encode_rejects_invalid_plan() {
        let mut plan = FrequencyPlan::example();
        plan.header.clear();
        let options = EncoderOptions::default();
        assert!(encode(&sample_message(), &plan, &options).is_err());
    }

    #[test]
    fn encode_rejects_tones_too_close_to_separate_at_the_default_fft_size() {
        let mut plan = FrequencyPlan::example();
        plan.header[0] = plan.content[0] + 1.0;
        let options = EncoderOptions::default();
        assert!(encode(&sample_message(), &plan, &options).is_err());
    }

    #[test]
    fn encode_sample_count_is_deterministic() {
        let plan = FrequencyPlan::example();
        let options = EncoderOptions::default();
        let a = encode(&sample_message(), &plan, &options).unwrap();
        let b = encode(&sample_message(), &plan, &options).unwrap();
        assert_eq!(a.samples.len(), b.samples.len());
    }

    #[test]
    fn encode_to_wav_writes_a_readable_file() {
        let plan = FrequencyPlan::example();
        let options = EncoderOptions::default();
        let dir = std::env::temp_dir();
        let path = dir.join(format!("tonegram-encode-to-wav-{}.wav", std::process::id()));

        encode_to_wav(&sample_message(), &plan, &options, &path).unwrap();
        let (samples, sample_rate) = crate::wav::read_wav(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(sample_rate, options.sample_rate);
        assert!(!samples.is_empty());
    }
}
