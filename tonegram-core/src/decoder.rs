//! Decoder pipeline: waveform → spectrogram → clock recovery → deframed message.

use crate::config::{DecoderOptions, FrequencyPlan};
use crate::errors::DecodeWarning;
use crate::message::{Json, Message};
use crate::signal_processing::spectrogram::compute_spectrogram;
use crate::signal_processing::{detect_edges, sample_symbols, SampledSymbol};
use crate::utils::{bits_to_string_lossy, pack_bits};

/// Output of [`decode`]: a best-effort message plus any non-fatal warnings
/// encountered while interpreting it.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodeOutcome {
    pub message: Message,
    pub warnings: Vec<DecodeWarning>,
}

/// Decode `samples` (mono, at `sample_rate`) against `plan`.
///
/// Structural failures do not occur here by construction: an empty or
/// noise-only input simply yields an empty message with a `NoEdges`
/// warning, never a panic.
pub fn decode(samples: &[f64], sample_rate: u32, plan: &FrequencyPlan, options: &DecoderOptions) -> DecodeOutcome {
    let spectrogram = compute_spectrogram(samples, sample_rate, options.fft_size, options.hop_size);
    let edge_times = detect_edges(&spectrogram, plan.clock, options);

    if edge_times.len() < 2 {
        return DecodeOutcome {
            message: Message::new(Json::empty_object(), Vec::new(), String::new()),
            warnings: vec![DecodeWarning::NoEdges],
        };
    }

    let sampled = sample_symbols(&spectrogram, plan, &edge_times, options.bit_threshold_ratio);
    deframe(&sampled)
}

/// Gate sampled symbols by their mode bits into header/content/footer
/// bitstreams, then decode each bitstream into its final domain.
///
/// Because transitions are visited in ascending time and a role's bits are
/// only appended while its mode bit is set, the three streams reconstruct
/// in original transmission order even though they're interleaved in time.
fn deframe(sampled: &[SampledSymbol]) -> DecodeOutcome {
    let mut header_bits = Vec::new();
    let mut content_bits = Vec::new();
    let mut footer_bits = Vec::new();

    for symbol in sampled {
        if symbol.modes.first().copied() == Some(1) {
            header_bits.extend_from_slice(&symbol.header);
        }
        if symbol.modes.get(1).copied() == Some(1) {
            content_bits.extend_from_slice(&symbol.content);
        }
        if symbol.modes.get(2).copied() == Some(1) {
            footer_bits.extend_from_slice(&symbol.footer);
        }
    }

    let mut warnings = Vec::new();

    let (_, header_text) = bits_to_string_lossy(&header_bits);
    let header = match Json::parse(&header_text) {
        Ok(value) => value,
        Err(err) => {
            warnings.push(DecodeWarning::HeaderJsonParse {
                detail: err.to_string(),
            });
            Json::empty_object()
        }
    };

    let content = pack_bits(&content_bits);

    let footer_bytes = pack_bits(&footer_bits);
    let footer = match String::from_utf8(footer_bytes) {
        Ok(text) => text,
        Err(err) => {
            warnings.push(DecodeWarning::FooterUtf8);
            String::from_utf8_lossy(err.as_bytes()).into_owned()
        }
    };

    DecodeOutcome {
        message: Message::new(header, content, footer),
        warnings,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EncoderOptions;
    use crate::encoder::encode;

    #[test]
    fn decode_of_silence_reports_no_edges() {
        let plan = FrequencyPlan::example();
        let options = DecoderOptions::default();
        let silence = vec![0.0; 8192];
        let outcome = decode(&silence, 44_100, &plan, &options);
        assert_eq!(outcome.warnings, vec![DecodeWarning::NoEdges]);
        assert_eq!(outcome.message.content, Vec::<u8>::new());
    }

    #[test]
    fn round_trip_recovers_short_message() {
        let plan = FrequencyPlan::example();
        let enc_options = EncoderOptions::default();
        let message = Message::new(Json::empty_object(), b"Hi".to_vec(), "end");
        let waveform = encode(&message, &plan, &enc_options).unwrap();

        let dec_options = DecoderOptions::default();
        let outcome = decode(
            &waveform.samples,
            waveform.sample_rate,
            &plan,
            &dec_options,
        );

        assert_eq!(outcome.message.header, Json::empty_object());
        assert_eq!(outcome.message.content, b"Hi".to_vec());
        assert_eq!(outcome.message.footer, "end");
    }

    #[test]
    fn deframe_gates_bits_by_mode_activation() {
        let sampled = vec![
            SampledSymbol {
                time: 0.0,
                header: vec![1, 0, 1],
                content: vec![1, 1, 1, 1, 1, 1, 1, 1],
                footer: vec![0, 0, 0],
                modes: vec![1, 0, 0],
            },
            SampledSymbol {
                time: 0.1,
                header: vec![0, 0, 0],
                content: vec![0, 1, 0, 0, 0, 0, 0, 1],
                footer: vec![0, 0, 0],
                modes: vec![0, 1, 0],
            },
        ];
        let outcome = deframe(&sampled);
        assert_eq!(outcome.message.content, vec![0b0100_0001]);
    }
}
