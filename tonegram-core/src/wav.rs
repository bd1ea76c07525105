//! Canonical 16-bit PCM mono WAV read/write.

use std::path::Path;

use hound::{SampleFormat, WavSpec, WavWriter};

use crate::errors::WavError;

/// Read a WAV file, returning its samples as `f64` in `[-1.0, 1.0]` along
/// with its sample rate. Rejects anything other than 16-bit mono PCM.
pub fn read_wav(path: impl AsRef<Path>) -> Result<(Vec<f64>, u32), WavError> {
    let mut reader =
        hound::WavReader::open(path.as_ref()).map_err(|e| WavError::Read(e.to_string()))?;
    let spec = reader.spec();

    if spec.channels != 1 || spec.bits_per_sample != 16 || spec.sample_format != SampleFormat::Int
    {
        return Err(WavError::UnsupportedFormat {
            channels: spec.channels,
            bits_per_sample: spec.bits_per_sample,
        });
    }

    let samples = reader
        .samples::<i16>()
        .map(|s| s.map(|v| v as f64 / i16::MAX as f64))
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| WavError::Read(e.to_string()))?;

    Ok((samples, spec.sample_rate))
}

/// Write `samples` (expected in `[-1.0, 1.0]`) as 16-bit mono PCM at
/// `sample_rate`. Values are clamped to the representable range rather than
/// wrapped, since upstream normalization should already keep them in range.
pub fn write_wav(
    path: impl AsRef<Path>,
    samples: &[f64],
    sample_rate: u32,
) -> Result<(), WavError> {
    let spec = WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    };

    let mut writer =
        WavWriter::create(path.as_ref(), spec).map_err(|e| WavError::Write(e.to_string()))?;

    for &sample in samples {
        let clamped = sample.clamp(-1.0, 1.0);
        let quantized = (clamped * i16::MAX as f64).round() as i16;
        writer
            .write_sample(quantized)
            .map_err(|e| WavError::Write(e.to_string()))?;
    }

    writer.finalize().map_err(|e| WavError::Write(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    #[test]
    fn write_then_read_roundtrips_within_one_lsb() {
        let dir = std::env::temp_dir();
        let path = dir.join(format!(
            "tonegram-wav-roundtrip-{}.wav",
            std::process::id()
        ));

        let samples: Vec<f64> = (0..4410)
            .map(|n| (2.0 * PI * 440.0 * n as f64 / 44_100.0).sin() * 0.5)
            .collect();

        write_wav(&path, &samples, 44_100).unwrap();
        let (read_back, sample_rate) = read_wav(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(sample_rate, 44_100);
        assert_eq!(read_back.len(), samples.len());
        for (original, recovered) in samples.iter().zip(read_back.iter()) {
            assert!((original - recovered).abs() < 1.0 / i16::MAX as f64 * 2.0);
        }
    }

    #[test]
    fn read_rejects_non_mono_input() {
        let dir = std::env::temp_dir();
        let path = dir.join(format!("tonegram-wav-stereo-{}.wav", std::process::id()));
        let spec = WavSpec {
            channels: 2,
            sample_rate: 44_100,
            bits_per_sample: 16,
            sample_format: SampleFormat::Int,
        };
        let mut writer = WavWriter::create(&path, spec).unwrap();
        writer.write_sample(0i16).unwrap();
        writer.write_sample(0i16).unwrap();
        writer.finalize().unwrap();

        let result = read_wav(&path);
        std::fs::remove_file(&path).ok();
        assert!(matches!(result, Err(WavError::UnsupportedFormat { channels: 2, .. })));
    }
}
