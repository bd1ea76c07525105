//! Tonegram error types with granular categories

use thiserror::Error;

/// Top-level error type for all tonegram operations
#[derive(Debug, Error)]
pub enum TonegramError {
    #[error("Plan error: {0}")]
    Plan(#[from] PlanError),

    #[error("Encode error: {0}")]
    Encode(#[from] EncodeError),

    #[error("WAV I/O error: {0}")]
    Wav(#[from] WavError),
}

/// Frequency plan validation errors
#[derive(Debug, Error)]
pub enum PlanError {
    #[error("role '{role}' must list at least one tone")]
    EmptyRole { role: &'static str },

    #[error("role '{role}' tone {hz} Hz is not positive")]
    NonPositiveTone { role: &'static str, hz: f64 },

    #[error("role '{role}' tone {hz} Hz exceeds Nyquist frequency {nyquist} Hz at sample rate {sample_rate} Hz")]
    ExceedsNyquist {
        role: &'static str,
        hz: f64,
        nyquist: f64,
        sample_rate: u32,
    },

    #[error("tones {a} Hz and {b} Hz are separated by only {separation} Hz, need more than {min_separation} Hz (spectrogram bin width)")]
    TonesTooClose {
        a: f64,
        b: f64,
        separation: f64,
        min_separation: f64,
    },
}

/// Encoding pipeline errors
#[derive(Debug, Error)]
pub enum EncodeError {
    #[error("invalid frequency plan: {0}")]
    InvalidPlan(#[from] PlanError),

    #[error("encoded waveform would be {sample_count} samples, exceeding the WAV limit of {max}")]
    Oversized { sample_count: usize, max: usize },
}

/// WAV container read/write errors
#[derive(Debug, Error)]
pub enum WavError {
    #[error("failed to read WAV file: {0}")]
    Read(String),

    #[error("failed to write WAV file: {0}")]
    Write(String),

    #[error("unsupported WAV format: expected 16-bit mono PCM, got {channels} channel(s) at {bits_per_sample} bits")]
    UnsupportedFormat { channels: u16, bits_per_sample: u16 },
}

/// Non-fatal conditions surfaced by the decoder.
///
/// These never abort a decode; they degrade the corresponding field of the
/// recovered message and are returned alongside it so a caller can log them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodeWarning {
    /// Header bytes did not parse as JSON; an empty object was substituted.
    HeaderJsonParse { detail: String },
    /// Footer bytes were not valid UTF-8; the Unicode replacement character
    /// was substituted for invalid sequences.
    FooterUtf8,
    /// Clock recovery found fewer than two transitions; the decoded message
    /// is empty.
    NoEdges,
}

impl std::fmt::Display for DecodeWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DecodeWarning::HeaderJsonParse { detail } => {
                write!(f, "header did not parse as JSON: {detail}")
            }
            DecodeWarning::FooterUtf8 => write!(f, "footer contained invalid UTF-8"),
            DecodeWarning::NoEdges => write!(f, "clock recovery found no transitions"),
        }
    }
}

/// Result type alias for tonegram operations
pub type Result<T> = std::result::Result<T, TonegramError>;
