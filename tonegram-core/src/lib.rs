//! Tonegram core library
//!
//! A Rust-native implementation of an MFSK audio transmission codec: a
//! structured message (header/content/footer) is rendered as a PCM WAV
//! waveform using parallel frequency-bin tones, a co-transmitted clock
//! carrier, and per-section mode markers, and can be decoded back from that
//! waveform via spectrogram analysis and clock-edge recovery.

pub mod config;
pub mod decoder;
pub mod encoder;
pub mod errors;
pub mod framing;
pub mod logging;
pub mod message;
pub mod signal_processing;
pub mod utils;
pub mod wav;

pub use config::{DecoderOptions, EncoderOptions, FrequencyPlan};
pub use decoder::{decode, DecodeOutcome};
pub use encoder::{encode, encode_to_wav, EncodedWaveform};
pub use errors::{DecodeWarning, EncodeError, PlanError, TonegramError, WavError};
pub use message::{Json, Message, MessageEnvelope};
