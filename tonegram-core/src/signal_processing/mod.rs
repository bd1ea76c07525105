//! Signal processing stages shared by the encoder and decoder.
//!
//! - [`synth`] turns bitstreams and carrier lists into PCM samples.
//! - [`spectrogram`] turns PCM samples back into a time-frequency power map.
//! - [`clock_recovery`] finds symbol-boundary instants in the clock carrier.
//! - [`sampler`] reads per-role bit decisions out of the spectrogram at those instants.

pub mod clock_recovery;
pub mod sampler;
pub mod spectrogram;
pub mod synth;

pub use clock_recovery::detect_edges;
pub use sampler::{sample_symbols, SampledSymbol};
pub use spectrogram::Spectrogram;
pub use synth::{overlay_mode, synthesize_clock, synthesize_symbols};
