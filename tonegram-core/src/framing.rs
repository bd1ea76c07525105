//! Conversion between a [`Message`] and the per-section bitstreams the
//! symbol synthesizer consumes.

use crate::config::FrequencyPlan;
use crate::message::Message;
use crate::utils::{bytes_to_bitstream, pad_bits, string_to_bitstream};

/// The three bitstreams carried by a transmission, each zero-padded on the
/// right to a multiple of its section's symbol width.
#[derive(Debug, Clone, PartialEq)]
pub struct FramedBits {
    pub header: Vec<u8>,
    pub content: Vec<u8>,
    pub footer: Vec<u8>,
}

impl FramedBits {
    /// Symbol count for each section once built; every section divides
    /// evenly into its plan's symbol width.
    pub fn symbol_counts(&self, plan: &FrequencyPlan) -> (usize, usize, usize) {
        (
            self.header.len() / plan.header.len(),
            self.content.len() / plan.content.len(),
            self.footer.len() / plan.footer.len(),
        )
    }
}

/// Build the header/content/footer bitstreams from a message.
///
/// The header is serialized as canonical JSON text before bit expansion;
/// the content is used as raw bytes; the footer is UTF-8 text. Each
/// resulting bitstream is zero-padded to a multiple of its plan's symbol
/// width (one bit per tone in that role).
pub fn frame_message(message: &Message, plan: &FrequencyPlan) -> FramedBits {
    let header_bits = pad_bits(
        &string_to_bitstream(&message.header.to_canonical_string()),
        plan.header.len(),
    );
    let content_bits = pad_bits(&bytes_to_bitstream(&message.content), plan.content.len());
    let footer_bits = pad_bits(&string_to_bitstream(&message.footer), plan.footer.len());

    FramedBits {
        header: header_bits,
        content: content_bits,
        footer: footer_bits,
    }
}
