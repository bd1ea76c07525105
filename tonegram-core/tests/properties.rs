//! Property-based tests over the encode/decode round trip.

use proptest::prelude::*;

use tonegram_core::config::{DecoderOptions, EncoderOptions, FrequencyPlan};
use tonegram_core::decoder::decode;
use tonegram_core::encoder::encode;
use tonegram_core::message::{Json, Message};

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    /// Round-trip, clean channel: arbitrary short content survives encode/decode.
    #[test]
    fn round_trip_preserves_arbitrary_short_content(content in prop::collection::vec(any::<u8>(), 0..64)) {
        let plan = FrequencyPlan::example();
        let message = Message::new(Json::empty_object(), content.clone(), "done");
        let waveform = encode(&message, &plan, &EncoderOptions::default()).unwrap();
        let outcome = decode(
            &waveform.samples,
            waveform.sample_rate,
            &plan,
            &DecoderOptions::default(),
        );
        prop_assert_eq!(outcome.message.content, content);
    }

    /// Round-trip: arbitrary ASCII footer text survives encode/decode.
    #[test]
    fn round_trip_preserves_ascii_footer(footer in "[a-zA-Z0-9 ]{0,32}") {
        let plan = FrequencyPlan::example();
        let message = Message::new(Json::empty_object(), b"x".to_vec(), footer.clone());
        let waveform = encode(&message, &plan, &EncoderOptions::default()).unwrap();
        let outcome = decode(
            &waveform.samples,
            waveform.sample_rate,
            &plan,
            &DecoderOptions::default(),
        );
        prop_assert_eq!(outcome.message.footer, footer);
    }
}
