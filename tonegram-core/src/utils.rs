//! Bitstream conversion helpers shared by framing, synthesis and sampling.

/// MSB-first bit expansion of a UTF-8 string, 8 bits per byte.
pub fn string_to_bitstream(text: &str) -> Vec<u8> {
    bytes_to_bitstream(text.as_bytes())
}

/// MSB-first bit expansion of raw bytes, 8 bits per byte.
pub fn bytes_to_bitstream(data: &[u8]) -> Vec<u8> {
    data.iter()
        .flat_map(|byte| (0..8).rev().map(move |bit| (byte >> bit) & 1))
        .collect()
}

/// Zero-pad `bits` on the right so its length is a multiple of `group_size`.
pub fn pad_bits(bits: &[u8], group_size: usize) -> Vec<u8> {
    assert!(group_size > 0, "group size must be positive");
    let mut padded = bits.to_vec();
    let remainder = padded.len() % group_size;
    if remainder != 0 {
        padded.extend(std::iter::repeat(0u8).take(group_size - remainder));
    }
    padded
}

/// Pack a bitstream (MSB-first, 8 bits/byte) into bytes. A trailing partial
/// byte is discarded, matching the reference decoder's framing contract.
pub fn pack_bits(bits: &[u8]) -> Vec<u8> {
    bits.chunks_exact(8)
        .map(|chunk| chunk.iter().fold(0u8, |acc, &b| (acc << 1) | (b & 1)))
        .collect()
}

/// Pack a bitstream into bytes and decode it as UTF-8, returning the bytes
/// alongside the lossy string on failure so callers can decide how to warn.
pub fn bits_to_string_lossy(bits: &[u8]) -> (Vec<u8>, String) {
    let bytes = pack_bits(bits);
    let text = String::from_utf8_lossy(&bytes).into_owned();
    (bytes, text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn string_bitstream_roundtrip() {
        let text = "tonegram";
        let bits = string_to_bitstream(text);
        assert_eq!(bits.len(), text.len() * 8);
        let packed = pack_bits(&bits);
        assert_eq!(String::from_utf8(packed).unwrap(), text);
    }

    #[test]
    fn pad_bits_rounds_up_to_group_size() {
        let bits = vec![1, 0, 1];
        let padded = pad_bits(&bits, 8);
        assert_eq!(padded.len(), 8);
        assert_eq!(&padded[..3], &[1, 0, 1]);
        assert!(padded[3..].iter().all(|&b| b == 0));
    }

    #[test]
    fn pad_bits_noop_when_already_aligned() {
        let bits = vec![1, 0, 1, 1, 0, 0, 1, 0];
        assert_eq!(pad_bits(&bits, 8), bits);
    }

    #[test]
    fn pack_bits_drops_trailing_partial_byte() {
        let mut bits = string_to_bitstream("A");
        bits.push(1);
        bits.push(0);
        let packed = pack_bits(&bits);
        assert_eq!(packed, b"A");
    }

    #[test]
    fn bits_to_string_lossy_substitutes_invalid_utf8() {
        let bits = bytes_to_bitstream(&[0xFF, 0xFE]);
        let (bytes, text) = bits_to_string_lossy(&bits);
        assert_eq!(bytes, vec![0xFF, 0xFE]);
        assert!(text.contains('\u{FFFD}'));
    }
}
