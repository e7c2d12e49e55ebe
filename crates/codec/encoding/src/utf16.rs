//! UTF-16LE codec
//!
//! Decoding an odd-length input ignores the trailing byte; unpaired
//! surrogates decode to the replacement character. Both rules are
//! deterministic and covered by tests.

/// Encode text as little-endian 16-bit code units
///
/// Code points above the Basic Multilingual Plane emit a surrogate pair.
#[must_use]
pub fn encode(text: &str) -> Vec<u8> {
    let mut out = Vec::with_capacity(text.len() * 2);
    for unit in text.encode_utf16() {
        out.extend_from_slice(&unit.to_le_bytes());
    }
    out
}

/// Decode little-endian 16-bit code units
#[must_use]
pub fn decode(bytes: &[u8]) -> String {
    let units = bytes
        .chunks_exact(2)
        .map(|pair| u16::from_le_bytes([pair[0], pair[1]]));
    char::decode_utf16(units)
        .map(|unit| unit.unwrap_or(char::REPLACEMENT_CHARACTER))
        .collect()
}

/// Encoded byte length of `text`: two bytes per UTF-16 code unit
#[must_use]
pub fn byte_length(text: &str) -> usize {
    text.encode_utf16().count() * 2
}
