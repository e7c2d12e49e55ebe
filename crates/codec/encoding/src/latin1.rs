//! latin1/binary codec: one byte per UTF-16 code unit
//!
//! The ascii encoding routes here too. Encode keeps the low byte of each
//! code unit (the high bit is preserved, never masked off); decode maps
//! every byte straight to U+0000..=U+00FF.

/// Encode text one byte per code unit, keeping the low 8 bits
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn encode(text: &str) -> Vec<u8> {
    text.encode_utf16().map(|unit| (unit & 0xFF) as u8).collect()
}

/// Decode bytes 1:1 into U+0000..=U+00FF
#[must_use]
pub fn decode(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| char::from(b)).collect()
}

/// Encoded byte length of `text`: one byte per UTF-16 code unit
#[must_use]
pub fn byte_length(text: &str) -> usize {
    text.encode_utf16().count()
}
