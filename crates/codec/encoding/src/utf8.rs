//! UTF-8 state machine: lossy decode and validation
//!
//! Both paths walk the same lead-byte table. The second byte of a
//! multi-byte sequence has a lead-dependent range so overlong forms,
//! encoded surrogate halves, and code points past U+10FFFF are rejected
//! in a single comparison; later bytes are plain continuations. Malformed
//! input decodes to one replacement character per maximal subpart.

const REPLACEMENT: char = char::REPLACEMENT_CHARACTER;

/// Sequence length implied by a lead byte, or 0 if the byte cannot lead
const fn sequence_len(lead: u8) -> usize {
    match lead {
        0x00..=0x7F => 1,
        0xC2..=0xDF => 2,
        0xE0..=0xEF => 3,
        0xF0..=0xF4 => 4,
        _ => 0,
    }
}

/// Valid range for the byte immediately after `lead`
///
/// 0xE0 and 0xF0 exclude overlong forms, 0xED excludes the surrogate
/// block, 0xF4 caps the code point at U+10FFFF.
const fn second_byte_range(lead: u8) -> (u8, u8) {
    match lead {
        0xE0 => (0xA0, 0xBF),
        0xED => (0x80, 0x9F),
        0xF0 => (0x90, 0xBF),
        0xF4 => (0x80, 0x8F),
        _ => (0x80, 0xBF),
    }
}

/// Decode bytes as UTF-8, substituting the replacement character for
/// each maximal malformed subpart
#[must_use]
pub fn decode_lossy(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        let lead = bytes[i];
        if lead < 0x80 {
            out.push(lead as char);
            i += 1;
            continue;
        }
        let width = sequence_len(lead);
        if width == 0 {
            out.push(REPLACEMENT);
            i += 1;
            continue;
        }
        let (lo, hi) = second_byte_range(lead);
        let mut cp = u32::from(lead & (0xFF >> (width + 1)));
        let mut consumed = 1;
        while consumed < width {
            match bytes.get(i + consumed).copied() {
                Some(next)
                    if (consumed == 1 && (lo..=hi).contains(&next))
                        || (consumed > 1 && (0x80..=0xBF).contains(&next)) =>
                {
                    cp = (cp << 6) | u32::from(next & 0x3F);
                    consumed += 1;
                }
                _ => break,
            }
        }
        if consumed == width {
            // The range table admits only valid scalar values
            out.push(char::from_u32(cp).unwrap_or(REPLACEMENT));
        } else {
            out.push(REPLACEMENT);
        }
        i += consumed;
    }
    out
}

/// True if `bytes` is well-formed UTF-8
///
/// Agrees exactly with [`decode_lossy`]: returns `true` iff decoding
/// would produce no replacement character for malformed input.
#[must_use]
pub fn validate(bytes: &[u8]) -> bool {
    let mut i = 0;
    while i < bytes.len() {
        let lead = bytes[i];
        if lead < 0x80 {
            i += 1;
            continue;
        }
        let width = sequence_len(lead);
        if width == 0 || i + width > bytes.len() {
            return false;
        }
        let (lo, hi) = second_byte_range(lead);
        if !(lo..=hi).contains(&bytes[i + 1]) {
            return false;
        }
        for &cont in &bytes[i + 2..i + width] {
            if !(0x80..=0xBF).contains(&cont) {
                return false;
            }
        }
        i += width;
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    #[case(b"hello", true)] // Plain ASCII
    #[case("héllo".as_bytes(), true)] // 2-byte sequence
    #[case("日本語".as_bytes(), true)] // 3-byte sequences
    #[case(&[0xF0, 0x9F, 0x98, 0x80], true)] // 4-byte emoji
    #[case(&[0xF4, 0x8F, 0xBF, 0xBF], true)] // U+10FFFF, the ceiling
    #[case(&[], true)] // Empty input is valid
    #[case(&[0xED, 0xA0, 0x80], false)] // Encoded high surrogate
    #[case(&[0xED, 0xBF, 0xBF], false)] // Encoded low surrogate
    #[case(&[0xC0, 0x80], false)] // Overlong NUL
    #[case(&[0xC1, 0xBF], false)] // Overlong 2-byte
    #[case(&[0xE0, 0x80, 0x80], false)] // Overlong 3-byte
    #[case(&[0xF0, 0x8F, 0xBF, 0xBF], false)] // Overlong 4-byte
    #[case(&[0xF4, 0x90, 0x80, 0x80], false)] // Past U+10FFFF
    #[case(&[0xF5, 0x80, 0x80, 0x80], false)] // Invalid lead
    #[case(&[0xE2, 0x82], false)] // Truncated sequence
    #[case(&[0x80], false)] // Bare continuation
    fn test_validate(#[case] bytes: &[u8], #[case] expected: bool) {
        assert_eq!(validate(bytes), expected);
    }

    #[test]
    fn test_decode_valid_passthrough() {
        let text = "héllo 日本語 😀";
        assert_eq!(decode_lossy(text.as_bytes()), text);
    }

    #[rstest]
    #[case(&[0xED, 0xA0, 0x80], "\u{FFFD}\u{FFFD}\u{FFFD}")] // Surrogate: lead consumes only itself
    #[case(&[0x61, 0xC2], "a\u{FFFD}")] // Truncated at end of input
    #[case(&[0xE2, 0x82, 0x61], "\u{FFFD}a")] // Maximal subpart, then resume
    #[case(&[0xF0, 0x9F, 0x98], "\u{FFFD}")] // Truncated 4-byte tail
    #[case(&[0x80, 0x61], "\u{FFFD}a")] // Bare continuation
    fn test_decode_replacement(#[case] bytes: &[u8], #[case] expected: &str) {
        assert_eq!(decode_lossy(bytes), expected);
    }

    #[test]
    fn test_validate_agrees_with_decode() {
        let samples: &[&[u8]] = &[
            b"plain",
            &[0xED, 0xA0, 0x80],
            &[0xF0, 0x9F, 0x98, 0x80],
            &[0xC2],
            &[0xE0, 0xA0, 0x80],
            &[0xFF, 0xFE],
        ];
        for bytes in samples {
            let clean = !decode_lossy(bytes).contains(REPLACEMENT);
            assert_eq!(validate(bytes), clean, "disagreement on {bytes:?}");
        }
    }
}
