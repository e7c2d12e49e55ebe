//! base64 and base64url codec
//!
//! Encoding follows each variant's convention: standard base64 is
//! padded, base64url is not. Decoding is lenient — whitespace, stray or
//! missing padding, and bytes outside the variant's alphabet are
//! filtered out before the engine runs, and a trailing lone sextet is
//! dropped. The two alphabets are never interchanged: `+`/`/` are
//! foreign bytes to base64url and `-`/`_` are foreign to base64.

use base64::alphabet;
use base64::engine::general_purpose::{GeneralPurpose, GeneralPurposeConfig};
use base64::engine::{DecodePaddingMode, Engine};
use mempool::ScratchPool;

/// Alphabet variant
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Variant {
    /// `+` and `/`, padded output
    Standard,
    /// `-` and `_`, unpadded output
    UrlSafe,
}

const LENIENT: GeneralPurposeConfig = GeneralPurposeConfig::new()
    .with_encode_padding(false)
    .with_decode_padding_mode(DecodePaddingMode::Indifferent)
    .with_decode_allow_trailing_bits(true);

const STANDARD_LENIENT: GeneralPurpose = GeneralPurpose::new(&alphabet::STANDARD, LENIENT);
const URL_SAFE_LENIENT: GeneralPurpose = GeneralPurpose::new(&alphabet::URL_SAFE, LENIENT);

const fn in_alphabet(c: u8, variant: Variant) -> bool {
    if c.is_ascii_alphanumeric() {
        return true;
    }
    match variant {
        Variant::Standard => matches!(c, b'+' | b'/'),
        Variant::UrlSafe => matches!(c, b'-' | b'_'),
    }
}

/// Leniently parse base64 text into bytes
///
/// The input is filtered through a scratch buffer down to the variant's
/// alphabet, then decoded without padding requirements.
#[must_use]
pub fn encode(text: &str, variant: Variant, scratch: &ScratchPool) -> Vec<u8> {
    let mut filtered = scratch.checkout(text.len());
    filtered.extend(
        text.bytes()
            .filter(|&c| in_alphabet(c, variant)),
    );
    if filtered.len() % 4 == 1 {
        // A lone trailing sextet cannot form a byte
        filtered.pop();
    }
    let engine = match variant {
        Variant::Standard => &STANDARD_LENIENT,
        Variant::UrlSafe => &URL_SAFE_LENIENT,
    };
    engine.decode(filtered.as_slice()).unwrap_or_default()
}

/// Format bytes as base64 text in the variant's convention
#[must_use]
pub fn decode(bytes: &[u8], variant: Variant) -> String {
    match variant {
        Variant::Standard => base64::engine::general_purpose::STANDARD.encode(bytes),
        Variant::UrlSafe => base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(bytes),
    }
}

/// Decoded byte length implied by `text`, after trailing padding
#[must_use]
pub fn decoded_length(text: &str) -> usize {
    text.trim_end_matches('=').len() * 3 / 4
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn pool() -> ScratchPool {
        ScratchPool::new()
    }

    #[rstest]
    #[case("YWJj", b"abc".to_vec())] // Plain
    #[case("Y W J j", b"abc".to_vec())] // Embedded spaces ignored
    #[case("YW\tJj\n", b"abc".to_vec())] // Tabs and newlines ignored
    #[case("YWJjZA==", b"abcd".to_vec())] // Full padding
    #[case("YWJjZA", b"abcd".to_vec())] // Padding omitted
    #[case("YWJjZA=", b"abcd".to_vec())] // Partial padding
    #[case("YWJjZA===", b"abcd".to_vec())] // Excess padding
    #[case("", Vec::new())]
    fn test_lenient_parse(#[case] text: &str, #[case] expected: Vec<u8>) {
        assert_eq!(encode(text, Variant::Standard, &pool()), expected);
    }

    #[test]
    fn test_alphabets_not_interchanged() {
        // 0xFB 0xEF encodes as "++8" standard, "--8" url-safe
        let bytes = vec![0xFB, 0xEF];
        assert_eq!(decode(&bytes, Variant::Standard), "++8=");
        assert_eq!(decode(&bytes, Variant::UrlSafe), "--8");
        // Foreign alphabet bytes are filtered, not reinterpreted: only
        // the lone "8" survives and a lone sextet decodes to nothing
        assert_eq!(encode("--8", Variant::Standard, &pool()), Vec::<u8>::new());
        assert_eq!(encode("++8", Variant::UrlSafe, &pool()), Vec::<u8>::new());
        assert_eq!(encode("--8", Variant::UrlSafe, &pool()), bytes);
    }

    #[rstest]
    #[case(b"".to_vec(), "")]
    #[case(b"a".to_vec(), "YQ==")] // Two padding chars
    #[case(b"ab".to_vec(), "YWI=")] // One padding char
    #[case(b"abc".to_vec(), "YWJj")] // None
    fn test_padding_emission(#[case] bytes: Vec<u8>, #[case] expected: &str) {
        assert_eq!(decode(&bytes, Variant::Standard), expected);
    }

    #[test]
    fn test_lone_sextet_dropped() {
        assert_eq!(encode("YWJjZ", Variant::Standard, &pool()), b"abc".to_vec());
    }

    #[test]
    fn test_decoded_length() {
        assert_eq!(decoded_length("YWJj"), 3);
        assert_eq!(decoded_length("YQ=="), 1);
        assert_eq!(decoded_length("YWI="), 2);
    }
}
