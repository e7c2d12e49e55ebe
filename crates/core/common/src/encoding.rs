//! Encoding registry with case-insensitive alias resolution

use crate::error::BufferError;
use std::fmt;
use std::str::FromStr;

/// Supported string encodings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Encoding {
    /// Variable-length UTF-8
    Utf8,
    /// Little-endian 16-bit code units
    Utf16Le,
    /// Direct 1:1 byte to code point mapping over 0-255
    Latin1,
    /// Byte-preserving single-byte text; decode never masks the high bit
    Ascii,
    /// Hexadecimal digit pairs
    Hex,
    /// Standard base64 alphabet, padded on encode
    Base64,
    /// URL-safe base64 alphabet, unpadded on encode
    Base64Url,
}

impl Encoding {
    /// Resolve an encoding name, case-insensitively, honoring the
    /// documented aliases: `utf-8`, `utf-16le`, `ucs2`, `ucs-2`, `binary`.
    ///
    /// Names are switched on length first so a miss costs at most one
    /// comparison per candidate of that length.
    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        match name.len() {
            3 => name.eq_ignore_ascii_case("hex").then_some(Self::Hex),
            4 => {
                if name.eq_ignore_ascii_case("utf8") {
                    Some(Self::Utf8)
                } else if name.eq_ignore_ascii_case("ucs2") {
                    Some(Self::Utf16Le)
                } else {
                    None
                }
            }
            5 => {
                if name.eq_ignore_ascii_case("utf-8") {
                    Some(Self::Utf8)
                } else if name.eq_ignore_ascii_case("ascii") {
                    Some(Self::Ascii)
                } else if name.eq_ignore_ascii_case("ucs-2") {
                    Some(Self::Utf16Le)
                } else {
                    None
                }
            }
            6 => {
                if name.eq_ignore_ascii_case("latin1") || name.eq_ignore_ascii_case("binary") {
                    Some(Self::Latin1)
                } else if name.eq_ignore_ascii_case("base64") {
                    Some(Self::Base64)
                } else {
                    None
                }
            }
            7 => name.eq_ignore_ascii_case("utf16le").then_some(Self::Utf16Le),
            8 => name
                .eq_ignore_ascii_case("utf-16le")
                .then_some(Self::Utf16Le),
            9 => name
                .eq_ignore_ascii_case("base64url")
                .then_some(Self::Base64Url),
            _ => None,
        }
    }

    /// True if `name` resolves to a supported encoding
    #[must_use]
    pub fn is_encoding(name: &str) -> bool {
        Self::parse(name).is_some()
    }

    /// Canonical name of the encoding
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Utf8 => "utf8",
            Self::Utf16Le => "utf16le",
            Self::Latin1 => "latin1",
            Self::Ascii => "ascii",
            Self::Hex => "hex",
            Self::Base64 => "base64",
            Self::Base64Url => "base64url",
        }
    }
}

impl FromStr for Encoding {
    type Err = BufferError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| BufferError::UnknownEncoding(s.to_string()))
    }
}

impl fmt::Display for Encoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("utf8", Encoding::Utf8)]
    #[case("utf-8", Encoding::Utf8)]
    #[case("UTF-8", Encoding::Utf8)] // Case-insensitive
    #[case("utf16le", Encoding::Utf16Le)]
    #[case("utf-16le", Encoding::Utf16Le)]
    #[case("ucs2", Encoding::Utf16Le)]
    #[case("UCS-2", Encoding::Utf16Le)]
    #[case("latin1", Encoding::Latin1)]
    #[case("binary", Encoding::Latin1)] // Alias of latin1
    #[case("ascii", Encoding::Ascii)]
    #[case("hex", Encoding::Hex)]
    #[case("base64", Encoding::Base64)]
    #[case("base64url", Encoding::Base64Url)]
    #[case("Base64URL", Encoding::Base64Url)]
    fn test_parse_aliases(#[case] name: &str, #[case] expected: Encoding) {
        assert_eq!(Encoding::parse(name), Some(expected));
    }

    #[rstest]
    #[case("utf16")] // No bare utf16
    #[case("utf-16")]
    #[case("base-64")]
    #[case("")]
    #[case("latin-1")]
    fn test_parse_rejects(#[case] name: &str) {
        assert_eq!(Encoding::parse(name), None);
        assert!(!Encoding::is_encoding(name));
    }

    #[test]
    fn test_from_str_error() {
        let err = "wat".parse::<Encoding>().unwrap_err();
        assert_eq!(err, BufferError::UnknownEncoding("wat".to_string()));
    }

    #[test]
    fn test_display_roundtrip() {
        for enc in [
            Encoding::Utf8,
            Encoding::Utf16Le,
            Encoding::Latin1,
            Encoding::Ascii,
            Encoding::Hex,
            Encoding::Base64,
            Encoding::Base64Url,
        ] {
            assert_eq!(Encoding::parse(enc.name()), Some(enc));
        }
    }
}
