//! String codec layer for the ByteMill buffer engine
//!
//! One encode/decode pair per supported encoding, each with its own
//! leniency rules, plus the standalone UTF-8/ASCII validators. In this
//! layer `encode` always means text to bytes and `decode` bytes to
//! text, so the hex and base64 modules *parse* on encode and *format*
//! on decode.
//!
//! Decoders that need transient workspace borrow it from a process-wide
//! [`ScratchPool`]; this only affects throughput, never results.

use std::sync::OnceLock;

use common::Encoding;
use mempool::{ScratchPool, ScratchStats};

pub mod b64;
pub mod hex;
pub mod latin1;
pub mod utf8;
pub mod utf16;

static SCRATCH: OnceLock<ScratchPool> = OnceLock::new();

fn scratch() -> &'static ScratchPool {
    SCRATCH.get_or_init(ScratchPool::new)
}

/// Counter snapshot of the shared codec scratch pool
#[must_use]
pub fn scratch_stats() -> ScratchStats {
    scratch().stats()
}

/// Convert text to bytes under `encoding`
#[must_use]
pub fn encode(text: &str, encoding: Encoding) -> Vec<u8> {
    match encoding {
        Encoding::Utf8 => text.as_bytes().to_vec(),
        Encoding::Utf16Le => utf16::encode(text),
        Encoding::Latin1 | Encoding::Ascii => latin1::encode(text),
        Encoding::Hex => hex::encode(text),
        Encoding::Base64 => b64::encode(text, b64::Variant::Standard, scratch()),
        Encoding::Base64Url => b64::encode(text, b64::Variant::UrlSafe, scratch()),
    }
}

/// Convert bytes to text under `encoding`
#[must_use]
pub fn decode(bytes: &[u8], encoding: Encoding) -> String {
    match encoding {
        Encoding::Utf8 => utf8::decode_lossy(bytes),
        Encoding::Utf16Le => utf16::decode(bytes),
        Encoding::Latin1 | Encoding::Ascii => latin1::decode(bytes),
        Encoding::Hex => hex::decode(bytes),
        Encoding::Base64 => b64::decode(bytes, b64::Variant::Standard),
        Encoding::Base64Url => b64::decode(bytes, b64::Variant::UrlSafe),
    }
}

/// Byte length `text` would occupy when encoded under `encoding`
#[must_use]
pub fn byte_length(text: &str, encoding: Encoding) -> usize {
    match encoding {
        Encoding::Utf8 => text.len(),
        Encoding::Utf16Le => utf16::byte_length(text),
        Encoding::Latin1 | Encoding::Ascii => latin1::byte_length(text),
        Encoding::Hex => text.len() / 2,
        Encoding::Base64 | Encoding::Base64Url => b64::decoded_length(text),
    }
}

/// True if `bytes` is well-formed UTF-8; empty input is valid
#[must_use]
pub fn is_utf8(bytes: &[u8]) -> bool {
    utf8::validate(bytes)
}

/// True if every byte is below 0x80; empty input is valid
///
/// Scans a word at a time, falling back to bytes for the tail.
#[must_use]
pub fn is_ascii(bytes: &[u8]) -> bool {
    const HIGH_BITS: u64 = 0x8080_8080_8080_8080;
    let mut chunks = bytes.chunks_exact(8);
    for chunk in chunks.by_ref() {
        let mut word = [0u8; 8];
        word.copy_from_slice(chunk);
        if u64::from_ne_bytes(word) & HIGH_BITS != 0 {
            return false;
        }
    }
    chunks.remainder().iter().all(|&b| b < 0x80)
}
