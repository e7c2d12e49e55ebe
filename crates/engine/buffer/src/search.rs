//! Byte and substring search
//!
//! Needles are a single byte value, a byte slice, or a string encoded on
//! the fly. Search offsets clamp the way the view indices do: negative
//! values count from the end, and anything past the end simply finds
//! nothing (or, for an empty needle, the clamped position itself).

use common::Encoding;

use crate::view::Buffer;

/// A search needle for [`Buffer::index_of`] / [`Buffer::last_index_of`]
#[derive(Debug, Clone)]
pub enum Needle<'a> {
    /// A single byte value
    Byte(u8),
    /// A byte sequence
    Bytes(&'a [u8]),
    /// A string, encoded under the given encoding before searching
    Text(&'a str, Encoding),
}

impl From<u8> for Needle<'_> {
    fn from(value: u8) -> Self {
        Self::Byte(value)
    }
}

impl<'a> From<&'a [u8]> for Needle<'a> {
    fn from(value: &'a [u8]) -> Self {
        Self::Bytes(value)
    }
}

impl<'a> From<&'a Buffer> for Needle<'a> {
    fn from(value: &'a Buffer) -> Self {
        Self::Bytes(value.as_slice())
    }
}

impl<'a> From<&'a str> for Needle<'a> {
    fn from(value: &'a str) -> Self {
        Self::Text(value, Encoding::Utf8)
    }
}

impl Needle<'_> {
    fn bytes(&self) -> std::borrow::Cow<'_, [u8]> {
        match self {
            Self::Byte(b) => std::borrow::Cow::Owned(vec![*b]),
            Self::Bytes(bytes) => std::borrow::Cow::Borrowed(bytes),
            Self::Text(text, encoding) => std::borrow::Cow::Owned(encoding::encode(text, *encoding)),
        }
    }
}

#[allow(clippy::cast_possible_truncation)]
fn clamp_offset(len: usize, byte_offset: i64) -> usize {
    if byte_offset < 0 {
        len.saturating_sub(byte_offset.unsigned_abs() as usize)
    } else {
        (byte_offset.unsigned_abs() as usize).min(len)
    }
}

impl Buffer {
    /// First occurrence of `needle` at or after `byte_offset`
    ///
    /// A negative `byte_offset` counts from the end. An empty needle
    /// matches at the clamped offset.
    #[must_use]
    pub fn index_of<'a>(&self, needle: impl Into<Needle<'a>>, byte_offset: i64) -> Option<usize> {
        let needle = needle.into();
        let needle = needle.bytes();
        let start = clamp_offset(self.len, byte_offset);
        if needle.is_empty() {
            return Some(start);
        }
        let hay = self.as_slice();
        if start + needle.len() > hay.len() {
            return None;
        }
        hay[start..]
            .windows(needle.len())
            .position(|window| window == needle.as_ref())
            .map(|pos| pos + start)
    }

    /// Last occurrence of `needle` starting at or before `byte_offset`
    ///
    /// A negative `byte_offset` counts from the end; values past the end
    /// search the whole view. An empty needle matches at the clamped
    /// offset.
    #[must_use]
    pub fn last_index_of<'a>(
        &self,
        needle: impl Into<Needle<'a>>,
        byte_offset: i64,
    ) -> Option<usize> {
        let needle = needle.into();
        let needle = needle.bytes();
        let from = clamp_offset(self.len, byte_offset);
        if needle.is_empty() {
            return Some(from);
        }
        let hay = self.as_slice();
        let last_start = hay.len().checked_sub(needle.len())?;
        let from = from.min(last_start);
        (0..=from)
            .rev()
            .find(|&pos| &hay[pos..pos + needle.len()] == needle.as_ref())
    }
}
