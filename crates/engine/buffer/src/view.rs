//! Buffer views over shared backing stores
//!
//! A [`Buffer`] is an (store, offset, length) window. Cloning a view or
//! taking a [`Buffer::subarray`] aliases the same store, so mutation
//! through one view is visible through all of them; copy construction
//! goes through the engine (`from_buffer`) and never aliases. Two
//! operation families coexist on purpose: raw indexed access
//! ([`Buffer::get`]/[`Buffer::set`]) is sentinel-based and never fails,
//! while the checked methods return a Range error before any byte moves.

use std::fmt;
use std::sync::Arc;

use common::{BufferError, Encoding, K_STRING_MAX_LENGTH, Result};
use mempool::{BackingStore, Lease};
use serde::ser::{Serialize, SerializeStruct, Serializer};

/// A fixed-length view of a shared byte region
#[derive(Clone)]
pub struct Buffer {
    pub(crate) store: Arc<BackingStore>,
    pub(crate) offset: usize,
    pub(crate) len: usize,
}

impl Buffer {
    pub(crate) fn from_lease(lease: Lease) -> Self {
        Self {
            store: lease.store,
            offset: lease.offset,
            len: lease.len,
        }
    }

    /// Build a view over an explicit store range
    ///
    /// # Errors
    ///
    /// Range error when `offset + len` exceeds the store capacity.
    pub fn from_parts(store: Arc<BackingStore>, offset: usize, len: usize) -> Result<Self> {
        if offset.checked_add(len).is_none_or(|end| end > store.capacity()) {
            return Err(BufferError::OutOfRange(format!(
                "view {offset}+{len} exceeds store capacity {}",
                store.capacity()
            )));
        }
        Ok(Self { store, offset, len })
    }

    /// Alias an externally supplied byte region without copying
    #[must_use]
    pub fn wrap(bytes: Vec<u8>) -> Self {
        let len = bytes.len();
        Self {
            store: BackingStore::from_vec(bytes),
            offset: 0,
            len,
        }
    }

    /// Length of the view in bytes
    #[must_use]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// True if the view is empty
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Offset of the view's first byte within its backing store
    #[must_use]
    pub const fn byte_offset(&self) -> usize {
        self.offset
    }

    /// Borrow the viewed bytes
    #[inline]
    #[must_use]
    pub fn as_slice(&self) -> &[u8] {
        // SAFETY: offset + len <= capacity by construction. Concurrent
        // writers through aliasing views are the caller's data race.
        unsafe { self.store.bytes(self.offset, self.len) }
    }

    /// Mutably borrow the viewed bytes
    ///
    /// Aliasing views of the same store still exist; synchronizing with
    /// them is the caller's responsibility.
    #[inline]
    #[must_use]
    pub fn as_mut_slice(&mut self) -> &mut [u8] {
        // SAFETY: offset + len <= capacity by construction; exclusivity
        // across aliasing views is the caller's contract.
        unsafe { self.store.bytes_mut(self.offset, self.len) }
    }

    /// Read one byte, or `None` outside `[0, len)`
    #[must_use]
    pub fn get(&self, index: usize) -> Option<u8> {
        self.as_slice().get(index).copied()
    }

    /// Write one byte; out-of-bounds writes are silently dropped
    pub fn set(&mut self, index: usize, value: u8) {
        if let Some(slot) = self.as_mut_slice().get_mut(index) {
            *slot = value;
        }
    }

    /// Read one byte with a hard bounds check
    ///
    /// # Errors
    ///
    /// Range error outside `[0, len)`.
    pub fn get_checked(&self, index: usize) -> Result<u8> {
        self.get(index).ok_or_else(|| {
            BufferError::OutOfRange(format!("index {index} outside buffer of length {}", self.len))
        })
    }

    /// Write one byte with a hard bounds check
    ///
    /// # Errors
    ///
    /// Range error outside `[0, len)`.
    pub fn set_checked(&mut self, index: usize, value: u8) -> Result<()> {
        let len = self.len;
        match self.as_mut_slice().get_mut(index) {
            Some(slot) => {
                *slot = value;
                Ok(())
            }
            None => Err(BufferError::OutOfRange(format!(
                "index {index} outside buffer of length {len}"
            ))),
        }
    }

    /// Aliasing sub-view over `[start, end)`
    ///
    /// Negative indices count from the end; both ends clamp into
    /// `[0, len]`, and `start > end` yields an empty view, never an
    /// error. The returned view shares this view's store.
    #[must_use]
    pub fn subarray(&self, start: Option<i64>, end: Option<i64>) -> Self {
        let start = start.map_or(0, |s| resolve_index(self.len, s));
        let end = end.map_or(self.len, |e| resolve_index(self.len, e));
        Self {
            store: Arc::clone(&self.store),
            offset: self.offset + start,
            len: end.saturating_sub(start),
        }
    }

    /// Alias of [`Buffer::subarray`]
    #[must_use]
    pub fn slice(&self, start: Option<i64>, end: Option<i64>) -> Self {
        self.subarray(start, end)
    }

    /// Fill `[start, end)` with a repeating byte pattern
    ///
    /// An empty pattern zero-fills the range.
    ///
    /// # Errors
    ///
    /// Range error unless `start <= end <= len`.
    pub fn fill(&mut self, pattern: &[u8], start: usize, end: usize) -> Result<()> {
        self.check_range(start, end)?;
        let dst = &mut self.as_mut_slice()[start..end];
        match pattern {
            [] => dst.fill(0),
            [byte] => dst.fill(*byte),
            _ => {
                let mut written = 0;
                while written < dst.len() {
                    let take = pattern.len().min(dst.len() - written);
                    dst[written..written + take].copy_from_slice(&pattern[..take]);
                    written += take;
                }
            }
        }
        Ok(())
    }

    /// Fill `[start, end)` with a string pattern encoded under `encoding`
    ///
    /// # Errors
    ///
    /// Range error unless `start <= end <= len`.
    pub fn fill_str(
        &mut self,
        text: &str,
        encoding: Encoding,
        start: usize,
        end: usize,
    ) -> Result<()> {
        let pattern = encoding::encode(text, encoding);
        self.fill(&pattern, start, end)
    }

    /// Copy `[source_start, source_end)` into `target` at `target_start`
    ///
    /// Overlapping ranges on a shared store copy correctly (memmove
    /// semantics). The count is truncated to what fits in `target`;
    /// bounds are validated before any byte moves. Returns the number of
    /// bytes copied.
    ///
    /// # Errors
    ///
    /// Range error when a start or end falls outside its buffer.
    pub fn copy_to(
        &self,
        target: &mut Self,
        target_start: usize,
        source_start: usize,
        source_end: usize,
    ) -> Result<usize> {
        if source_start > source_end || source_end > self.len {
            return Err(BufferError::OutOfRange(format!(
                "source range {source_start}..{source_end} outside buffer of length {}",
                self.len
            )));
        }
        if target_start > target.len {
            return Err(BufferError::OutOfRange(format!(
                "target start {target_start} outside buffer of length {}",
                target.len
            )));
        }
        let count = (source_end - source_start).min(target.len - target_start);
        if count == 0 {
            return Ok(0);
        }
        if Arc::ptr_eq(&self.store, &target.store) {
            let src = self.offset + source_start;
            let dst = target.offset + target_start;
            // SAFETY: both ranges are validated against the shared
            // store's capacity; copy_within handles the overlap.
            let whole = unsafe { self.store.bytes_mut(0, self.store.capacity()) };
            whole.copy_within(src..src + count, dst);
        } else {
            target.as_mut_slice()[target_start..target_start + count]
                .copy_from_slice(&self.as_slice()[source_start..source_start + count]);
        }
        Ok(count)
    }

    /// Reverse the view's bytes in place
    pub fn reverse(&mut self) {
        self.as_mut_slice().reverse();
    }

    /// Swap the byte order of each 16-bit word in place
    ///
    /// # Errors
    ///
    /// Range error when the length is not a multiple of 2.
    pub fn swap16(&mut self) -> Result<()> {
        self.check_word_multiple(2)?;
        for pair in self.as_mut_slice().chunks_exact_mut(2) {
            pair.swap(0, 1);
        }
        Ok(())
    }

    /// Swap the byte order of each 32-bit word in place
    ///
    /// # Errors
    ///
    /// Range error when the length is not a multiple of 4.
    pub fn swap32(&mut self) -> Result<()> {
        self.check_word_multiple(4)?;
        for word in self.as_mut_slice().chunks_exact_mut(4) {
            word.reverse();
        }
        Ok(())
    }

    /// Swap the byte order of each 64-bit word in place
    ///
    /// # Errors
    ///
    /// Range error when the length is not a multiple of 8.
    pub fn swap64(&mut self) -> Result<()> {
        self.check_word_multiple(8)?;
        for word in self.as_mut_slice().chunks_exact_mut(8) {
            word.reverse();
        }
        Ok(())
    }

    /// Byte-for-byte equality with another view
    #[must_use]
    pub fn equals(&self, other: &Self) -> bool {
        self.as_slice() == other.as_slice()
    }

    /// Decode `[start, end)` as text under `encoding`
    ///
    /// Both ends clamp into `[0, len]`; a reversed range decodes to the
    /// empty string.
    ///
    /// # Errors
    ///
    /// Range error when the selected range exceeds the maximum string
    /// length.
    pub fn to_string(&self, encoding: Encoding, start: usize, end: usize) -> Result<String> {
        let start = start.min(self.len);
        let end = end.min(self.len);
        if start >= end {
            return Ok(String::new());
        }
        let bytes = &self.as_slice()[start..end];
        if bytes.len() > K_STRING_MAX_LENGTH {
            return Err(BufferError::StringTooLong {
                len: bytes.len(),
                max: K_STRING_MAX_LENGTH,
            });
        }
        Ok(encoding::decode(bytes, encoding))
    }

    /// Encode `text` into the view starting at `offset`, truncating at
    /// a character boundary when it does not fit
    ///
    /// UTF-8 truncates at a code point boundary, UTF-16LE at an even
    /// byte count. Returns the number of bytes written.
    ///
    /// # Errors
    ///
    /// Range error when `offset > len`.
    pub fn write_str(&mut self, text: &str, encoding: Encoding, offset: usize) -> Result<usize> {
        if offset > self.len {
            return Err(BufferError::OutOfRange(format!(
                "write offset {offset} outside buffer of length {}",
                self.len
            )));
        }
        let encoded = encoding::encode(text, encoding);
        let space = self.len - offset;
        let count = if encoded.len() <= space {
            encoded.len()
        } else {
            match encoding {
                Encoding::Utf8 => {
                    let mut boundary = space;
                    while boundary > 0 && encoded[boundary] & 0xC0 == 0x80 {
                        boundary -= 1;
                    }
                    boundary
                }
                Encoding::Utf16Le => space & !1,
                _ => space,
            }
        };
        self.as_mut_slice()[offset..offset + count].copy_from_slice(&encoded[..count]);
        Ok(count)
    }

    /// JSON value in the `{"type":"Buffer","data":[...]}` shape
    #[must_use]
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({ "type": "Buffer", "data": self.as_slice() })
    }

    /// Iterate the view's bytes in ascending offset order
    ///
    /// Each call returns an independent iterator with its own cursor.
    pub fn iter(&self) -> std::iter::Copied<std::slice::Iter<'_, u8>> {
        self.as_slice().iter().copied()
    }

    fn check_range(&self, start: usize, end: usize) -> Result<()> {
        if start > end || end > self.len {
            return Err(BufferError::OutOfRange(format!(
                "range {start}..{end} outside buffer of length {}",
                self.len
            )));
        }
        Ok(())
    }

    fn check_word_multiple(&self, width: usize) -> Result<()> {
        if self.len % width != 0 {
            return Err(BufferError::OutOfRange(format!(
                "length {} is not a multiple of {width}",
                self.len
            )));
        }
        Ok(())
    }
}

#[allow(clippy::cast_possible_truncation)]
fn resolve_index(len: usize, index: i64) -> usize {
    if index < 0 {
        len.saturating_sub(index.unsigned_abs() as usize)
    } else {
        (index.unsigned_abs() as usize).min(len)
    }
}

impl<'a> IntoIterator for &'a Buffer {
    type Item = u8;
    type IntoIter = std::iter::Copied<std::slice::Iter<'a, u8>>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl PartialEq for Buffer {
    fn eq(&self, other: &Self) -> bool {
        self.as_slice() == other.as_slice()
    }
}

impl Eq for Buffer {}

impl PartialOrd for Buffer {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Buffer {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.as_slice().cmp(other.as_slice())
    }
}

impl Serialize for Buffer {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("Buffer", 2)?;
        state.serialize_field("type", "Buffer")?;
        state.serialize_field("data", self.as_slice())?;
        state.end()
    }
}

impl fmt::Debug for Buffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        const SHOWN: usize = 32;
        write!(f, "<Buffer")?;
        for byte in self.as_slice().iter().take(SHOWN) {
            write!(f, " {byte:02x}")?;
        }
        if self.len > SHOWN {
            write!(f, " ... {} more bytes", self.len - SHOWN)?;
        }
        write!(f, ">")
    }
}
