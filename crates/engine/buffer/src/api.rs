//! Public engine surface
//!
//! [`Engine`] owns a page pool and exposes the strongly-typed
//! construction paths. The module-level functions mirror the loose
//! surface of the original API on top of a process-wide default engine:
//! sizes, offsets, and write values arrive as [`Scalar`]s and go through
//! the coercion rules before the core ever sees them. The default
//! instance lives only here; the core crates never touch a global.

use std::cmp::Ordering;
use std::sync::OnceLock;

use common::{
    BufferError, Encoding, K_MAX_LENGTH, K_STRING_MAX_LENGTH, Result, Scalar, coerce,
};
use mempool::{PagePool, PoolConfig, PoolStats};

use crate::int::{Endian, check_byte_length};
use crate::view::Buffer;

/// Fill initializer for [`alloc_fill`] and the engine fill paths
#[derive(Debug, Clone)]
pub enum Fill<'a> {
    /// Numeric fill, coerced and wrapped to a single byte
    Value(Scalar),
    /// String pattern in the given encoding
    Text(&'a str, Encoding),
    /// Byte pattern copied repeatedly
    Pattern(&'a [u8]),
}

/// Allocation and copy-construction over an owned page pool
pub struct Engine {
    pool: PagePool,
}

impl Engine {
    /// Create an engine with the given pool configuration
    #[must_use]
    pub fn new(config: PoolConfig) -> Self {
        Self {
            pool: PagePool::new(config),
        }
    }

    /// Zero-filled allocation
    ///
    /// # Errors
    ///
    /// Range error for sizes above the maximum length; allocation
    /// failure if memory is exhausted.
    pub fn alloc(&self, size: usize) -> Result<Buffer> {
        check_size(size)?;
        Ok(Buffer::from_lease(self.pool.alloc_zeroed(size)?))
    }

    /// Pool-eligible allocation without the zero guarantee
    ///
    /// Contents of a recycled page are whatever the previous user left.
    ///
    /// # Errors
    ///
    /// Same failure modes as [`Engine::alloc`].
    pub fn alloc_unsafe(&self, size: usize) -> Result<Buffer> {
        check_size(size)?;
        Ok(Buffer::from_lease(self.pool.alloc_fast(size)?))
    }

    /// Dedicated allocation that never pins a shared pool page
    ///
    /// # Errors
    ///
    /// Same failure modes as [`Engine::alloc`].
    pub fn alloc_unsafe_slow(&self, size: usize) -> Result<Buffer> {
        check_size(size)?;
        Ok(Buffer::from_lease(self.pool.alloc_dedicated(size)?))
    }

    /// Pooled copy of a byte slice
    ///
    /// # Errors
    ///
    /// Range error for slices above the maximum length.
    pub fn from_slice(&self, data: &[u8]) -> Result<Buffer> {
        let mut buf = self.alloc_unsafe(data.len())?;
        buf.as_mut_slice().copy_from_slice(data);
        Ok(buf)
    }

    /// Encode a string into a fresh buffer
    ///
    /// # Errors
    ///
    /// Range error when the input exceeds the maximum string length.
    pub fn from_str(&self, text: &str, encoding: Encoding) -> Result<Buffer> {
        if text.len() > K_STRING_MAX_LENGTH {
            return Err(BufferError::StringTooLong {
                len: text.len(),
                max: K_STRING_MAX_LENGTH,
            });
        }
        self.from_slice(&encoding::encode(text, encoding))
    }

    /// Byte-for-byte copy of an existing view
    ///
    /// This is the one construction path that never aliases: mutating
    /// the source afterwards is not visible through the copy.
    ///
    /// # Errors
    ///
    /// Range error for views above the maximum length.
    pub fn from_buffer(&self, source: &Buffer) -> Result<Buffer> {
        self.from_slice(source.as_slice())
    }

    /// Concatenate views into a fresh buffer
    ///
    /// With an explicit `total_length` the result is truncated or
    /// zero-padded to exactly that many bytes; otherwise it is the sum
    /// of the input lengths.
    ///
    /// # Errors
    ///
    /// Range error when the combined length exceeds the maximum.
    pub fn concat(&self, list: &[Buffer], total_length: Option<usize>) -> Result<Buffer> {
        let sum = list
            .iter()
            .try_fold(0usize, |acc, buf| acc.checked_add(buf.len()))
            .ok_or_else(|| BufferError::TooLong {
                len: u64::MAX,
                max: K_MAX_LENGTH as u64,
            })?;
        let total = total_length.unwrap_or(sum);
        let mut out = self.alloc_unsafe(total)?;
        let mut written = 0;
        for buf in list {
            if written >= total {
                break;
            }
            let take = buf.len().min(total - written);
            out.as_mut_slice()[written..written + take].copy_from_slice(&buf.as_slice()[..take]);
            written += take;
        }
        // Zero-pad when an explicit total exceeds the inputs
        out.as_mut_slice()[written..].fill(0);
        Ok(out)
    }

    /// Current fast-path threshold page size
    #[must_use]
    pub fn pool_size(&self) -> usize {
        self.pool.pool_size()
    }

    /// Change the pool page size at runtime
    pub fn set_pool_size(&self, pool_size: usize) {
        self.pool.set_pool_size(pool_size);
    }

    /// Snapshot of the pool counters
    #[must_use]
    pub fn pool_stats(&self) -> PoolStats {
        self.pool.stats()
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new(PoolConfig::default())
    }
}

fn check_size(size: usize) -> Result<()> {
    if size > K_MAX_LENGTH {
        return Err(BufferError::TooLong {
            len: size as u64,
            max: K_MAX_LENGTH as u64,
        });
    }
    Ok(())
}

static DEFAULT: OnceLock<Engine> = OnceLock::new();

fn default_engine() -> &'static Engine {
    DEFAULT.get_or_init(Engine::default)
}

/// Zero-filled allocation on the default engine
///
/// # Errors
///
/// Range error for a size that does not coerce to a valid length.
pub fn alloc(size: impl Into<Scalar>) -> Result<Buffer> {
    default_engine().alloc(coerce::to_size(&size.into())?)
}

/// Zeroed allocation, then filled from `fill`
///
/// # Errors
///
/// Range error for an invalid size; Type error for an uncoercible fill.
pub fn alloc_fill(size: impl Into<Scalar>, fill: &Fill<'_>) -> Result<Buffer> {
    let mut buf = alloc(size)?;
    let end = buf.len();
    match fill {
        Fill::Value(scalar) => {
            let byte = coerce::byte_value(scalar)?;
            buf.fill(&[byte], 0, end)?;
        }
        Fill::Text(text, encoding) => buf.fill_str(text, *encoding, 0, end)?,
        Fill::Pattern(pattern) => buf.fill(pattern, 0, end)?,
    }
    Ok(buf)
}

/// Pool-eligible allocation without the zero guarantee
///
/// # Errors
///
/// Range error for a size that does not coerce to a valid length.
pub fn alloc_unsafe(size: impl Into<Scalar>) -> Result<Buffer> {
    default_engine().alloc_unsafe(coerce::to_size(&size.into())?)
}

/// Dedicated allocation bypassing the pool
///
/// # Errors
///
/// Range error for a size that does not coerce to a valid length.
pub fn alloc_unsafe_slow(size: impl Into<Scalar>) -> Result<Buffer> {
    default_engine().alloc_unsafe_slow(coerce::to_size(&size.into())?)
}

/// Pooled copy of a byte slice on the default engine
///
/// # Errors
///
/// Range error for slices above the maximum length.
pub fn from_slice(data: &[u8]) -> Result<Buffer> {
    default_engine().from_slice(data)
}

/// Encode a string into a fresh buffer on the default engine
///
/// # Errors
///
/// Range error when the input exceeds the maximum string length.
pub fn from_str(text: &str, encoding: Encoding) -> Result<Buffer> {
    default_engine().from_str(text, encoding)
}

/// Non-aliasing copy of an existing view on the default engine
///
/// # Errors
///
/// Range error for views above the maximum length.
pub fn from_buffer(source: &Buffer) -> Result<Buffer> {
    default_engine().from_buffer(source)
}

/// Concatenate views on the default engine
///
/// # Errors
///
/// Range error when the combined length exceeds the maximum.
pub fn concat(list: &[Buffer], total_length: Option<usize>) -> Result<Buffer> {
    default_engine().concat(list, total_length)
}

/// Lexicographic byte-order comparison
#[must_use]
pub fn compare(a: &Buffer, b: &Buffer) -> Ordering {
    a.cmp(b)
}

/// Byte length `text` would occupy under `encoding`
#[must_use]
pub fn byte_length(text: &str, encoding: Encoding) -> usize {
    encoding::byte_length(text, encoding)
}

/// True if `name` resolves to a supported encoding
#[must_use]
pub fn is_encoding(name: &str) -> bool {
    Encoding::is_encoding(name)
}

/// True if `bytes` is well-formed UTF-8; agrees with lossy decoding
#[must_use]
pub fn is_utf8(bytes: &[u8]) -> bool {
    encoding::is_utf8(bytes)
}

/// True if every byte of `bytes` is below 0x80
#[must_use]
pub fn is_ascii(bytes: &[u8]) -> bool {
    encoding::is_ascii(bytes)
}

/// Re-encode a buffer from one character encoding to another
///
/// Only the byte-to-text encodings take part; hex and base64 are
/// byte-to-text transport codecs, not character encodings.
///
/// # Errors
///
/// Type error when either encoding is not a character encoding.
pub fn transcode(source: &Buffer, from: Encoding, to: Encoding) -> Result<Buffer> {
    for encoding in [from, to] {
        if !matches!(
            encoding,
            Encoding::Utf8 | Encoding::Utf16Le | Encoding::Latin1 | Encoding::Ascii
        ) {
            return Err(BufferError::InvalidType(format!(
                "cannot transcode through {encoding}"
            )));
        }
    }
    let text = encoding::decode(source.as_slice(), from);
    from_str(&text, to)
}

/// Decode lenient base64 into a latin1 string
#[must_use]
pub fn atob(input: &str) -> String {
    let bytes = encoding::encode(input, Encoding::Base64);
    encoding::decode(&bytes, Encoding::Latin1)
}

/// Encode a latin1 string as padded base64
///
/// # Errors
///
/// Type error when the input contains a code point above U+00FF.
pub fn btoa(input: &str) -> Result<String> {
    let mut bytes = Vec::with_capacity(input.len());
    for c in input.chars() {
        let code = u32::from(c);
        if code > 0xFF {
            return Err(BufferError::InvalidType(format!(
                "character U+{code:04X} is outside the latin1 range"
            )));
        }
        #[allow(clippy::cast_possible_truncation)]
        bytes.push(code as u8);
    }
    Ok(encoding::decode(&bytes, Encoding::Base64))
}

/// Fast-path threshold page size of the default engine
#[must_use]
pub fn pool_size() -> usize {
    default_engine().pool_size()
}

/// Change the default engine's pool page size
pub fn set_pool_size(size: usize) {
    default_engine().set_pool_size(size);
}

/// Read an unsigned 1-6 byte integer with coercing offset rules
///
/// # Errors
///
/// Type error for a non-numeric offset, Range error for a fractional or
/// out-of-bounds one.
pub fn read_uint(
    buf: &Buffer,
    offset: impl Into<Scalar>,
    byte_length: usize,
    endian: Endian,
) -> Result<u64> {
    check_byte_length(byte_length)?;
    let off = coerce::to_offset(&offset.into(), buf.len().saturating_sub(byte_length))?;
    match endian {
        Endian::Big => buf.read_uint_be(off, byte_length),
        Endian::Little => buf.read_uint_le(off, byte_length),
    }
}

/// Read a signed 1-6 byte integer with coercing offset rules
///
/// # Errors
///
/// Same failure modes as [`read_uint`].
pub fn read_int(
    buf: &Buffer,
    offset: impl Into<Scalar>,
    byte_length: usize,
    endian: Endian,
) -> Result<i64> {
    check_byte_length(byte_length)?;
    let off = coerce::to_offset(&offset.into(), buf.len().saturating_sub(byte_length))?;
    match endian {
        Endian::Big => buf.read_int_be(off, byte_length),
        Endian::Little => buf.read_int_le(off, byte_length),
    }
}

/// Write an unsigned 1-6 byte integer with coercing value and offset
/// rules; the value wraps modulo `2^(8 * byte_length)`
///
/// # Errors
///
/// Type error for non-numeric arguments, Range error for fractional or
/// out-of-bounds offsets.
pub fn write_uint(
    buf: &mut Buffer,
    value: impl Into<Scalar>,
    offset: impl Into<Scalar>,
    byte_length: usize,
    endian: Endian,
) -> Result<usize> {
    check_byte_length(byte_length)?;
    let n = coerce::to_number(&value.into())?;
    let off = coerce::to_offset(&offset.into(), buf.len().saturating_sub(byte_length))?;
    let bits = coerce::wrap_unsigned(n, byte_length);
    match endian {
        Endian::Big => buf.write_uint_be(bits, off, byte_length),
        Endian::Little => buf.write_uint_le(bits, off, byte_length),
    }
}

/// Write a signed 1-6 byte integer with coercing value and offset rules
///
/// # Errors
///
/// Same failure modes as [`write_uint`].
pub fn write_int(
    buf: &mut Buffer,
    value: impl Into<Scalar>,
    offset: impl Into<Scalar>,
    byte_length: usize,
    endian: Endian,
) -> Result<usize> {
    write_uint(buf, value, offset, byte_length, endian)
}
