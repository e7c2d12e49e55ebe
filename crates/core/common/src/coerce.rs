//! Numeric coercion applied at the public API boundary
//!
//! The engine accepts loosely-typed sizes, offsets, and write values and
//! normalizes them through a small set of pure functions before any byte
//! is touched. Codec offsets are strict (floats with a fractional part
//! and booleans are rejected); sizes and write values coerce through the
//! same string-to-number conversion used everywhere else in the engine.

use crate::constants::K_MAX_LENGTH;
use crate::error::{BufferError, Result};

/// Loosely-typed input accepted at the coercing API boundary
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    /// Integral number
    Int(i64),
    /// Floating-point number
    Float(f64),
    /// Boolean, converts to 0 or 1
    Bool(bool),
    /// Null, converts to 0
    Null,
    /// String, parsed with the string-to-number rules
    Str(String),
    /// Arbitrary-precision integer; rejected wherever a number is expected
    BigInt(i128),
}

impl From<i64> for Scalar {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<i32> for Scalar {
    fn from(value: i32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<u32> for Scalar {
    fn from(value: u32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<usize> for Scalar {
    #[allow(clippy::cast_precision_loss)]
    fn from(value: usize) -> Self {
        i64::try_from(value).map_or(Self::Float(value as f64), Self::Int)
    }
}

impl From<f64> for Scalar {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<bool> for Scalar {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<&str> for Scalar {
    fn from(value: &str) -> Self {
        Self::Str(value.to_string())
    }
}

impl From<String> for Scalar {
    fn from(value: String) -> Self {
        Self::Str(value)
    }
}

/// Convert a scalar to a number
///
/// Strings parse as decimal, hex (`0x`), octal (`0o`), or binary (`0b`)
/// with leading/trailing whitespace ignored; an empty string is 0 and an
/// unparseable one is `NaN`. `null` and `false` convert to 0, `true` to 1.
///
/// # Errors
///
/// Returns a Type error for `BigInt`, which never implicitly converts.
#[allow(clippy::cast_precision_loss)]
pub fn to_number(value: &Scalar) -> Result<f64> {
    match value {
        Scalar::Int(i) => Ok(*i as f64),
        Scalar::Float(f) => Ok(*f),
        Scalar::Bool(b) => Ok(if *b { 1.0 } else { 0.0 }),
        Scalar::Null => Ok(0.0),
        Scalar::Str(s) => Ok(parse_number(s)),
        Scalar::BigInt(_) => Err(BufferError::InvalidType(
            "cannot convert a BigInt to a number".to_string(),
        )),
    }
}

/// Convert to a number and truncate toward zero; `NaN` becomes 0
///
/// # Errors
///
/// Returns a Type error for `BigInt`.
pub fn to_integer(value: &Scalar) -> Result<f64> {
    let n = to_number(value)?;
    Ok(if n.is_nan() { 0.0 } else { n.trunc() })
}

/// Coerce an allocation size
///
/// # Errors
///
/// Range error when the converted value is negative, non-integral,
/// non-finite, or above [`K_MAX_LENGTH`]; Type error for `BigInt`.
#[allow(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]
pub fn to_size(value: &Scalar) -> Result<usize> {
    let n = to_number(value)?;
    if !n.is_finite() || n.fract() != 0.0 || n < 0.0 {
        return Err(BufferError::InvalidSize(format!("{n} is not a valid size")));
    }
    if n > K_MAX_LENGTH as f64 {
        return Err(BufferError::TooLong {
            len: n as u64,
            max: K_MAX_LENGTH as u64,
        });
    }
    Ok(n as usize)
}

/// Coerce a codec offset, strictly
///
/// Unlike the size path, nothing is parsed here: an offset is an integer
/// in `[0, upper]` or an error. Floats with a fractional part and
/// non-finite floats are Range errors; booleans, strings, null, and
/// `BigInt` are Type errors.
///
/// # Errors
///
/// See above.
#[allow(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]
pub fn to_offset(value: &Scalar, upper: usize) -> Result<usize> {
    let n = match value {
        Scalar::Int(i) => *i as f64,
        Scalar::Float(f) => {
            if !f.is_finite() || f.fract() != 0.0 {
                return Err(BufferError::OutOfRange(format!(
                    "offset {f} is not an integer"
                )));
            }
            *f
        }
        other => {
            return Err(BufferError::InvalidType(format!(
                "offset must be a number, got {other:?}"
            )));
        }
    };
    if n < 0.0 || n > upper as f64 {
        return Err(BufferError::OutOfRange(format!(
            "offset {n} outside of [0, {upper}]"
        )));
    }
    Ok(n as usize)
}

/// Wrap a converted number modulo `2^(8 * width)` for unsigned writes
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn wrap_unsigned(n: f64, width: usize) -> u64 {
    if !n.is_finite() {
        return 0;
    }
    let modulus = 1i128 << (8 * width.min(8));
    let truncated = n.trunc() as i128;
    truncated.rem_euclid(modulus) as u64
}

/// Coerce a fill or write value to a single byte, wrapping modulo 256
///
/// # Errors
///
/// Returns a Type error for `BigInt`.
#[allow(clippy::cast_possible_truncation)]
pub fn byte_value(value: &Scalar) -> Result<u8> {
    let n = to_number(value)?;
    Ok(wrap_unsigned(n, 1) as u8)
}

/// String-to-number conversion: trimmed, radix-prefixed, or scientific
fn parse_number(text: &str) -> f64 {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return 0.0;
    }
    if let Some(digits) = strip_radix_prefix(trimmed, "0x", "0X") {
        return radix_value(digits, 16);
    }
    if let Some(digits) = strip_radix_prefix(trimmed, "0o", "0O") {
        return radix_value(digits, 8);
    }
    if let Some(digits) = strip_radix_prefix(trimmed, "0b", "0B") {
        return radix_value(digits, 2);
    }
    match trimmed {
        "Infinity" | "+Infinity" => return f64::INFINITY,
        "-Infinity" => return f64::NEG_INFINITY,
        _ => {}
    }
    // The float parser accepts "inf" and "nan", which are not numbers here
    if trimmed
        .bytes()
        .any(|b| b.is_ascii_alphabetic() && b != b'e' && b != b'E')
    {
        return f64::NAN;
    }
    trimmed.parse::<f64>().unwrap_or(f64::NAN)
}

fn strip_radix_prefix<'a>(text: &'a str, lower: &str, upper: &str) -> Option<&'a str> {
    text.strip_prefix(lower)
        .or_else(|| text.strip_prefix(upper))
}

#[allow(clippy::cast_precision_loss)]
fn radix_value(digits: &str, radix: u32) -> f64 {
    if digits.is_empty() {
        return f64::NAN;
    }
    u128::from_str_radix(digits, radix).map_or(f64::NAN, |v| v as f64)
}
