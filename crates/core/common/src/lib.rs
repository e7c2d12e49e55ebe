//! Common types for the ByteMill buffer engine
//!
//! Everything the other engine crates agree on lives here: the error
//! taxonomy, the numeric-coercion rules applied at the public API
//! boundary, the encoding registry, and process-wide limits.

pub mod coerce;
pub mod constants;
pub mod encoding;
pub mod error;

pub use coerce::Scalar;
pub use constants::{DEFAULT_POOL_SIZE, K_MAX_LENGTH, K_STRING_MAX_LENGTH};
pub use encoding::Encoding;
pub use error::{BufferError, ErrorKind, Result};
