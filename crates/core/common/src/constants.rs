//! Process-wide limits for the buffer engine
//!
//! These are fixed for the lifetime of the process; every bounds check in
//! the engine agrees with them.

/// Maximum addressable byte length of a single buffer (2^32 - 1)
pub const K_MAX_LENGTH: usize = u32::MAX as usize;

/// Maximum byte length of a single decoded string
pub const K_STRING_MAX_LENGTH: usize = (1 << 29) - 24;

/// Default capacity of a shared pool page
pub const DEFAULT_POOL_SIZE: usize = 8192;
