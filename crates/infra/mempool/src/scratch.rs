//! Tiered scratch-buffer pool for the codec layer
//!
//! Encode/decode routines borrow transient buffers here instead of
//! allocating per call. Buffers are pooled by size tier (small ≤ 64KB,
//! medium ≤ 2MB, anything larger is unpooled) on lock-free bounded
//! queues, so checkout and return are safe from any thread and a buffer
//! is owned by exactly one handle at a time.
//!
//! A reused buffer is grown to at least the requested size before it is
//! handed out, and a fresh one is sized to the next power of two, so a
//! checkout near a tier boundary never comes back short and never wastes
//! more than twice the request.

use std::ops::{Deref, DerefMut};
use std::sync::atomic::{AtomicU64, Ordering};

use crossbeam::queue::ArrayQueue;
use tracing::trace;

/// Upper bound of the small tier
pub const SMALL_MAX: usize = 64 * 1024;

/// Upper bound of the medium tier
pub const MEDIUM_MAX: usize = 2 * 1024 * 1024;

/// Buffers retained per tier before returns are dropped
const RETAINED_PER_TIER: usize = 16;

/// Scratch-buffer size tiers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tier {
    /// Requests up to 64KB
    Small,
    /// Requests up to 2MB
    Medium,
    /// Larger requests; never pooled
    Oversized,
}

impl Tier {
    /// Classify a requested size
    #[must_use]
    pub const fn for_size(size: usize) -> Self {
        if size <= SMALL_MAX {
            Self::Small
        } else if size <= MEDIUM_MAX {
            Self::Medium
        } else {
            Self::Oversized
        }
    }
}

/// Counter snapshot for a [`ScratchPool`]
#[derive(Debug, Clone, Copy, Default)]
pub struct ScratchStats {
    /// Checkouts served from a pooled buffer
    pub hits: u64,
    /// Checkouts that had to allocate
    pub misses: u64,
    /// Returns dropped because the tier queue was full or the buffer
    /// was oversized
    pub discards: u64,
}

/// Concurrency-safe pool of transient codec buffers
pub struct ScratchPool {
    small: ArrayQueue<Vec<u8>>,
    medium: ArrayQueue<Vec<u8>>,
    hits: AtomicU64,
    misses: AtomicU64,
    discards: AtomicU64,
}

impl ScratchPool {
    /// Create an empty pool
    #[must_use]
    pub fn new() -> Self {
        Self {
            small: ArrayQueue::new(RETAINED_PER_TIER),
            medium: ArrayQueue::new(RETAINED_PER_TIER),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            discards: AtomicU64::new(0),
        }
    }

    /// Borrow a buffer with capacity for at least `size` bytes
    ///
    /// The handle starts empty; it returns its buffer to the pool when
    /// dropped. Oversized requests allocate exactly and are freed on
    /// drop rather than pooled.
    #[must_use]
    pub fn checkout(&self, size: usize) -> ScratchHandle<'_> {
        let tier = Tier::for_size(size);
        let reused = match tier {
            Tier::Small => self.small.pop(),
            Tier::Medium => self.medium.pop(),
            Tier::Oversized => None,
        };
        let buf = match reused {
            Some(mut buf) => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                if buf.capacity() < size {
                    buf.reserve(size);
                }
                buf
            }
            None => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                let capacity = match tier {
                    Tier::Oversized => size,
                    _ => size.next_power_of_two(),
                };
                Vec::with_capacity(capacity)
            }
        };
        ScratchHandle {
            buf,
            tier,
            pool: self,
        }
    }

    /// Snapshot of the pool counters
    #[must_use]
    pub fn stats(&self) -> ScratchStats {
        ScratchStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            discards: self.discards.load(Ordering::Relaxed),
        }
    }

    fn give_back(&self, mut buf: Vec<u8>, tier: Tier) {
        buf.clear();
        let rejected = match tier {
            Tier::Small => self.small.push(buf).err(),
            Tier::Medium => self.medium.push(buf).err(),
            Tier::Oversized => Some(buf),
        };
        if rejected.is_some() {
            self.discards.fetch_add(1, Ordering::Relaxed);
            trace!("dropping scratch buffer instead of pooling");
        }
    }
}

impl Default for ScratchPool {
    fn default() -> Self {
        Self::new()
    }
}

/// Exclusive loan of a scratch buffer
///
/// Dereferences to the underlying `Vec<u8>`; the handle owns the buffer
/// outright until it drops.
pub struct ScratchHandle<'a> {
    buf: Vec<u8>,
    tier: Tier,
    pool: &'a ScratchPool,
}

impl ScratchHandle<'_> {
    /// Tier this buffer will return to
    #[must_use]
    pub const fn tier(&self) -> Tier {
        self.tier
    }
}

impl Deref for ScratchHandle<'_> {
    type Target = Vec<u8>;

    fn deref(&self) -> &Self::Target {
        &self.buf
    }
}

impl DerefMut for ScratchHandle<'_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.buf
    }
}

impl Drop for ScratchHandle<'_> {
    fn drop(&mut self) {
        self.pool.give_back(std::mem::take(&mut self.buf), self.tier);
    }
}
