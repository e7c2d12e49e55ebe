//! Shared backing stores
//!
//! A [`BackingStore`] is an owned, fixed-capacity byte region that any
//! number of views may reference through an `Arc`. Mutation through one
//! view is visible through all of them; the store itself provides no
//! locking. Stores carved from a pool carry a weak handle back to their
//! recycler and return their bytes to it when the last reference drops.

use std::cell::UnsafeCell;
use std::sync::{Arc, Weak};

use common::{BufferError, Result};
use tracing::trace;

/// Destination for the bytes of a dropped pool-backed store
pub trait Recycler: Send + Sync {
    /// Take back a retired byte region
    fn reclaim(&self, bytes: Box<[u8]>);
}

/// An owned, fixed-capacity, shareable byte region
pub struct BackingStore {
    data: UnsafeCell<Box<[u8]>>,
    capacity: usize,
    recycler: Option<Weak<dyn Recycler>>,
}

// SAFETY: the store is a plain byte region. Concurrent mutation through
// aliasing views is a documented data race owned by the caller; the
// engine itself never mutates a store it does not exclusively hold.
unsafe impl Send for BackingStore {}
unsafe impl Sync for BackingStore {}

impl BackingStore {
    /// Create a standalone zero-filled store
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying allocation fails.
    pub fn zeroed(capacity: usize) -> Result<Arc<Self>> {
        Ok(Self::from_parts(alloc_bytes(capacity)?, None))
    }

    /// Wrap an externally supplied byte region without copying
    #[must_use]
    pub fn from_vec(bytes: Vec<u8>) -> Arc<Self> {
        Self::from_parts(bytes.into_boxed_slice(), None)
    }

    /// Create a store whose bytes return to `recycler` on final drop
    pub(crate) fn recycled(bytes: Box<[u8]>, recycler: Weak<dyn Recycler>) -> Arc<Self> {
        Self::from_parts(bytes, Some(recycler))
    }

    fn from_parts(bytes: Box<[u8]>, recycler: Option<Weak<dyn Recycler>>) -> Arc<Self> {
        let capacity = bytes.len();
        Arc::new(Self {
            data: UnsafeCell::new(bytes),
            capacity,
            recycler,
        })
    }

    /// Capacity of the region in bytes
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Borrow a byte range of the store
    ///
    /// # Safety
    ///
    /// `offset + len` must not exceed [`Self::capacity`], and the caller
    /// must ensure no unsynchronized writer mutates the same range for
    /// the lifetime of the slice.
    #[inline]
    #[must_use]
    pub unsafe fn bytes(&self, offset: usize, len: usize) -> &[u8] {
        debug_assert!(offset.saturating_add(len) <= self.capacity);
        // SAFETY: range checked above; aliasing contract is the caller's.
        unsafe { std::slice::from_raw_parts((*self.data.get()).as_ptr().add(offset), len) }
    }

    /// Mutably borrow a byte range of the store
    ///
    /// # Safety
    ///
    /// Same contract as [`Self::bytes`], plus exclusivity: no other
    /// access to the same range may overlap this borrow.
    #[inline]
    #[must_use]
    #[allow(clippy::mut_from_ref)]
    pub unsafe fn bytes_mut(&self, offset: usize, len: usize) -> &mut [u8] {
        debug_assert!(offset.saturating_add(len) <= self.capacity);
        // SAFETY: range checked above; aliasing contract is the caller's.
        unsafe { std::slice::from_raw_parts_mut((*self.data.get()).as_mut_ptr().add(offset), len) }
    }
}

impl Drop for BackingStore {
    fn drop(&mut self) {
        if let Some(recycler) = self.recycler.take().and_then(|weak| weak.upgrade()) {
            let bytes = std::mem::take(self.data.get_mut());
            trace!(capacity = bytes.len(), "returning store to its pool");
            recycler.reclaim(bytes);
        }
    }
}

impl std::fmt::Debug for BackingStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackingStore")
            .field("capacity", &self.capacity)
            .field("pooled", &self.recycler.is_some())
            .finish()
    }
}

/// Fallibly allocate a zero-filled byte region
pub(crate) fn alloc_bytes(capacity: usize) -> Result<Box<[u8]>> {
    let mut bytes = Vec::new();
    bytes
        .try_reserve_exact(capacity)
        .map_err(|_| BufferError::AllocationFailed(capacity))?;
    bytes.resize(capacity, 0);
    Ok(bytes.into_boxed_slice())
}
