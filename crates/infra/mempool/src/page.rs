//! Size-tiered page pool
//!
//! Small allocations are carved out of a shared pool page with a bump
//! cursor; the page is retired when a carve no longer fits and its bytes
//! come back to the free list once every view referencing it has dropped.
//! Allocations at or above half the configured page size, and all
//! dedicated ("slow") allocations, bypass the pool entirely.
//!
//! Pool-backed carves pin their page: a single surviving view keeps the
//! whole page alive. Callers that need deterministic release use
//! [`PagePool::alloc_dedicated`].

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError, Weak};

use common::{DEFAULT_POOL_SIZE, Result};
use tracing::{debug, trace};

use crate::store::{BackingStore, Recycler, alloc_bytes};

/// Carve cursors are aligned to 8 bytes, matching the widest codec access
const CARVE_ALIGN: usize = 8;

/// Pool pages retained on the free list before further returns are freed
const DEFAULT_MAX_RETAINED: usize = 8;

/// Configuration for a [`PagePool`]
#[derive(Debug, Clone, Copy)]
pub struct PoolConfig {
    /// Capacity of a shared pool page; allocations below half of this
    /// are pool-eligible. Zero disables pooling entirely.
    pub pool_size: usize,
    /// Retired pages kept for reuse before returns are freed
    pub max_retained_pages: usize,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            pool_size: DEFAULT_POOL_SIZE,
            max_retained_pages: DEFAULT_MAX_RETAINED,
        }
    }
}

/// A pool allocation: a store plus the byte range carved out of it
///
/// Fast-path leases share their store with every other carve from the
/// same page; the ranges themselves never overlap.
#[derive(Debug)]
pub struct Lease {
    /// Store backing the allocation
    pub store: Arc<BackingStore>,
    /// First byte of the carved range
    pub offset: usize,
    /// Length of the carved range
    pub len: usize,
}

/// Counter snapshot for a [`PagePool`]
#[derive(Debug, Clone, Copy, Default)]
pub struct PoolStats {
    /// Fresh pages allocated
    pub pages_created: u64,
    /// Pages reused from the free list
    pub pages_recycled: u64,
    /// Page returns dropped because the free list was full or the page
    /// was below the current pool size
    pub pages_discarded: u64,
    /// Fast-path carves served from a shared page
    pub carves: u64,
    /// Allocations that bypassed the pool
    pub dedicated: u64,
    /// Pages currently sitting on the free list
    pub free_pages: usize,
}

struct CurrentPage {
    store: Arc<BackingStore>,
    cursor: usize,
}

struct PoolInner {
    pool_size: AtomicUsize,
    max_retained: usize,
    current: Mutex<Option<CurrentPage>>,
    free: Mutex<Vec<Box<[u8]>>>,
    pages_created: AtomicU64,
    pages_recycled: AtomicU64,
    pages_discarded: AtomicU64,
    carves: AtomicU64,
    dedicated: AtomicU64,
}

impl Recycler for PoolInner {
    fn reclaim(&self, bytes: Box<[u8]>) {
        if bytes.len() < self.pool_size.load(Ordering::Relaxed) {
            self.pages_discarded.fetch_add(1, Ordering::Relaxed);
            trace!(capacity = bytes.len(), "discarding undersized page");
            return;
        }
        let mut free = self.free.lock().unwrap_or_else(PoisonError::into_inner);
        if free.len() >= self.max_retained {
            self.pages_discarded.fetch_add(1, Ordering::Relaxed);
            trace!("free list full, discarding returned page");
            return;
        }
        // Returned pages stay dirty; only the zeroed path clears carves
        free.push(bytes);
    }
}

/// The pool allocator behind the fast/safe/dedicated allocation paths
pub struct PagePool {
    inner: Arc<PoolInner>,
}

impl PagePool {
    /// Create a pool with the given configuration
    #[must_use]
    pub fn new(config: PoolConfig) -> Self {
        debug!(
            pool_size = config.pool_size,
            max_retained = config.max_retained_pages,
            "page pool created"
        );
        Self {
            inner: Arc::new(PoolInner {
                pool_size: AtomicUsize::new(config.pool_size),
                max_retained: config.max_retained_pages,
                current: Mutex::new(None),
                free: Mutex::new(Vec::new()),
                pages_created: AtomicU64::new(0),
                pages_recycled: AtomicU64::new(0),
                pages_discarded: AtomicU64::new(0),
                carves: AtomicU64::new(0),
                dedicated: AtomicU64::new(0),
            }),
        }
    }

    /// Current pool page size
    #[must_use]
    pub fn pool_size(&self) -> usize {
        self.inner.pool_size.load(Ordering::Relaxed)
    }

    /// Change the pool page size at runtime
    ///
    /// Affects subsequent page acquisition and recycle eligibility only;
    /// pages already in circulation keep their capacity.
    pub fn set_pool_size(&self, pool_size: usize) {
        self.inner.pool_size.store(pool_size, Ordering::Relaxed);
        debug!(pool_size, "pool size changed");
    }

    /// Fast-path allocation: pool-eligible, contents not guaranteed zero
    ///
    /// Carves from recycled pages legitimately expose whatever bytes a
    /// previous user left behind; use [`Self::alloc_zeroed`] when that
    /// matters.
    ///
    /// # Errors
    ///
    /// Returns an error if a fresh page or store cannot be allocated.
    pub fn alloc_fast(&self, len: usize) -> Result<Lease> {
        let pool_size = self.pool_size();
        if len == 0 || pool_size == 0 || len >= pool_size / 2 {
            return self.standalone(len);
        }
        let mut current = self
            .inner
            .current
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let mut page = match current.take() {
            Some(page) if align_up(page.cursor) + len <= page.store.capacity() => page,
            retired => {
                if retired.is_some() {
                    trace!("retiring exhausted pool page");
                }
                CurrentPage {
                    store: self.new_page(pool_size)?,
                    cursor: 0,
                }
            }
        };
        let offset = align_up(page.cursor);
        page.cursor = offset + len;
        let store = Arc::clone(&page.store);
        *current = Some(page);
        self.inner.carves.fetch_add(1, Ordering::Relaxed);
        Ok(Lease { store, offset, len })
    }

    /// Fast-path allocation with every byte guaranteed zero
    ///
    /// # Errors
    ///
    /// Same failure modes as [`Self::alloc_fast`].
    pub fn alloc_zeroed(&self, len: usize) -> Result<Lease> {
        let lease = self.alloc_fast(len)?;
        if lease.len > 0 {
            // SAFETY: the carve is exclusive until the lease is handed out
            unsafe { lease.store.bytes_mut(lease.offset, lease.len) }.fill(0);
        }
        Ok(lease)
    }

    /// Slow-path allocation: a standalone store that never touches the
    /// pool and releases its memory the moment the last view drops
    ///
    /// # Errors
    ///
    /// Returns an error if the allocation fails.
    pub fn alloc_dedicated(&self, len: usize) -> Result<Lease> {
        self.standalone(len)
    }

    /// Snapshot of the pool counters
    #[must_use]
    pub fn stats(&self) -> PoolStats {
        PoolStats {
            pages_created: self.inner.pages_created.load(Ordering::Relaxed),
            pages_recycled: self.inner.pages_recycled.load(Ordering::Relaxed),
            pages_discarded: self.inner.pages_discarded.load(Ordering::Relaxed),
            carves: self.inner.carves.load(Ordering::Relaxed),
            dedicated: self.inner.dedicated.load(Ordering::Relaxed),
            free_pages: self
                .inner
                .free
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .len(),
        }
    }

    fn standalone(&self, len: usize) -> Result<Lease> {
        self.inner.dedicated.fetch_add(1, Ordering::Relaxed);
        Ok(Lease {
            store: BackingStore::zeroed(len)?,
            offset: 0,
            len,
        })
    }

    fn new_page(&self, pool_size: usize) -> Result<Arc<BackingStore>> {
        let reused = {
            let mut free = self
                .inner
                .free
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            free.iter()
                .position(|page| page.len() >= pool_size)
                .map(|index| free.swap_remove(index))
        };
        let bytes = match reused {
            Some(bytes) => {
                self.inner.pages_recycled.fetch_add(1, Ordering::Relaxed);
                trace!(capacity = bytes.len(), "reusing retired pool page");
                bytes
            }
            None => {
                self.inner.pages_created.fetch_add(1, Ordering::Relaxed);
                debug!(capacity = pool_size, "allocating fresh pool page");
                alloc_bytes(pool_size)?
            }
        };
        let inner: Arc<dyn Recycler> = self.inner.clone();
        let recycler: Weak<dyn Recycler> = Arc::downgrade(&inner);
        Ok(BackingStore::recycled(bytes, recycler))
    }
}

impl Default for PagePool {
    fn default() -> Self {
        Self::new(PoolConfig::default())
    }
}

const fn align_up(cursor: usize) -> usize {
    (cursor + CARVE_ALIGN - 1) & !(CARVE_ALIGN - 1)
}
