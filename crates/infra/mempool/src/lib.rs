//! Memory pools for the ByteMill buffer engine
//!
//! Two pools live here, with different jobs. The [`PagePool`] serves the
//! public allocation surface: small allocations are carved out of shared
//! pool pages, large or dedicated ones get standalone backing stores.
//! The [`ScratchPool`] is internal to the codec layer: it lends out
//! transient buffers by size tier and is never observable in results.
//!
//! Neither pool synchronizes access to the bytes it hands out. Aliased
//! views racing on the same [`BackingStore`] are the caller's locking
//! problem; the pools only guarantee that their own free lists survive
//! concurrent checkout and return.

pub mod page;
pub mod scratch;
pub mod store;

pub use page::{Lease, PagePool, PoolConfig, PoolStats};
pub use scratch::{ScratchHandle, ScratchPool, ScratchStats, Tier};
pub use store::{BackingStore, Recycler};
