//! Caching for the SpecGen client.
//!
//! Two layers with different lifetimes:
//! - [`MemoryCache`]: bounded in-process map with per-entry TTL, used to
//!   short-circuit repeated summary fetches within a session.
//! - [`SnapshotStore`]: durable single-slot snapshot of the library list,
//!   used for cache-first mounting and offline fallback across sessions.

mod memory;
mod snapshot;

pub use memory::MemoryCache;
pub use snapshot::{SnapshotEntry, SnapshotStore};
