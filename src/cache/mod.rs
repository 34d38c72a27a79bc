//! Cache Module
//!
//! Provides in-memory item storage with expiry, tags and snapshots.

mod item;
mod keys;
mod options;
mod snapshot;
mod stats;
mod store;
mod tags;


// Re-export public types
pub use item::{Item, Timestamp};
pub use keys::KeySet;
pub use options::{ExportOptions, GetOptions, SetOptions, TagOptions};
pub use snapshot::{Snapshot, SnapshotSource};
pub use stats::CacheStats;
pub use store::CacheStore;
pub use tags::TagSet;
