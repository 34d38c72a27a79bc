//! TagCache - an in-process key/value cache
//!
//! Provides value expiry, tag-based grouping and tag-driven bulk invalidation
//! ("events"), with an optional periodic expiry sweep and JSON snapshots.

pub mod cache;
pub mod clock;
pub mod config;
pub mod engine;
pub mod error;
pub mod logging;
mod tasks;

pub use cache::{
    CacheStats, ExportOptions, GetOptions, Item, KeySet, SetOptions, Snapshot, SnapshotSource,
    TagOptions, TagSet, Timestamp,
};
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{CacheConfig, DEFAULT_GC_INTERVAL_SECS};
pub use engine::{Payload, TagCache};
pub use error::{CacheError, Result};
pub use logging::{LogSink, TracingSink};
