//! Configuration Module
//!
//! The construction contract shared by `TagCache::new` and `TagCache::spawn`.

use std::env;
use std::fmt;
use std::sync::Arc;

use crate::cache::SnapshotSource;
use crate::clock::{Clock, SystemClock};
use crate::logging::LogSink;

/// Default interval between scheduled expiry sweeps, in seconds.
pub const DEFAULT_GC_INTERVAL_SECS: u64 = 600;

/// Engine configuration.
///
/// # Fields
/// - `state`: snapshot to preload, same shapes `import` accepts
/// - `gc_interval_secs`: sweep interval used by `sweep_start(None)`
/// - `logger`: optional `[cache-<op>]` line sink
/// - `clock`: time source, wall clock by default
#[derive(Clone)]
pub struct CacheConfig<V> {
    pub state: Option<SnapshotSource<V>>,
    pub gc_interval_secs: u64,
    pub logger: Option<Arc<dyn LogSink>>,
    pub clock: Arc<dyn Clock>,
}

impl<V> CacheConfig<V> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a new CacheConfig, reading overrides from the environment.
    ///
    /// # Environment Variables
    /// - `TAGCACHE_GC_INTERVAL` - Sweep interval in seconds (default: 600)
    pub fn from_env() -> Self {
        Self {
            gc_interval_secs: env::var("TAGCACHE_GC_INTERVAL")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_GC_INTERVAL_SECS),
            ..Self::default()
        }
    }

    pub fn with_state(mut self, state: impl Into<SnapshotSource<V>>) -> Self {
        self.state = Some(state.into());
        self
    }

    pub fn with_gc_interval(mut self, seconds: u64) -> Self {
        self.gc_interval_secs = seconds;
        self
    }

    pub fn with_logger(mut self, logger: impl LogSink + 'static) -> Self {
        self.logger = Some(Arc::new(logger));
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }
}

impl<V> Default for CacheConfig<V> {
    fn default() -> Self {
        Self {
            state: None,
            gc_interval_secs: DEFAULT_GC_INTERVAL_SECS,
            logger: None,
            clock: Arc::new(SystemClock),
        }
    }
}

impl<V> fmt::Debug for CacheConfig<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CacheConfig")
            .field("state", &self.state.is_some())
            .field("gc_interval_secs", &self.gc_interval_secs)
            .field("logger", &self.logger.is_some())
            .field("clock", &self.clock)
            .finish()
    }
}
