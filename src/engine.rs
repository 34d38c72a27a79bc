//! Cache Engine
//!
//! `TagCache` owns one store behind a lock, the clock it stamps items with,
//! the optional event sink and the handle of the periodic expiry sweep.
//! Every public operation holds the store lock for its whole duration.

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use parking_lot::{Mutex, RwLock};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info};

use crate::cache::{
    CacheStats, CacheStore, ExportOptions, GetOptions, Item, KeySet, SetOptions, Snapshot,
    SnapshotSource, TagOptions, TagSet,
};
use crate::clock::Clock;
use crate::config::CacheConfig;
use crate::error::{CacheError, Result};
use crate::logging::EventLog;
use crate::tasks::{spawn_sweep_task, SweepHandle};

/// Values the engine can store, export and import.
pub trait Payload: Clone + Serialize + DeserializeOwned + Send + Sync + 'static {}

impl<T> Payload for T where T: Clone + Serialize + DeserializeOwned + Send + Sync + 'static {}

// == Tag Cache ==
/// An isolated cache instance.
///
/// # Example
/// ```
/// use serde_json::json;
/// use tagcache::{CacheConfig, GetOptions, SetOptions, TagCache, TagOptions};
///
/// let cache: TagCache = TagCache::new(CacheConfig::default()).unwrap();
/// cache.set("k", json!("v"), SetOptions::new().tags("foo bar"));
///
/// assert_eq!(cache.get("k", GetOptions::new()), Some(json!("v")));
/// assert_eq!(cache.get_tagged("foo", TagOptions::any()).len(), 1);
/// assert_eq!(cache.delete_tagged("bar", TagOptions::all()), 1);
/// assert_eq!(cache.get("k", GetOptions::new()), None);
/// ```
pub struct TagCache<V = Value> {
    store: Arc<RwLock<CacheStore<V>>>,
    clock: Arc<dyn Clock>,
    events: EventLog,
    gc_interval_secs: u64,
    sweep: Mutex<Option<SweepHandle>>,
}

impl<V: Payload> TagCache<V> {
    // == Constructor ==
    /// Creates an engine, preloading `config.state` if given.
    ///
    /// # Errors
    /// `InvalidSnapshot` if the preload state has the wrong shape.
    pub fn new(config: CacheConfig<V>) -> Result<Self> {
        let store = match config.state {
            Some(source) => CacheStore::from_snapshot(source.into_snapshot()?),
            None => CacheStore::new(),
        };
        info!(
            entries = store.len(),
            gc_interval_secs = config.gc_interval_secs,
            "Cache engine created"
        );

        Ok(Self {
            store: Arc::new(RwLock::new(store)),
            clock: config.clock,
            events: EventLog::new(config.logger),
            gc_interval_secs: config.gc_interval_secs,
            sweep: Mutex::new(None),
        })
    }

    /// Creates another engine with its own store and sweep; nothing is
    /// shared with `self`.
    pub fn spawn(&self, config: CacheConfig<V>) -> Result<Self> {
        Self::new(config)
    }

    // == Set ==
    /// Stores `payload` under `key`, replacing any existing item and
    /// resetting its creation time.
    pub fn set(&self, key: &str, payload: V, options: SetOptions) {
        let now = self.clock.now();
        let expires = options.resolve_expiry(now);
        let tags = options
            .tags
            .as_ref()
            .map_or_else(|| "none".to_string(), |t| t.as_slice().join(" "));

        self.store.write().set(key, payload, options, now);

        debug!(key, expires = ?expires, "Item set");
        self.events.emit("set", || {
            let expires = expires.map_or_else(|| "never".to_string(), |t| t.to_string());
            format!("{} (expires: {}, tags: {})", key, expires, tags)
        });
    }

    // == Get ==
    /// Looks up `key`, returning `options.default` on a miss.
    ///
    /// A stale item misses but stays stored until swept or deleted.
    pub fn get(&self, key: &str, options: GetOptions<V>) -> Option<V> {
        let now = self.clock.now();
        let found = self.store.write().lookup(key, &options, now);

        let outcome = if found.is_some() { "hit" } else { "miss" };
        debug!(key, outcome, "Item lookup");
        self.events.emit("get", || format!("{} {}", key, outcome));
        found.or(options.default)
    }

    // == Get Meta ==
    /// Returns a copy of the stored item with no freshness check.
    pub fn get_meta(&self, key: &str) -> Option<Item<V>> {
        let item = self.store.read().get_meta(key).cloned();
        self.events.emit("get-meta", || {
            format!("{} {}", key, if item.is_some() { "found" } else { "missing" })
        });
        item
    }

    /// Returns true if `key` is stored, fresh or not.
    pub fn has(&self, key: &str) -> bool {
        self.store.read().contains(key)
    }

    // == Delete ==
    /// Deletes one key or many; returns how many were actually present.
    pub fn delete(&self, keys: impl Into<KeySet>) -> usize {
        let keys = keys.into();
        let removed = self.store.write().delete(&keys);

        debug!(requested = keys.len(), removed, "Keys deleted");
        self.events.emit("delete", || {
            format!("{} removed {}", keys.iter().collect::<Vec<_>>().join(", "), removed)
        });
        removed
    }

    // == Clear ==
    pub fn clear(&self) {
        let removed = {
            let mut store = self.store.write();
            let removed = store.len();
            store.clear();
            removed
        };

        info!(removed, "Cache cleared");
        self.events.emit("clear", || format!("removed {} items", removed));
    }

    /// Every stored key, in insertion order.
    pub fn keys(&self) -> Vec<String> {
        self.store.read().keys()
    }

    pub fn len(&self) -> usize {
        self.store.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.read().is_empty()
    }

    pub fn stats(&self) -> CacheStats {
        self.store.read().stats()
    }

    // == Get Tagged ==
    /// Returns key → payload for every item matching `tags`.
    ///
    /// No freshness filtering is done; call `delete_expired` first to leave
    /// stale items out.
    pub fn get_tagged(&self, tags: impl Into<TagSet>, options: TagOptions) -> IndexMap<String, V> {
        let tags = tags.into();
        let matched = self.store.read().get_tagged(&tags, options);
        self.log_tag_query("get-tagged", &tags, options, matched.len());
        matched
    }

    /// Like [`get_tagged`](Self::get_tagged) but returns whole items.
    pub fn get_tagged_meta(
        &self,
        tags: impl Into<TagSet>,
        options: TagOptions,
    ) -> IndexMap<String, Item<V>> {
        let tags = tags.into();
        let matched = self.store.read().get_tagged_meta(&tags, options);
        self.log_tag_query("get-tagged", &tags, options, matched.len());
        matched
    }

    // == Delete Tagged ==
    /// Deletes every item matching `tags`, stale or not, and returns the count.
    pub fn delete_tagged(&self, tags: impl Into<TagSet>, options: TagOptions) -> usize {
        self.remove_tagged("delete-tagged", tags.into(), options)
    }

    // == Trigger ==
    /// Fires an event: deletes every item tagged with it.
    ///
    /// Same as [`delete_tagged`](Self::delete_tagged); event tags are
    /// conventionally prefixed, e.g. `on.user-update`.
    pub fn trigger(&self, events: impl Into<TagSet>, options: TagOptions) -> usize {
        self.remove_tagged("trigger", events.into(), options)
    }

    fn remove_tagged(&self, op: &str, tags: TagSet, options: TagOptions) -> usize {
        let removed = self.store.write().delete_tagged(&tags, options);
        info!(op, tags = ?tags.as_slice(), all = options.all, removed, "Tagged items removed");
        self.log_tag_query(op, &tags, options, removed);
        removed
    }

    fn log_tag_query(&self, op: &str, tags: &TagSet, options: TagOptions, count: usize) {
        self.events.emit(op, || {
            format!(
                "{} ({}) {} {}",
                tags.as_slice().join(" "),
                if options.all { "all" } else { "any" },
                if op == "get-tagged" { "matched" } else { "removed" },
                count
            )
        });
    }

    // == Delete Expired ==
    /// Removes every item whose expiry has passed; returns the count.
    pub fn delete_expired(&self) -> usize {
        let now = self.clock.now();
        let removed = self.store.write().delete_expired(now);

        info!(removed, "Expired items removed");
        self.events.emit("delete-expired", || format!("removed {} items", removed));
        removed
    }

    // == Sweep Start ==
    /// (Re)starts the periodic expiry sweep, every `interval_secs` seconds or
    /// the configured `gc_interval_secs` when None. A running sweep is
    /// stopped first.
    ///
    /// # Errors
    /// - `InvalidArgument` for a zero interval
    /// - `NoRuntime` outside a Tokio runtime
    pub fn sweep_start(&self, interval_secs: Option<u64>) -> Result<()> {
        let interval_secs = interval_secs.unwrap_or(self.gc_interval_secs);
        if interval_secs == 0 {
            return Err(CacheError::InvalidArgument(
                "sweep interval must be at least one second".to_string(),
            ));
        }
        if tokio::runtime::Handle::try_current().is_err() {
            return Err(CacheError::NoRuntime);
        }

        let mut sweep = self.sweep.lock();
        if let Some(previous) = sweep.take() {
            previous.stop();
        }
        *sweep = Some(spawn_sweep_task(
            Arc::clone(&self.store),
            Arc::clone(&self.clock),
            self.events.clone(),
            interval_secs,
        ));
        drop(sweep);

        info!(interval_secs, "Expiry sweep scheduled");
        self.events.emit("sweep-start", || format!("every {}s", interval_secs));
        Ok(())
    }

    // == Sweep Stop ==
    /// Cancels the sweep; returns whether one was running.
    pub fn sweep_stop(&self) -> bool {
        let was_running = self
            .sweep
            .lock()
            .take()
            .map_or(false, SweepHandle::stop);

        if was_running {
            info!("Expiry sweep stopped");
        }
        let state = if was_running { "stopped" } else { "not running" };
        self.events.emit("sweep-stop", || state.to_string());
        was_running
    }

    // == Sweep Status ==
    pub fn sweep_status(&self) -> bool {
        self.sweep
            .lock()
            .as_ref()
            .map_or(false, SweepHandle::is_running)
    }

    /// Interval of the running sweep, if any.
    pub fn sweep_interval(&self) -> Option<u64> {
        self.sweep
            .lock()
            .as_ref()
            .filter(|handle| handle.is_running())
            .map(SweepHandle::interval_secs)
    }

    // == Export ==
    /// Serializes the store to JSON text.
    ///
    /// # Errors
    /// `Serialization` if any payload cannot be represented as JSON.
    pub fn export(&self, options: ExportOptions) -> Result<String> {
        let snapshot = self.export_snapshot(options);
        let text = serde_json::to_string(&snapshot)?;
        self.events.emit("export", || {
            format!("{} items ({})", snapshot.len(), export_mode(options))
        });
        Ok(text)
    }

    /// Copies the store without serializing it.
    ///
    /// The default mode sweeps expired items first, inside the same lock.
    pub fn export_snapshot(&self, options: ExportOptions) -> Snapshot<V> {
        let now = self.clock.now();
        let snapshot = self.store.write().export(options, now);
        debug!(items = snapshot.len(), mode = export_mode(options), "Store exported");
        snapshot
    }

    // == Import ==
    /// Replaces the whole store with `source`.
    ///
    /// # Errors
    /// `InvalidSnapshot` if `source` is not an object of items.
    pub fn import(&self, source: impl Into<SnapshotSource<V>>) -> Result<()> {
        let snapshot = source.into().into_snapshot()?;
        let count = snapshot.len();
        self.store.write().import(snapshot);

        info!(items = count, "Store imported");
        self.events.emit("import", || format!("{} items", count));
        Ok(())
    }

    // == Dispose ==
    /// Stops the sweep and releases the store. Consumes the engine.
    pub fn dispose(self) {
        self.sweep_stop();
        info!("Cache engine disposed");
    }
}

fn export_mode(options: ExportOptions) -> &'static str {
    if options.persistent {
        "persistent"
    } else if options.expired {
        "raw"
    } else {
        "live"
    }
}

impl<V: Payload> fmt::Debug for TagCache<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TagCache")
            .field("entries", &self.store.read().len())
            .field("clock", &self.clock)
            .field("events", &self.events)
            .field("gc_interval_secs", &self.gc_interval_secs)
            .field("sweep_running", &self.sweep_status())
            .finish()
    }
}
