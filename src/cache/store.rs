//! Cache Store Module
//!
//! The core map and every mutation, expiry and tag-matching rule. The store
//! does no locking and reads no clock: callers pass `now` and hold whatever
//! lock guards the store for the duration of a call.

use indexmap::IndexMap;

use crate::cache::item::{Item, Timestamp};
use crate::cache::keys::KeySet;
use crate::cache::options::{ExportOptions, GetOptions, SetOptions, TagOptions};
use crate::cache::snapshot::Snapshot;
use crate::cache::stats::CacheStats;
use crate::cache::tags::TagSet;

// == Cache Store ==
/// Insertion-ordered item storage.
#[derive(Debug, Clone)]
pub struct CacheStore<V> {
    /// Key-item storage; a re-`set` keeps the key's original position
    items: IndexMap<String, Item<V>>,
    /// Lookup and sweep statistics
    stats: CacheStats,
}

impl<V> Default for CacheStore<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> CacheStore<V> {
    // == Constructor ==
    pub fn new() -> Self {
        Self {
            items: IndexMap::new(),
            stats: CacheStats::new(),
        }
    }

    /// Creates a store holding the items of `snapshot`, in snapshot order.
    pub fn from_snapshot(snapshot: Snapshot<V>) -> Self {
        Self {
            items: snapshot,
            stats: CacheStats::new(),
        }
    }

    // == Set ==
    /// Stores `payload` under `key`, replacing any prior item wholesale.
    ///
    /// `created` is always reset to `now`, and the expiry is recomputed from
    /// `options` rather than carried over.
    pub fn set(&mut self, key: &str, payload: V, options: SetOptions, now: Timestamp) {
        let expires = options.resolve_expiry(now);
        let tags = options.tags.map(TagSet::into_vec);
        self.items
            .insert(key.to_string(), Item::new(key, payload, tags, expires, now));
    }

    // == Get Meta ==
    /// Returns the raw item with no freshness check.
    pub fn get_meta(&self, key: &str) -> Option<&Item<V>> {
        self.items.get(key)
    }

    /// Returns true if `key` is stored, fresh or not.
    pub fn contains(&self, key: &str) -> bool {
        self.items.contains_key(key)
    }

    // == Delete ==
    /// Removes each present key and returns how many were removed.
    pub fn delete(&mut self, keys: &KeySet) -> usize {
        keys.iter()
            .filter(|key| self.items.shift_remove(*key).is_some())
            .count()
    }

    // == Clear ==
    pub fn clear(&mut self) {
        self.items.clear();
    }

    // == Keys ==
    /// Returns every stored key in store order.
    pub fn keys(&self) -> Vec<String> {
        self.items.keys().cloned().collect()
    }

    fn tag_matches<'a>(
        &'a self,
        tags: &'a TagSet,
        options: TagOptions,
    ) -> impl Iterator<Item = (&'a String, &'a Item<V>)> + 'a {
        self.items
            .iter()
            .filter(move |(_, item)| tags.matches(item.tags.as_deref(), options.all))
    }

    // == Get Tagged Meta ==
    /// Returns the matching items themselves. No freshness filtering.
    pub fn get_tagged_meta(&self, tags: &TagSet, options: TagOptions) -> IndexMap<String, Item<V>>
    where
        V: Clone,
    {
        self.tag_matches(tags, options)
            .map(|(key, item)| (key.clone(), item.clone()))
            .collect()
    }

    // == Delete Tagged ==
    /// Removes every item matching `tags` and returns the count. Stale items
    /// are removed and counted like any other.
    pub fn delete_tagged(&mut self, tags: &TagSet, options: TagOptions) -> usize {
        let before = self.items.len();
        self.items
            .retain(|_, item| !tags.matches(item.tags.as_deref(), options.all));
        before - self.items.len()
    }

    // == Delete Expired ==
    /// Removes every item whose expiry is strictly before `now`.
    ///
    /// Returns the number of items removed.
    pub fn delete_expired(&mut self, now: Timestamp) -> usize {
        let before = self.items.len();
        self.items.retain(|_, item| !item.is_expired(now));
        let removed = before - self.items.len();
        self.stats.record_sweep(removed);
        removed
    }

    // == Import ==
    /// Replaces the entire contents with `snapshot`. Statistics are kept.
    pub fn import(&mut self, snapshot: Snapshot<V>) {
        self.items = snapshot;
    }

    // == Stats ==
    /// Returns current cache statistics.
    pub fn stats(&self) -> CacheStats {
        let mut stats = self.stats.clone();
        stats.set_total_entries(self.items.len());
        stats
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl<V: Clone> CacheStore<V> {
    // == Lookup ==
    /// Resolves a lookup and records the hit or miss. A miss is always None
    /// (`options.default` is applied by the engine) and never removes the
    /// stale item.
    ///
    /// # Resolution order
    /// 1. absent key → miss
    /// 2. `force` → hit
    /// 3. `max_age` → hit iff the item is younger than `max_age`; `expires`
    ///    is not consulted at all
    /// 4. otherwise → hit iff the item is fresh by its `expires`
    pub fn lookup(&mut self, key: &str, options: &GetOptions<V>, now: Timestamp) -> Option<V> {
        let hit = self.items.get(key).and_then(|item| {
            let fresh = if options.force {
                true
            } else if let Some(max_age) = options.max_age {
                item.is_younger_than(max_age, now)
            } else {
                item.is_fresh(now)
            };
            fresh.then(|| item.payload.clone())
        });

        if hit.is_some() {
            self.stats.record_hit();
        } else {
            self.stats.record_miss();
        }
        hit
    }

    // == Get Tagged ==
    /// Returns key → payload for every item matching `tags`.
    ///
    /// Stale items are included; run a sweep first to exclude them.
    pub fn get_tagged(&self, tags: &TagSet, options: TagOptions) -> IndexMap<String, V> {
        self.tag_matches(tags, options)
            .map(|(key, item)| (key.clone(), item.payload.clone()))
            .collect()
    }

    // == Export ==
    /// Copies the store for export.
    ///
    /// - `persistent`: only never-expiring items
    /// - `expired`: every item as stored
    /// - default: sweep expired items first, then copy the rest
    pub fn export(&mut self, options: ExportOptions, now: Timestamp) -> Snapshot<V> {
        if options.persistent {
            return self
                .items
                .iter()
                .filter(|(_, item)| item.is_persistent())
                .map(|(key, item)| (key.clone(), item.clone()))
                .collect();
        }
        if !options.expired {
            self.delete_expired(now);
        }
        self.items.clone()
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    const NOW: Timestamp = 1_700_000_000;

    fn store_with(entries: &[(&str, Option<&str>, Option<i64>)]) -> CacheStore<String> {
        let mut store = CacheStore::new();
        for (key, tags, expire_in) in entries {
            let mut options = SetOptions::new();
            if let Some(tags) = tags {
                options = options.tags(*tags);
            }
            if let Some(seconds) = expire_in {
                options = options.expire_in(*seconds);
            }
            store.set(key, format!("{}-value", key), options, NOW);
        }
        store
    }

    #[test]
    fn test_store_new() {
        let store: CacheStore<String> = CacheStore::new();
        assert_eq!(store.len(), 0);
        assert!(store.is_empty());
    }

    #[test]
    fn test_store_set_and_get() {
        let mut store = store_with(&[("key1", None, None)]);

        let value = store.lookup("key1", &GetOptions::new(), NOW);
        assert_eq!(value.as_deref(), Some("key1-value"));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_store_lookup_missing_ignores_default() {
        let mut store: CacheStore<String> = CacheStore::new();

        let options = GetOptions::new().default_value("dflt".to_string());
        assert_eq!(store.lookup("nope", &options, NOW), None);
    }

    #[test]
    fn test_store_overwrite_replaces_everything() {
        let mut store: CacheStore<&str> = CacheStore::new();
        store.set("k", "v1", SetOptions::new().tags("a").expire_in(10), NOW);
        store.set("k", "v2", SetOptions::new(), NOW + 5);

        let item = store.get_meta("k").unwrap();
        assert_eq!(item.payload, "v2");
        assert_eq!(item.tags, None);
        assert_eq!(item.expires, None);
        assert_eq!(item.created, NOW + 5);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_store_reset_keeps_key_position() {
        let mut store = store_with(&[("a", None, None), ("b", None, None)]);
        store.set("a", "again".to_string(), SetOptions::new(), NOW);
        assert_eq!(store.keys(), vec!["a", "b"]);
    }

    #[test]
    fn test_stale_get_misses_without_deleting() {
        let mut store = store_with(&[("k", None, Some(10))]);

        assert!(store.lookup("k", &GetOptions::new(), NOW + 9).is_some());
        assert!(store.lookup("k", &GetOptions::new(), NOW + 10).is_none());
        assert!(store.contains("k"));
    }

    #[test]
    fn test_expire_in_the_past_misses_immediately() {
        let mut store = store_with(&[("k", None, Some(-1))]);
        assert!(store.lookup("k", &GetOptions::new(), NOW).is_none());
    }

    #[test]
    fn test_max_age_overrides_expires() {
        let mut store: CacheStore<u32> = CacheStore::new();
        store.set("future", 1, SetOptions::new().expire_in(3600), NOW);
        store.set("past", 2, SetOptions::new().expire_at(NOW - 100), NOW);

        let later = NOW + 30;
        // Future expiry, but too old
        assert_eq!(store.lookup("future", &GetOptions::new().max_age(30), later), None);
        // Past expiry, but young enough
        assert_eq!(store.lookup("past", &GetOptions::new().max_age(31), later), Some(2));
    }

    #[test]
    fn test_force_ignores_freshness() {
        let mut store = store_with(&[("k", None, Some(-100))]);
        let value = store.lookup("k", &GetOptions::new().force().max_age(0), NOW);
        assert_eq!(value.as_deref(), Some("k-value"));
    }

    #[test]
    fn test_delete_counts_only_present_keys() {
        let mut store = store_with(&[("a", None, None), ("b", None, None), ("c", None, None)]);

        assert_eq!(store.delete(&KeySet::from(["a", "missing", "c"])), 2);
        assert_eq!(store.delete(&KeySet::from("a")), 0);
        assert_eq!(store.keys(), vec!["b"]);
    }

    #[test]
    fn test_clear() {
        let mut store = store_with(&[("a", None, None), ("b", Some("x"), Some(5))]);
        store.clear();
        assert!(store.is_empty());
    }

    #[test]
    fn test_get_tagged_any_and_all() {
        let store = store_with(&[
            ("one", Some("foo bar"), None),
            ("two", Some("bar"), None),
            ("three", None, None),
        ]);

        let any = store.get_tagged(&TagSet::from("foo bar"), TagOptions::any());
        assert_eq!(any.keys().collect::<Vec<_>>(), vec!["one", "two"]);

        let all = store.get_tagged(&TagSet::from("foo bar"), TagOptions::all());
        assert_eq!(all.keys().collect::<Vec<_>>(), vec!["one"]);
        assert_eq!(all["one"], "one-value");

        assert!(store.get_tagged(&TagSet::from("zzz"), TagOptions::any()).is_empty());
    }

    #[test]
    fn test_get_tagged_includes_stale_items() {
        let store = store_with(&[("old", Some("t"), Some(-10))]);
        let meta = store.get_tagged_meta(&TagSet::from("t"), TagOptions::any());
        assert_eq!(meta["old"].expires, Some(NOW - 10));
    }

    #[test]
    fn test_delete_tagged_all_requires_superset() {
        let mut store = store_with(&[("ab", Some("a b"), None), ("a", Some("a"), None)]);

        assert_eq!(store.delete_tagged(&TagSet::from("a b"), TagOptions::all()), 1);
        assert!(store.contains("a"));
        assert!(!store.contains("ab"));
    }

    #[test]
    fn test_delete_tagged_counts_stale_items() {
        let mut store = store_with(&[("old", Some("on.save"), Some(-10)), ("plain", None, None)]);
        assert_eq!(store.delete_tagged(&TagSet::from("on.save"), TagOptions::any()), 1);
        assert_eq!(store.keys(), vec!["plain"]);
    }

    #[test]
    fn test_delete_expired_is_strict_and_idempotent() {
        let mut store = store_with(&[
            ("forever", None, None),
            ("now", None, Some(0)),
            ("gone", None, Some(-1)),
            ("later", None, Some(60)),
        ]);

        assert_eq!(store.delete_expired(NOW), 1);
        assert_eq!(store.keys(), vec!["forever", "now", "later"]);
        assert_eq!(store.delete_expired(NOW), 0);

        let stats = store.stats();
        assert_eq!(stats.sweeps, 2);
        assert_eq!(stats.expired_removed, 1);
    }

    #[test]
    fn test_export_modes() {
        let mut store = store_with(&[
            ("forever", None, None),
            ("gone", None, Some(-1)),
            ("later", None, Some(60)),
        ]);

        let persistent = store.export(ExportOptions::persistent(), NOW);
        assert_eq!(persistent.keys().collect::<Vec<_>>(), vec!["forever"]);

        let raw = store.export(ExportOptions::expired(), NOW);
        assert_eq!(raw.len(), 3);
        assert_eq!(store.len(), 3);

        let live = store.export(ExportOptions::default(), NOW);
        assert_eq!(live.keys().collect::<Vec<_>>(), vec!["forever", "later"]);
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_import_replaces_contents() {
        let mut source = store_with(&[("x", Some("t"), None)]);
        let snapshot = source.export(ExportOptions::default(), NOW);

        let mut store = store_with(&[("y", None, None)]);
        store.import(snapshot.clone());
        assert_eq!(store.keys(), vec!["x"]);
        assert_eq!(store.get_meta("x"), snapshot.get("x"));
    }

    #[test]
    fn test_store_stats() {
        let mut store = store_with(&[("key1", None, None)]);
        store.lookup("key1", &GetOptions::new(), NOW);
        store.lookup("nonexistent", &GetOptions::new(), NOW);

        let stats = store.stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.total_entries, 1);
    }
}
