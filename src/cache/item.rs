//! Cache Item Module
//!
//! Defines the structure for individual cache items with expiry and tags.

use serde::{Deserialize, Serialize};

/// Absolute time in whole seconds since the Unix epoch.
pub type Timestamp = i64;

// == Cache Item ==
/// Represents a single cache item with payload and metadata.
///
/// `tags: None` (untagged) is a different state from `Some(vec![])`; tag
/// queries never match an untagged item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item<V> {
    /// The key the item is stored under
    pub key: String,
    /// The caller-supplied value
    pub payload: V,
    /// Tags in the order given, or None when untagged
    pub tags: Option<Vec<String>>,
    /// Absolute expiry timestamp, None = never expires
    pub expires: Option<Timestamp>,
    /// Timestamp of the most recent `set` for this key
    pub created: Timestamp,
}

impl<V> Item<V> {
    // == Constructor ==
    /// Creates a new item stamped with `now`.
    pub fn new(
        key: impl Into<String>,
        payload: V,
        tags: Option<Vec<String>>,
        expires: Option<Timestamp>,
        now: Timestamp,
    ) -> Self {
        Self {
            key: key.into(),
            payload,
            tags,
            expires,
            created: now,
        }
    }

    // == Freshness ==
    /// Checks the item against its `expires` field.
    ///
    /// Fresh when there is no expiry or the expiry is strictly after `now`.
    pub fn is_fresh(&self, now: Timestamp) -> bool {
        match self.expires {
            Some(expires) => expires > now,
            None => true,
        }
    }

    /// Checks the item's age against `max_age` seconds, ignoring `expires`.
    pub fn is_younger_than(&self, max_age: u64, now: Timestamp) -> bool {
        let age = now.saturating_sub(self.created);
        i128::from(max_age) > i128::from(age)
    }

    /// True when `expires` is a timestamp strictly before `now`.
    ///
    /// This is the sweep predicate; an item expiring exactly at `now` is
    /// already stale for `get` but is only swept on the next second.
    pub fn is_expired(&self, now: Timestamp) -> bool {
        matches!(self.expires, Some(expires) if expires < now)
    }

    /// Returns true if the item never expires.
    pub fn is_persistent(&self) -> bool {
        self.expires.is_none()
    }
}
