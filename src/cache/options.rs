//! Per-operation option structures
//!
//! Every option struct deserializes from camelCase JSON so option objects
//! coming from configuration files map directly. Unknown fields are ignored.

use serde::Deserialize;

use crate::cache::item::Timestamp;
use crate::cache::tags::TagSet;

/// Options for [`TagCache::set`](crate::TagCache::set).
///
/// # Fields
/// - `expire_in`: lifetime in seconds relative to now; may be negative
/// - `expire_at`: absolute expiry, ignored when `expire_in` is given
/// - `tags`: tags for the item; None leaves the item untagged
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SetOptions {
    pub expire_in: Option<i64>,
    pub expire_at: Option<Timestamp>,
    pub tags: Option<TagSet>,
}

impl SetOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn expire_in(mut self, seconds: i64) -> Self {
        self.expire_in = Some(seconds);
        self
    }

    pub fn expire_at(mut self, timestamp: Timestamp) -> Self {
        self.expire_at = Some(timestamp);
        self
    }

    pub fn tags(mut self, tags: impl Into<TagSet>) -> Self {
        self.tags = Some(tags.into());
        self
    }

    /// Resolves the absolute expiry for an item stored at `now`.
    pub fn resolve_expiry(&self, now: Timestamp) -> Option<Timestamp> {
        match self.expire_in {
            Some(seconds) => Some(now.saturating_add(seconds)),
            None => self.expire_at,
        }
    }
}

/// Options for [`TagCache::get`](crate::TagCache::get).
///
/// Resolution order: `force`, then `max_age`, then the item's own expiry.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GetOptions<V> {
    /// Returned instead of `None` on a miss
    pub default: Option<V>,
    /// Maximum age in seconds; replaces the `expires` check when set
    pub max_age: Option<u64>,
    /// Skip every freshness check
    pub force: bool,
}

impl<V> Default for GetOptions<V> {
    fn default() -> Self {
        Self {
            default: None,
            max_age: None,
            force: false,
        }
    }
}

impl<V> GetOptions<V> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn default_value(mut self, value: V) -> Self {
        self.default = Some(value);
        self
    }

    pub fn max_age(mut self, seconds: u64) -> Self {
        self.max_age = Some(seconds);
        self
    }

    pub fn force(mut self) -> Self {
        self.force = true;
        self
    }
}

/// Options for the tag queries and bulk tag deletes.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(default)]
pub struct TagOptions {
    /// Require every queried tag instead of any one of them
    pub all: bool,
}

impl TagOptions {
    pub fn any() -> Self {
        Self { all: false }
    }

    pub fn all() -> Self {
        Self { all: true }
    }
}

/// Options for [`TagCache::export`](crate::TagCache::export).
///
/// `persistent` wins when both flags are set.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(default)]
pub struct ExportOptions {
    /// Only items that never expire
    pub persistent: bool,
    /// Every item, stale ones included, without sweeping first
    pub expired: bool,
}

impl ExportOptions {
    pub fn persistent() -> Self {
        Self {
            persistent: true,
            expired: false,
        }
    }

    pub fn expired() -> Self {
        Self {
            persistent: false,
            expired: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_expire_in_wins_over_expire_at() {
        let opts = SetOptions::new().expire_at(50).expire_in(10);
        assert_eq!(opts.resolve_expiry(100), Some(110));

        let opts = SetOptions::new().expire_at(50);
        assert_eq!(opts.resolve_expiry(100), Some(50));

        assert_eq!(SetOptions::new().resolve_expiry(100), None);
    }

    #[test]
    fn test_set_options_deserialize() {
        let opts: SetOptions =
            serde_json::from_value(json!({"expireIn": 60, "tags": "a b", "unknown": true}))
                .unwrap();
        assert_eq!(opts.expire_in, Some(60));
        assert_eq!(opts.tags, Some(TagSet::from(["a", "b"])));
    }

    #[test]
    fn test_set_options_rejects_bad_tags() {
        let result = serde_json::from_value::<SetOptions>(json!({"tags": 7}));
        assert!(result.is_err());
    }

    #[test]
    fn test_get_options_deserialize() {
        let opts: GetOptions<String> =
            serde_json::from_value(json!({"default": "none", "maxAge": 5})).unwrap();
        assert_eq!(opts.default.as_deref(), Some("none"));
        assert_eq!(opts.max_age, Some(5));
        assert!(!opts.force);
    }

    #[test]
    fn test_flag_options_default_off() {
        assert!(!TagOptions::default().all);
        let export = ExportOptions::default();
        assert!(!export.persistent && !export.expired);
    }
}
