//! Key input normalization for operations that accept one key or many.

use serde_json::Value;

use crate::error::{CacheError, Result};

/// One or more keys. Unlike tags, a single string is never split.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeySet(Vec<String>);

impl KeySet {
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<&str> for KeySet {
    fn from(key: &str) -> Self {
        Self(vec![key.to_string()])
    }
}

impl From<String> for KeySet {
    fn from(key: String) -> Self {
        Self(vec![key])
    }
}

impl From<&String> for KeySet {
    fn from(key: &String) -> Self {
        Self(vec![key.clone()])
    }
}

impl From<Vec<String>> for KeySet {
    fn from(keys: Vec<String>) -> Self {
        Self(keys)
    }
}

impl From<Vec<&str>> for KeySet {
    fn from(keys: Vec<&str>) -> Self {
        Self(keys.into_iter().map(str::to_string).collect())
    }
}

impl From<&[&str]> for KeySet {
    fn from(keys: &[&str]) -> Self {
        Self(keys.iter().map(|k| k.to_string()).collect())
    }
}

impl<const N: usize> From<[&str; N]> for KeySet {
    fn from(keys: [&str; N]) -> Self {
        Self(keys.iter().map(|k| k.to_string()).collect())
    }
}

impl TryFrom<&Value> for KeySet {
    type Error = CacheError;

    fn try_from(value: &Value) -> Result<Self> {
        match value {
            Value::String(key) => Ok(Self(vec![key.clone()])),
            Value::Array(items) => items
                .iter()
                .map(|item| {
                    item.as_str().map(str::to_string).ok_or_else(|| {
                        CacheError::InvalidArgument(format!("keys must be strings, got {}", item))
                    })
                })
                .collect::<Result<Vec<_>>>()
                .map(Self),
            other => Err(CacheError::InvalidArgument(format!(
                "key must be a string or an array of strings, got {}",
                other
            ))),
        }
    }
}
