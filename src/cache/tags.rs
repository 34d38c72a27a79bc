//! Tag Module
//!
//! Normalizes tag input and implements the any/all match predicates used by
//! the bulk tag operations.

use serde::Deserialize;
use serde_json::Value;

use crate::error::{CacheError, Result};

// == Tag Set ==
/// A normalized, ordered list of tags.
///
/// Built from a sequence of strings, or from a single string split on
/// whitespace. An empty or all-whitespace string yields no tags.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(try_from = "Value")]
pub struct TagSet(Vec<String>);

impl TagSet {
    /// Splits `input` on runs of whitespace, dropping leading/trailing blanks.
    pub fn parse(input: &str) -> Self {
        Self(input.split_whitespace().map(str::to_string).collect())
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_vec(self) -> Vec<String> {
        self.0
    }

    // == Any Match ==
    /// True iff `item_tags` contains at least one of the queried tags.
    ///
    /// Untagged items never match.
    pub fn matches_any(&self, item_tags: Option<&[String]>) -> bool {
        match item_tags {
            Some(tags) => self.0.iter().any(|query| tags.contains(query)),
            None => false,
        }
    }

    // == All Match ==
    /// True iff every queried tag is present in `item_tags`.
    ///
    /// Untagged items never match, and neither does an empty query.
    pub fn matches_all(&self, item_tags: Option<&[String]>) -> bool {
        match item_tags {
            Some(tags) if !self.0.is_empty() => self.0.iter().all(|query| tags.contains(query)),
            _ => false,
        }
    }

    /// Dispatches to [`matches_all`](Self::matches_all) or
    /// [`matches_any`](Self::matches_any).
    pub fn matches(&self, item_tags: Option<&[String]>, all: bool) -> bool {
        if all {
            self.matches_all(item_tags)
        } else {
            self.matches_any(item_tags)
        }
    }
}

impl From<&str> for TagSet {
    fn from(input: &str) -> Self {
        Self::parse(input)
    }
}

impl From<String> for TagSet {
    fn from(input: String) -> Self {
        Self::parse(&input)
    }
}

impl From<&String> for TagSet {
    fn from(input: &String) -> Self {
        Self::parse(input)
    }
}

impl From<Vec<String>> for TagSet {
    fn from(tags: Vec<String>) -> Self {
        Self(tags)
    }
}

impl From<Vec<&str>> for TagSet {
    fn from(tags: Vec<&str>) -> Self {
        Self(tags.into_iter().map(str::to_string).collect())
    }
}

impl From<&[&str]> for TagSet {
    fn from(tags: &[&str]) -> Self {
        Self(tags.iter().map(|t| t.to_string()).collect())
    }
}

impl<const N: usize> From<[&str; N]> for TagSet {
    fn from(tags: [&str; N]) -> Self {
        Self(tags.iter().map(|t| t.to_string()).collect())
    }
}

impl TryFrom<&Value> for TagSet {
    type Error = CacheError;

    /// Accepts a JSON string or an array of JSON strings.
    fn try_from(value: &Value) -> Result<Self> {
        match value {
            Value::String(s) => Ok(Self::parse(s)),
            Value::Array(items) => items
                .iter()
                .map(|item| match item {
                    Value::String(s) => Ok(s.clone()),
                    other => Err(CacheError::InvalidArgument(format!(
                        "tags must be strings, got {}",
                        other
                    ))),
                })
                .collect::<Result<Vec<_>>>()
                .map(Self),
            other => Err(CacheError::InvalidArgument(format!(
                "tags must be a string or an array of strings, got {}",
                other
            ))),
        }
    }
}

impl TryFrom<Value> for TagSet {
    type Error = CacheError;

    fn try_from(value: Value) -> Result<Self> {
        Self::try_from(&value)
    }
}
