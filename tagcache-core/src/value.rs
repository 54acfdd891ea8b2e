//! The opaque value type stored in a backend.

use serde::{Deserialize, Serialize};

/// A value held in the backing store.
///
/// Values are either a scalar or an ordered list of identifiers. Tag
/// index entries are always `List`; primary cache entries are usually
/// `Scalar` but may themselves be lists.
///
/// The untagged serde representation means a scalar round-trips as a
/// plain JSON string and a list as a JSON array, which is also the wire
/// encoding used by backends that only store bytes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CacheValue {
    Scalar(String),
    List(Vec<String>),
}

impl CacheValue {
    /// View the value as an identifier list.
    ///
    /// A scalar is not silently promoted; callers that expect a tag
    /// member list use [`CacheValue::into_list`] instead.
    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            CacheValue::List(items) => Some(items),
            CacheValue::Scalar(_) => None,
        }
    }

    /// Consume the value as an identifier list, promoting a scalar to a
    /// single-element list.
    pub fn into_list(self) -> Vec<String> {
        match self {
            CacheValue::List(items) => items,
            CacheValue::Scalar(s) => vec![s],
        }
    }

    pub fn as_scalar(&self) -> Option<&str> {
        match self {
            CacheValue::Scalar(s) => Some(s),
            CacheValue::List(_) => None,
        }
    }

    /// Whether the value is an empty list or an empty scalar.
    pub fn is_empty(&self) -> bool {
        match self {
            CacheValue::Scalar(s) => s.is_empty(),
            CacheValue::List(items) => items.is_empty(),
        }
    }
}

impl From<&str> for CacheValue {
    fn from(s: &str) -> Self {
        CacheValue::Scalar(s.to_string())
    }
}

impl From<String> for CacheValue {
    fn from(s: String) -> Self {
        CacheValue::Scalar(s)
    }
}

impl From<Vec<String>> for CacheValue {
    fn from(items: Vec<String>) -> Self {
        CacheValue::List(items)
    }
}

impl From<&[String]> for CacheValue {
    fn from(items: &[String]) -> Self {
        CacheValue::List(items.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scalar_round_trips_as_json_string() {
        let value = CacheValue::from("Alice");
        let json = serde_json::to_string(&value).unwrap();
        assert_eq!(json, "\"Alice\"");
        let back: CacheValue = serde_json::from_str(&json).unwrap();
        assert_eq!(back, value);
    }

    #[test]
    fn list_round_trips_as_json_array() {
        let value = CacheValue::from(vec!["user:1".to_string(), "user:2".to_string()]);
        let json = serde_json::to_string(&value).unwrap();
        let back: CacheValue = serde_json::from_str(&json).unwrap();
        assert_eq!(back, value);
    }

    #[test]
    fn into_list_promotes_scalar() {
        assert_eq!(CacheValue::from("k").into_list(), vec!["k".to_string()]);
        assert_eq!(
            CacheValue::List(vec!["a".into(), "b".into()]).into_list(),
            vec!["a".to_string(), "b".to_string()]
        );
    }

    #[test]
    fn as_list_rejects_scalar() {
        assert!(CacheValue::from("k").as_list().is_none());
    }
}
