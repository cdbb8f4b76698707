//! Structured key/value fields attached to a log identity.

use std::collections::btree_map;
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Ordered set of structured fields.
///
/// Keys are kept sorted so rendered records are deterministic.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Fields(BTreeMap<String, Value>);

impl Fields {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a field, returning the value it replaced.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.0.insert(key.into(), value.into())
    }

    /// Builder-style insert.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> btree_map::Iter<'_, String, Value> {
        self.0.iter()
    }

    /// Union of `self` and `other`; keys in `other` win on collision.
    pub fn merge(&self, other: &Fields) -> Fields {
        let mut merged = self.0.clone();
        merged.extend(other.0.iter().map(|(k, v)| (k.clone(), v.clone())));
        Fields(merged)
    }
}

impl<K, V> FromIterator<(K, V)> for Fields
where
    K: Into<String>,
    V: Into<Value>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Fields(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

impl<'a> IntoIterator for &'a Fields {
    type Item = (&'a String, &'a Value);
    type IntoIter = btree_map::Iter<'a, String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Build [`Fields`](crate::Fields) from `key => value` pairs.
///
/// ```ignore
/// let fields = ctxlog::fields! { "requestID" => "Ted", "attempt" => 2 };
/// ```
#[macro_export]
macro_rules! fields {
    () => {
        $crate::Fields::new()
    };
    ($($key:expr => $value:expr),+ $(,)?) => {{
        let mut fields = $crate::Fields::new();
        $( fields.insert($key, $value); )+
        fields
    }};
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_merge_overrides_on_collision() {
        let a = crate::fields! { "module" => "Auth", "tenant" => 41 };
        let b = crate::fields! { "tenant" => 42, "requestID" => "Ted" };

        let merged = a.merge(&b);
        assert_eq!(merged.len(), 3);
        assert_eq!(merged.get("module"), Some(&json!("Auth")));
        assert_eq!(merged.get("tenant"), Some(&json!(42)));
        assert_eq!(merged.get("requestID"), Some(&json!("Ted")));

        // inputs untouched
        assert_eq!(a.get("tenant"), Some(&json!(41)));
        assert!(!a.contains_key("requestID"));
    }

    #[test]
    fn test_keys_sorted() {
        let fields: Fields = [("zeta", 1), ("alpha", 2), ("mid", 3)].into_iter().collect();
        let keys: Vec<&str> = fields.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, vec!["alpha", "mid", "zeta"]);
    }

    #[test]
    fn test_empty_macro() {
        let fields = crate::fields! {};
        assert!(fields.is_empty());
    }
}
