//! Opaque key/value records exchanged with the client under test.
//!
//! The harness never interprets a document beyond looking up fields by name:
//! command predicates check for a key, handshake detection checks a flag,
//! and assertions compare sub-documents structurally.

mod object_id;
mod value;

pub use object_id::*;
pub use value::*;

use std::collections::btree_map;
use std::collections::BTreeMap;

use serde::Deserialize;
use serde::Serialize;


/// Builds a [`Document`] from `key => value` pairs.
///
/// ```
/// use replset_mock::doc;
///
/// let command = doc! {
///     "create" => "test",
///     "writeConcern" => doc! { "w" => 2, "wtimeout" => 1000 },
/// };
/// assert!(command.is_truthy("create"));
/// ```
#[macro_export]
macro_rules! doc {
    () => {
        $crate::Document::new()
    };
    ( $( $key:expr => $value:expr ),+ $(,)? ) => {{
        let mut document = $crate::Document::new();
        $( document.insert($key, $value); )+
        document
    }};
}

/// Structurally comparable record; two documents are equal when they hold
/// the same keys with equal values, whatever the insertion order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Document {
    entries: BTreeMap<String, Value>,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets `key`, returning the value it replaced.
    pub fn insert(
        &mut self,
        key: impl Into<String>,
        value: impl Into<Value>,
    ) -> Option<Value> {
        self.entries.insert(key.into(), value.into())
    }

    pub fn get(
        &self,
        key: &str,
    ) -> Option<&Value> {
        self.entries.get(key)
    }

    pub fn get_str(
        &self,
        key: &str,
    ) -> Option<&str> {
        self.get(key).and_then(Value::as_str)
    }

    pub fn get_bool(
        &self,
        key: &str,
    ) -> Option<bool> {
        self.get(key).and_then(Value::as_bool)
    }

    pub fn get_i64(
        &self,
        key: &str,
    ) -> Option<i64> {
        self.get(key).and_then(Value::as_i64)
    }

    pub fn get_document(
        &self,
        key: &str,
    ) -> Option<&Document> {
        self.get(key).and_then(Value::as_document)
    }

    pub fn get_array(
        &self,
        key: &str,
    ) -> Option<&[Value]> {
        self.get(key).and_then(Value::as_array)
    }

    pub fn contains_key(
        &self,
        key: &str,
    ) -> bool {
        self.entries.contains_key(key)
    }

    /// `true` when `key` is present and its value is truthy, which is how
    /// command documents are recognised (`{ create: "coll" }`,
    /// `{ dropDatabase: 1 }`, `{ ismaster: true }`).
    pub fn is_truthy(
        &self,
        key: &str,
    ) -> bool {
        self.get(key).is_some_and(Value::is_truthy)
    }

    pub fn iter(&self) -> btree_map::Iter<'_, String, Value> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<(String, Value)> for Document {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for Document {
    type Item = (String, Value);
    type IntoIter = btree_map::IntoIter<String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl<'a> IntoIterator for &'a Document {
    type Item = (&'a String, &'a Value);
    type IntoIter = btree_map::Iter<'a, String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

impl From<BTreeMap<String, String>> for Document {
    fn from(map: BTreeMap<String, String>) -> Self {
        map.into_iter().map(|(key, value)| (key, Value::String(value))).collect()
    }
}
