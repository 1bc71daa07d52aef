use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::KeyValue;

/// Parameters exposed to the remote task as environment variables.
///
/// Stored as an ordered list of key–value pairs; in task config files and on the wire it is a plain `name: value` mapping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "BTreeMap<String, String>", into = "BTreeMap<String, String>")]
pub struct TaskParams(Vec<KeyValue>);

impl TaskParams {
    /// Create an empty parameter list.
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &KeyValue> {
        self.0.iter()
    }

    /// Get the value for a key, returning the last matching entry.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .rev()
            .find(|kv| kv.key() == key)
            .map(|kv| kv.value())
    }

    /// Append a key–value pair.
    ///
    /// Later entries override earlier ones when queried via [`TaskParams::get`].
    pub fn push<K, V>(&mut self, key: K, value: V)
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.0.push(KeyValue::new(key, value));
    }

    /// Replace the value of every declared param for which `lookup` yields a value.
    ///
    /// Undeclared names are never added.
    pub fn override_with<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        for kv in self.0.iter_mut() {
            if let Some(value) = lookup(kv.key()) {
                kv.set_value(value);
            }
        }
    }
}

impl Default for TaskParams {
    fn default() -> Self {
        Self::new()
    }
}

impl From<BTreeMap<String, String>> for TaskParams {
    fn from(map: BTreeMap<String, String>) -> Self {
        Self(map.into_iter().map(|(k, v)| KeyValue::new(k, v)).collect())
    }
}

impl From<TaskParams> for BTreeMap<String, String> {
    fn from(params: TaskParams) -> Self {
        params
            .0
            .into_iter()
            .map(|kv| (kv.key().to_string(), kv.value().to_string()))
            .collect()
    }
}
