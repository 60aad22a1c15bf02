//! Environment value set entity
//!
//! One environment's concrete bindings for template placeholders.

use std::collections::BTreeMap;
use std::fmt;

use crate::error::{StagecraftError, StagecraftResult};

/// A bound value
///
/// Only strings for now; numbers and booleans are coerced on load.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Value {
    String(String),
}

impl Value {
    pub fn as_str(&self) -> &str {
        match self {
            Value::String(s) => s,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

/// Named mapping from placeholder name to value
///
/// Keys are unique; iteration order is sorted so output stays deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValueSet {
    name: String,
    values: BTreeMap<String, Value>,
}

impl ValueSet {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            values: BTreeMap::new(),
        }
    }

    /// Build from `(key, value)` pairs, rejecting duplicate keys.
    pub fn from_pairs<I, K, V>(name: impl Into<String>, pairs: I) -> Result<Self, String>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        let mut set = Self::new(name);
        for (key, value) in pairs {
            set.insert(key, value)?;
        }
        Ok(set)
    }

    /// Insert a binding; a key that is already bound is an error.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Result<(), String> {
        let key = key.into();
        if self.values.contains_key(&key) {
            return Err(format!("duplicate key '{}'", key));
        }
        self.values.insert(key, value.into());
        Ok(())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Look up a value, failing with `MissingKey` if absent.
    pub fn get(&self, key: &str) -> StagecraftResult<&Value> {
        self.lookup(key).ok_or_else(|| StagecraftError::MissingKey {
            key: key.to_string(),
            value_set: self.name.clone(),
        })
    }

    pub fn lookup(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
