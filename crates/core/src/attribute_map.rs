use crate::reflect::{Configurable, Operations};
use std::collections::BTreeMap;

/// A generic string map target.
///
/// When an `AttributeMap` is being configured, attributes without a matching
/// `set*` operation are stored verbatim instead of failing.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct AttributeMap {
    entries: BTreeMap<String, String>,
}

impl AttributeMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) -> Option<String> {
        self.entries.insert(key.into(), value.into())
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn into_inner(self) -> BTreeMap<String, String> {
        self.entries
    }
}

impl Configurable for AttributeMap {
    fn describe(_ops: &mut Operations<Self>) {}
}
