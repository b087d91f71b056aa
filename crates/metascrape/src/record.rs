// ABOUTME: MetaRecord, the flat field-name to value mapping produced by the meta parser.
// ABOUTME: Serializes as a flat JSON object with deterministic key order.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Flat mapping of recognized metadata field names (`ogTitle`,
/// `alAndroidPackage`, ...) to the extracted string values.
///
/// Only fields that matched at least one tag are present.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MetaRecord {
    fields: BTreeMap<String, String>,
}

impl MetaRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Value for a field, e.g. `record.get("ogTitle")`.
    pub fn get(&self, field: &str) -> Option<&str> {
        self.fields.get(field).map(String::as_str)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.fields.contains_key(field)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Fields in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn into_map(self) -> BTreeMap<String, String> {
        self.fields
    }

    /// Set a field, replacing any earlier value.
    pub(crate) fn insert(&mut self, field: &str, value: String) {
        self.fields.insert(field.to_string(), value);
    }
}

impl<'a> IntoIterator for &'a MetaRecord {
    type Item = (&'a String, &'a String);
    type IntoIter = std::collections::btree_map::Iter<'a, String, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.fields.iter()
    }
}
