//! Attribute map and convention data units.
//!
//! # Responsibility
//! - Name the string-keyed JSON map exchanged with metadata stores.
//! - Tag convention key groups with the convention that owns them.
//!
//! # Invariants
//! - `ConventionData` values are kept in the order they were produced.
//! - `MultiConventionAttrs` holds at most one entry per convention id, and
//!   every entry is keyed by its own `ConventionData::convention()`.

use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Ordered string-keyed map of JSON values (node attributes).
pub type AttributeMap = Map<String, Value>;

/// Fixed attribute key of the provenance manifest.
pub const MANIFEST_KEY: &str = "zarr_conventions";

/// The key group of one convention, tagged with that convention's id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConventionData {
    convention: String,
    values: AttributeMap,
}

impl ConventionData {
    /// Wraps externally supplied values without checking them.
    ///
    /// Callers must pass the result through `validate` before trusting it;
    /// `create` and `validate` are the only checked constructors.
    pub fn from_raw(convention: impl Into<String>, values: AttributeMap) -> Self {
        Self {
            convention: convention.into(),
            values,
        }
    }

    /// Stable id of the owning convention, e.g. `geo-proj`.
    pub fn convention(&self) -> &str {
        &self.convention
    }

    pub fn values(&self) -> &AttributeMap {
        &self.values
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.values.keys()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn into_values(self) -> AttributeMap {
        self.values
    }
}

/// Convention data for several conventions, keyed by convention id.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MultiConventionAttrs {
    entries: BTreeMap<String, ConventionData>,
}

impl MultiConventionAttrs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `data` under its own convention id, returning any replaced entry.
    pub fn insert(&mut self, data: ConventionData) -> Option<ConventionData> {
        self.entries.insert(data.convention.clone(), data)
    }

    pub fn get(&self, convention: &str) -> Option<&ConventionData> {
        self.entries.get(convention)
    }

    pub fn contains(&self, convention: &str) -> bool {
        self.entries.contains_key(convention)
    }

    pub fn remove(&mut self, convention: &str) -> Option<ConventionData> {
        self.entries.remove(convention)
    }

    /// Convention ids in sorted order.
    pub fn names(&self) -> Vec<&str> {
        self.entries.keys().map(String::as_str).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ConventionData)> {
        self.entries.iter().map(|(name, data)| (name.as_str(), data))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<ConventionData> for MultiConventionAttrs {
    fn from_iter<T: IntoIterator<Item = ConventionData>>(iter: T) -> Self {
        let mut attrs = Self::new();
        for data in iter {
            attrs.insert(data);
        }
        attrs
    }
}

impl IntoIterator for MultiConventionAttrs {
    type Item = (String, ConventionData);
    type IntoIter = std::collections::btree_map::IntoIter<String, ConventionData>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::{AttributeMap, ConventionData, MultiConventionAttrs};
    use serde_json::json;

    fn map(value: serde_json::Value) -> AttributeMap {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn attribute_map_keeps_insertion_order() {
        let mut attrs = AttributeMap::new();
        attrs.insert("z".to_string(), json!(1));
        attrs.insert("a".to_string(), json!(2));
        attrs.insert("m".to_string(), json!(3));
        let keys: Vec<&str> = attrs.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["z", "a", "m"]);
    }

    #[test]
    fn multi_attrs_key_entries_by_convention_id() {
        let proj = ConventionData::from_raw("geo-proj", map(json!({"proj:code": "EPSG:4326"})));
        let license = ConventionData::from_raw("license", map(json!({"license": {"spdx": "MIT"}})));
        let multi: MultiConventionAttrs = vec![proj.clone(), license].into_iter().collect();

        assert_eq!(multi.len(), 2);
        assert_eq!(multi.names(), vec!["geo-proj", "license"]);
        assert_eq!(multi.get("geo-proj"), Some(&proj));
        assert!(!multi.contains("uom"));
    }
}
