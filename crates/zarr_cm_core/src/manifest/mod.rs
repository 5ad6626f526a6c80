//! Provenance manifest management.
//!
//! # Responsibility
//! - Read the `zarr_conventions` entry of an attribute map.
//! - Add, remove and look up records without mutating the input.
//!
//! # Invariants
//! - At most one entry per uuid.
//! - An empty manifest is never written back; the key is dropped instead.
//! - Entries this crate did not write are preserved verbatim and in order.

use crate::model::attrs::{AttributeMap, MANIFEST_KEY};
use crate::model::record::ConventionRecord;
use serde_json::Value;
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

const IDENTIFIER_FIELDS: &[&str] = &["uuid", "schema_url", "spec_url"];

/// Lookup key for `Manifest::find`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordQuery<'a> {
    Uuid(Uuid),
    /// Matches an entry whose `name` equals the given prefix.
    Prefix(&'a str),
}

impl From<Uuid> for RecordQuery<'_> {
    fn from(value: Uuid) -> Self {
        Self::Uuid(value)
    }
}

impl<'a> From<&'a str> for RecordQuery<'a> {
    fn from(value: &'a str) -> Self {
        match Uuid::parse_str(value) {
            Ok(uuid) => Self::Uuid(uuid),
            Err(_) => Self::Prefix(value),
        }
    }
}

/// Manifest operation errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ManifestError {
    DuplicateRecord(Uuid),
    RecordNotFound(Uuid),
    Malformed(String),
}

impl Display for ManifestError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DuplicateRecord(uuid) => write!(f, "manifest already has a record for {uuid}"),
            Self::RecordNotFound(uuid) => write!(f, "manifest has no record for {uuid}"),
            Self::Malformed(message) => write!(f, "malformed manifest: {message}"),
        }
    }
}

impl Error for ManifestError {}

/// Ordered list of manifest entries.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Manifest {
    entries: Vec<Value>,
}

impl Manifest {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads the manifest of `attrs`; `Ok(None)` when the key is absent.
    pub fn read(attrs: &AttributeMap) -> Result<Option<Self>, ManifestError> {
        attrs.get(MANIFEST_KEY).map(Self::from_value).transpose()
    }

    /// Parses a manifest value, checking every entry and uuid uniqueness.
    pub fn from_value(value: &Value) -> Result<Self, ManifestError> {
        let Value::Array(items) = value else {
            return Err(ManifestError::Malformed(format!(
                "`{MANIFEST_KEY}` must be an array"
            )));
        };

        let mut seen: Vec<Uuid> = Vec::with_capacity(items.len());
        for (idx, entry) in items.iter().enumerate() {
            validate_record_entry(entry).map_err(|err| match err {
                ManifestError::Malformed(message) => {
                    ManifestError::Malformed(format!("entry {idx}: {message}"))
                }
                other => other,
            })?;
            if let Some(uuid) = entry_uuid(entry) {
                if seen.contains(&uuid) {
                    return Err(ManifestError::Malformed(format!(
                        "entry {idx} repeats uuid {uuid}"
                    )));
                }
                seen.push(uuid);
            }
        }
        Ok(Self {
            entries: items.clone(),
        })
    }

    pub fn entries(&self) -> &[Value] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries that parse as full `ConventionRecord`s, in manifest order.
    pub fn records(&self) -> Vec<ConventionRecord> {
        self.entries
            .iter()
            .filter_map(ConventionRecord::from_value)
            .collect()
    }

    /// Uuids of every entry that carries a parseable one, in manifest order.
    pub fn uuids(&self) -> Vec<Uuid> {
        self.entries.iter().filter_map(entry_uuid).collect()
    }

    pub fn contains(&self, uuid: &Uuid) -> bool {
        self.position(&RecordQuery::Uuid(*uuid)).is_some()
    }

    /// Linear scan for the first entry matching `query`.
    pub fn find<'q>(&self, query: impl Into<RecordQuery<'q>>) -> Option<&Value> {
        self.position(&query.into()).map(|idx| &self.entries[idx])
    }

    /// Returns a copy with `record` appended after every existing entry.
    pub fn add_record(&self, record: &ConventionRecord) -> Result<Self, ManifestError> {
        if self.contains(&record.uuid) {
            return Err(ManifestError::DuplicateRecord(record.uuid));
        }
        let mut entries = self.entries.clone();
        let entry = record
            .to_value()
            .map_err(|err| ManifestError::Malformed(err.to_string()))?;
        entries.push(entry);
        Ok(Self { entries })
    }

    /// Returns a copy without the entry for `uuid`; may be empty.
    pub fn remove_record(&self, uuid: &Uuid) -> Result<Self, ManifestError> {
        let idx = self
            .position(&RecordQuery::Uuid(*uuid))
            .ok_or(ManifestError::RecordNotFound(*uuid))?;
        let mut entries = self.entries.clone();
        entries.remove(idx);
        Ok(Self { entries })
    }

    pub fn to_value(&self) -> Value {
        Value::Array(self.entries.clone())
    }

    /// Writes this manifest into `attrs`, keeping the key's position.
    ///
    /// An empty manifest removes the key instead.
    pub fn write_into(&self, attrs: &mut AttributeMap) {
        if self.is_empty() {
            attrs.retain(|key, _| key != MANIFEST_KEY);
        } else {
            attrs.insert(MANIFEST_KEY.to_string(), self.to_value());
        }
    }

    fn position(&self, query: &RecordQuery<'_>) -> Option<usize> {
        self.entries.iter().position(|entry| match query {
            RecordQuery::Uuid(uuid) => entry_uuid(entry).as_ref() == Some(uuid),
            RecordQuery::Prefix(prefix) => {
                entry.get("name").and_then(Value::as_str) == Some(*prefix)
            }
        })
    }
}

/// Checks that a manifest entry identifies its convention.
///
/// An entry must be an object carrying at least one of `uuid`,
/// `schema_url` or `spec_url`.
pub fn validate_record_entry(entry: &Value) -> Result<(), ManifestError> {
    let Value::Object(fields) = entry else {
        return Err(ManifestError::Malformed(
            "entry must be an object".to_string(),
        ));
    };
    if !IDENTIFIER_FIELDS.iter().any(|field| fields.contains_key(*field)) {
        return Err(ManifestError::Malformed(
            "entry must have at least one of 'uuid', 'schema_url', or 'spec_url'".to_string(),
        ));
    }
    Ok(())
}

fn entry_uuid(entry: &Value) -> Option<Uuid> {
    entry
        .get("uuid")
        .and_then(Value::as_str)
        .and_then(|raw| Uuid::parse_str(raw).ok())
}

#[cfg(test)]
mod tests {
    use super::{validate_record_entry, Manifest, ManifestError, RecordQuery};
    use crate::model::attrs::{AttributeMap, MANIFEST_KEY};
    use crate::model::record::ConventionRecord;
    use serde_json::json;
    use uuid::Uuid;

    fn record(n: u128, name: &str) -> ConventionRecord {
        ConventionRecord {
            uuid: Uuid::from_u128(n),
            schema_url: format!("https://example.org/{n}/schema.json"),
            spec_url: format!("https://example.org/{n}/README.md"),
            name: name.to_string(),
            description: "test".to_string(),
        }
    }

    #[test]
    fn add_appends_and_rejects_duplicate_uuid() {
        let manifest = Manifest::new()
            .add_record(&record(1, "a:"))
            .and_then(|m| m.add_record(&record(2, "b:")))
            .unwrap();
        assert_eq!(manifest.uuids(), vec![Uuid::from_u128(1), Uuid::from_u128(2)]);

        let err = manifest.add_record(&record(1, "c:")).unwrap_err();
        assert_eq!(err, ManifestError::DuplicateRecord(Uuid::from_u128(1)));
    }

    #[test]
    fn remove_keeps_order_and_fails_when_absent() {
        let manifest = Manifest::new()
            .add_record(&record(1, "a:"))
            .and_then(|m| m.add_record(&record(2, "b:")))
            .and_then(|m| m.add_record(&record(3, "c:")))
            .unwrap();
        let trimmed = manifest.remove_record(&Uuid::from_u128(2)).unwrap();
        assert_eq!(trimmed.uuids(), vec![Uuid::from_u128(1), Uuid::from_u128(3)]);
        // Input stays untouched.
        assert_eq!(manifest.len(), 3);

        let err = trimmed.remove_record(&Uuid::from_u128(9)).unwrap_err();
        assert_eq!(err, ManifestError::RecordNotFound(Uuid::from_u128(9)));
    }

    #[test]
    fn find_by_uuid_text_or_prefix() {
        let manifest = Manifest::new().add_record(&record(7, "proj:")).unwrap();
        let uuid_text = Uuid::from_u128(7).to_string();
        assert!(manifest.find(uuid_text.as_str()).is_some());
        assert!(manifest.find("proj:").is_some());
        assert!(manifest.find(RecordQuery::Prefix("spatial:")).is_none());
    }

    #[test]
    fn foreign_entries_survive_but_are_not_records() {
        let value = json!([{"uuid": "other-uuid"}, record(1, "a:").to_value().unwrap()]);
        let manifest = Manifest::from_value(&value).unwrap();
        assert_eq!(manifest.len(), 2);
        assert_eq!(manifest.records(), vec![record(1, "a:")]);
        assert_eq!(manifest.to_value(), value);
    }

    #[test]
    fn rejects_malformed_values() {
        assert!(matches!(
            Manifest::from_value(&json!({"uuid": "x"})),
            Err(ManifestError::Malformed(_))
        ));
        assert!(matches!(
            Manifest::from_value(&json!([{"name": "proj:"}])),
            Err(ManifestError::Malformed(_))
        ));
        let dup = record(1, "a:").to_value().unwrap();
        assert!(matches!(
            Manifest::from_value(&json!([dup.clone(), dup])),
            Err(ManifestError::Malformed(_))
        ));
    }

    #[test]
    fn validate_record_entry_requires_an_identifier() {
        assert!(validate_record_entry(&json!({"spec_url": "https://example.org"})).is_ok());
        assert!(validate_record_entry(&json!({})).is_err());
        assert!(validate_record_entry(&json!("proj:")).is_err());
    }

    #[test]
    fn empty_manifest_removes_key_and_keeps_order() {
        let mut attrs: AttributeMap = json!({
            "a": 1,
            "zarr_conventions": [record(1, "a:").to_value().unwrap()],
            "b": 2,
        })
        .as_object()
        .cloned()
        .unwrap();

        let grown = Manifest::read(&attrs)
            .unwrap()
            .unwrap()
            .add_record(&record(2, "b:"))
            .unwrap();
        grown.write_into(&mut attrs);
        let keys: Vec<&str> = attrs.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["a", MANIFEST_KEY, "b"]);

        Manifest::new().write_into(&mut attrs);
        let keys: Vec<&str> = attrs.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["a", "b"]);
    }
}
