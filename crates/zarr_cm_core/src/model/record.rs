//! Provenance record embedded in the `zarr_conventions` manifest.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// One manifest entry identifying an embedded convention.
///
/// Serialized with exactly the five wire fields, in declaration order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConventionRecord {
    /// Unique per convention definition, not per insertion.
    pub uuid: Uuid,
    pub schema_url: String,
    pub spec_url: String,
    /// Key prefix (or owned key) of the convention, e.g. `proj:`.
    pub name: String,
    pub description: String,
}

impl ConventionRecord {
    /// Wire form of this record, fields in declaration order.
    pub fn to_value(&self) -> serde_json::Result<Value> {
        serde_json::to_value(self)
    }

    /// Parses a full record from a manifest entry.
    ///
    /// Returns `None` for foreign entries that do not carry all five fields.
    pub fn from_value(value: &Value) -> Option<Self> {
        serde_json::from_value(value.clone()).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::ConventionRecord;
    use serde_json::json;
    use uuid::Uuid;

    fn sample() -> ConventionRecord {
        ConventionRecord {
            uuid: Uuid::parse_str("f17cb550-5864-4468-aeb7-f3180cfb622f").unwrap(),
            schema_url: "https://example.org/schema.json".to_string(),
            spec_url: "https://example.org/README.md".to_string(),
            name: "proj:".to_string(),
            description: "crs".to_string(),
        }
    }

    #[test]
    fn serializes_uuid_as_hyphenated_text() {
        let value = sample().to_value().unwrap();
        assert_eq!(value["uuid"], "f17cb550-5864-4468-aeb7-f3180cfb622f");
        let keys: Vec<&String> = value.as_object().unwrap().keys().collect();
        assert_eq!(
            keys,
            vec!["uuid", "schema_url", "spec_url", "name", "description"]
        );
    }

    #[test]
    fn foreign_entry_is_not_a_full_record() {
        assert!(ConventionRecord::from_value(&json!({"uuid": "other-uuid"})).is_none());
        assert_eq!(
            ConventionRecord::from_value(&sample().to_value().unwrap()),
            Some(sample())
        );
    }
}
