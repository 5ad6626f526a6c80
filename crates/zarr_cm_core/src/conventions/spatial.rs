//! spatial convention: spatial coordinate information for array axes.

use crate::conventions::Convention;
use crate::registry::spec::{ConventionSpec, FieldCheck, FieldRule, KeyLayout};
use serde::{Deserialize, Serialize};
use uuid::{uuid, Uuid};

pub const UUID: Uuid = uuid!("689b58e2-cf7b-45e0-9fff-9cfc0883d6b4");
pub const NAME: &str = "spatial:";
pub const SCHEMA_URL: &str =
    "https://raw.githubusercontent.com/zarr-conventions/spatial/refs/tags/v1/schema.json";
pub const SPEC_URL: &str = "https://github.com/zarr-conventions/spatial/blob/v1/README.md";
pub const DESCRIPTION: &str = "Spatial coordinate information";

/// Accepted values of `spatial:registration`.
pub const REGISTRATIONS: &[&str] = &["node", "pixel"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Spatial;

/// Fields accepted by `Spatial::create`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SpatialFields {
    pub dimensions: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bbox: Option<Vec<f64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transform_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transform: Option<Vec<f64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shape: Option<Vec<u64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub registration: Option<String>,
}

impl SpatialFields {
    pub fn with_dimensions<S: Into<String>>(dimensions: impl IntoIterator<Item = S>) -> Self {
        Self {
            dimensions: dimensions.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }
}

impl Convention for Spatial {
    const ID: &'static str = "spatial";
    type Fields = SpatialFields;

    fn spec() -> ConventionSpec {
        ConventionSpec {
            id: Self::ID.to_string(),
            name: NAME.to_string(),
            uuid: UUID,
            schema_url: SCHEMA_URL.to_string(),
            spec_url: SPEC_URL.to_string(),
            description: DESCRIPTION.to_string(),
            layout: KeyLayout::Prefixed,
            fields: vec![
                FieldRule::required(
                    "dimensions",
                    FieldCheck::StringArray {
                        lengths: vec![2, 3],
                    },
                ),
                FieldRule::optional(
                    "bbox",
                    FieldCheck::NumberArray {
                        lengths: vec![4, 6],
                    },
                ),
                FieldRule::optional("transform_type", FieldCheck::String),
                FieldRule::optional(
                    "transform",
                    FieldCheck::NumberArray {
                        lengths: vec![6, 9],
                    },
                ),
                FieldRule::optional(
                    "shape",
                    FieldCheck::UnsignedArray {
                        lengths: vec![2, 3],
                    },
                ),
                FieldRule::optional(
                    "registration",
                    FieldCheck::OneOf(REGISTRATIONS.iter().map(|v| v.to_string()).collect()),
                ),
            ],
            groups: vec![],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Spatial, SpatialFields};
    use crate::conventions::Convention;
    use crate::error::ConventionError;
    use serde_json::json;

    #[test]
    fn create_full_keeps_rule_order() {
        let fields = SpatialFields {
            registration: Some("pixel".to_string()),
            shape: Some(vec![100, 200]),
            bbox: Some(vec![0.0, 0.0, 1.0, 1.0]),
            transform_type: Some("affine".to_string()),
            transform: Some(vec![1.0, 0.0, 0.0, 0.0, 1.0, 0.0]),
            ..SpatialFields::with_dimensions(["y", "x"])
        };
        let data = Spatial::create(&fields).unwrap();
        let keys: Vec<&str> = data.keys().map(String::as_str).collect();
        assert_eq!(
            keys,
            vec![
                "spatial:dimensions",
                "spatial:bbox",
                "spatial:transform_type",
                "spatial:transform",
                "spatial:shape",
                "spatial:registration",
            ]
        );
        assert_eq!(data.get("spatial:shape"), Some(&json!([100, 200])));
    }

    #[test]
    fn validate_reports_every_bad_field() {
        let attrs = json!({
            "spatial:dimensions": ["x"],
            "spatial:bbox": [0.0, 1.0],
            "spatial:registration": "bad",
            "foo": "ignored",
        });
        let err = Spatial::validate(attrs.as_object().unwrap()).unwrap_err();
        let ConventionError::Schema(schema) = err else {
            panic!("expected schema error");
        };
        let messages: Vec<String> = schema.violations().iter().map(ToString::to_string).collect();
        assert_eq!(messages.len(), 3);
        assert!(messages[0].contains("2 or 3 items, got 1"));
        assert!(messages[1].contains("4 or 6 items, got 2"));
        assert!(messages[2].contains("spatial:registration"));
    }

    #[test]
    fn validate_requires_dimensions() {
        let err = Spatial::validate(json!({}).as_object().unwrap()).unwrap_err();
        assert!(err.to_string().contains("spatial:dimensions: is required"));
    }

    #[test]
    fn validate_rejects_unknown_prefixed_key() {
        let attrs = json!({"spatial:dimensions": ["y", "x"], "spatial:units": "m"});
        let err = Spatial::validate(attrs.as_object().unwrap()).unwrap_err();
        assert!(err.to_string().contains("spatial:units"));
    }
}
