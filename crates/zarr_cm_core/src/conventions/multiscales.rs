//! multiscales convention: layout of a multiscale pyramid.
//!
//! All fields live under the single `multiscales` key.

use crate::conventions::Convention;
use crate::registry::rules::check_value;
use crate::registry::spec::{ConventionSpec, FieldCheck, FieldRule, KeyLayout};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::{uuid, Uuid};

pub const UUID: Uuid = uuid!("d35379db-88df-4056-af3a-620245f8e347");
pub const NAME: &str = "multiscales";
pub const SCHEMA_URL: &str =
    "https://raw.githubusercontent.com/zarr-conventions/multiscales/refs/tags/v1/schema.json";
pub const SPEC_URL: &str = "https://github.com/zarr-conventions/multiscales/blob/v1/README.md";
pub const DESCRIPTION: &str = "Multiscale layout of zarr datasets";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Multiscales;

/// Coordinate transformation of one level relative to its source.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scale: Option<Vec<f64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub translation: Option<Vec<f64>>,
}

/// One resolution level of the pyramid.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LayoutEntry {
    pub asset: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub derived_from: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transform: Option<Transform>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resampling_method: Option<String>,
}

impl LayoutEntry {
    pub fn asset(asset: impl Into<String>) -> Self {
        Self {
            asset: asset.into(),
            ..Self::default()
        }
    }
}

/// Fields accepted by `Multiscales::create`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MultiscalesFields {
    pub layout: Vec<LayoutEntry>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resampling_method: Option<String>,
}

impl Convention for Multiscales {
    const ID: &'static str = "multiscales";
    type Fields = MultiscalesFields;

    fn spec() -> ConventionSpec {
        ConventionSpec {
            id: Self::ID.to_string(),
            name: NAME.to_string(),
            uuid: UUID,
            schema_url: SCHEMA_URL.to_string(),
            spec_url: SPEC_URL.to_string(),
            description: DESCRIPTION.to_string(),
            layout: KeyLayout::Nested,
            fields: vec![
                FieldRule::required("layout", FieldCheck::Custom(check_layout)),
                FieldRule::optional("resampling_method", FieldCheck::String),
            ],
            groups: vec![],
        }
    }
}

/// Checks the pyramid layout array.
///
/// At least one entry; every entry is an object with a string `asset`, and
/// an entry with `derived_from` must also carry `transform`.
fn check_layout(value: &Value) -> Vec<String> {
    let Some(entries) = value.as_array() else {
        return vec!["must be an array".to_string()];
    };
    if entries.is_empty() {
        return vec!["must have at least one item".to_string()];
    }

    let mut messages = Vec::new();
    for (idx, entry) in entries.iter().enumerate() {
        let Some(entry) = entry.as_object() else {
            messages.push(format!("[{idx}] must be an object"));
            continue;
        };
        match entry.get("asset") {
            Some(Value::String(_)) => {}
            Some(_) => messages.push(format!("[{idx}].asset must be a string")),
            None => messages.push(format!("[{idx}].asset is required")),
        }
        for field in ["derived_from", "resampling_method"] {
            if entry.get(field).is_some_and(|v| !v.is_string()) {
                messages.push(format!("[{idx}].{field} must be a string"));
            }
        }
        match entry.get("transform") {
            None if entry.contains_key("derived_from") => {
                messages.push(format!("[{idx}] has 'derived_from' but is missing 'transform'"));
            }
            None => {}
            Some(Value::Object(transform)) => {
                for field in ["scale", "translation"] {
                    let Some(component) = transform.get(field) else {
                        continue;
                    };
                    let check = FieldCheck::NumberArray { lengths: vec![] };
                    for problem in check_value(&check, component) {
                        messages.push(format!("[{idx}].transform.{field} {problem}"));
                    }
                }
            }
            Some(_) => messages.push(format!("[{idx}].transform must be an object")),
        }
    }
    messages
}

#[cfg(test)]
mod tests {
    use super::{check_layout, LayoutEntry, Multiscales, MultiscalesFields, Transform};
    use crate::conventions::Convention;
    use serde_json::json;

    #[test]
    fn create_nests_fields_under_single_key() {
        let fields = MultiscalesFields {
            layout: vec![
                LayoutEntry::asset("0"),
                LayoutEntry {
                    derived_from: Some("0".to_string()),
                    transform: Some(Transform {
                        scale: Some(vec![2.0, 2.0]),
                        translation: None,
                    }),
                    ..LayoutEntry::asset("1")
                },
            ],
            resampling_method: None,
        };
        let data = Multiscales::create(&fields).unwrap();
        assert_eq!(data.len(), 1);
        assert_eq!(
            data.get("multiscales"),
            Some(&json!({
                "layout": [
                    {"asset": "0"},
                    {"asset": "1", "derived_from": "0", "transform": {"scale": [2.0, 2.0]}},
                ]
            }))
        );
    }

    #[test]
    fn empty_layout_is_rejected() {
        let err = Multiscales::create(&MultiscalesFields::default()).unwrap_err();
        assert!(err.to_string().contains("at least one item"));
    }

    #[test]
    fn derived_level_needs_transform() {
        let messages = check_layout(&json!([{"asset": "0"}, {"asset": "1", "derived_from": "0"}]));
        assert_eq!(
            messages,
            vec!["[1] has 'derived_from' but is missing 'transform'".to_string()]
        );
    }

    #[test]
    fn reports_bad_transform_components() {
        let messages = check_layout(&json!([
            {"transform": {"scale": ["a"]}},
        ]));
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0], "[0].asset is required");
        assert_eq!(messages[1], "[0].transform.scale must contain only numbers");
    }

    #[test]
    fn validate_requires_layout_inside_group() {
        let attrs = json!({"multiscales": {"resampling_method": "mean"}});
        let err = Multiscales::validate(attrs.as_object().unwrap()).unwrap_err();
        assert!(err.to_string().contains("multiscales.layout: is required"));
    }
}
