//! uom convention: units of measurement for array values.

use crate::conventions::Convention;
use crate::registry::spec::{json_type_name, ConventionSpec, FieldCheck, FieldRule, KeyLayout};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::{uuid, Uuid};

pub const UUID: Uuid = uuid!("3bbe438d-df37-49fe-8e2b-739296d46dfb");
pub const NAME: &str = "uom";
pub const SCHEMA_URL: &str =
    "https://raw.githubusercontent.com/clbarnes/zarr-convention-uom/refs/tags/v1/schema.json";
pub const SPEC_URL: &str = "https://github.com/clbarnes/zarr-convention-uom/blob/v1/README.md";
pub const DESCRIPTION: &str = "Units of measurement for Zarr arrays";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Uom;

/// Unified Code for Units of Measure reference.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ucum {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

/// Fields accepted by `Uom::create`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UomFields {
    pub ucum: Ucum,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl UomFields {
    pub fn unit(unit: impl Into<String>) -> Self {
        Self {
            ucum: Ucum {
                unit: Some(unit.into()),
                version: None,
            },
            description: None,
        }
    }
}

impl Convention for Uom {
    const ID: &'static str = "uom";
    type Fields = UomFields;

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
                FieldRule::required("ucum", FieldCheck::Custom(check_ucum)),
                FieldRule::optional("description", FieldCheck::String),
            ],
            groups: vec![],
        }
    }
}

fn check_ucum(value: &Value) -> Vec<String> {
    let Some(ucum) = value.as_object() else {
        return vec![format!("must be an object, got {}", json_type_name(value))];
    };
    ["unit", "version"]
        .into_iter()
        .filter(|field| ucum.get(*field).is_some_and(|v| !v.is_string()))
        .map(|field| format!(".{field} must be a string"))
        .collect()
}
