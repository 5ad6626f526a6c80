//! geo-proj convention: coordinate reference system of geospatial data.
//!
//! Exactly one of `proj:code`, `proj:wkt2` or `proj:projjson` describes the
//! CRS.

use crate::conventions::Convention;
use crate::registry::spec::{ConventionSpec, FieldCheck, FieldRule, GroupRule, KeyLayout};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::{uuid, Uuid};

pub const UUID: Uuid = uuid!("f17cb550-5864-4468-aeb7-f3180cfb622f");
pub const NAME: &str = "proj:";
pub const SCHEMA_URL: &str =
    "https://raw.githubusercontent.com/zarr-experimental/geo-proj/refs/tags/v1/schema.json";
pub const SPEC_URL: &str = "https://github.com/zarr-experimental/geo-proj/blob/v1/README.md";
pub const DESCRIPTION: &str = "Coordinate reference system information for geospatial data";

// AUTHORITY:CODE, e.g. EPSG:4326 or IAU_2015:30100.
static PROJ_CODE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9_]+:[A-Za-z0-9_.\-]+$").expect("valid proj code regex"));

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GeoProj;

/// Fields accepted by `GeoProj::create`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GeoProjFields {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wkt2: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub projjson: Option<Value>,
}

impl GeoProjFields {
    pub fn code(code: impl Into<String>) -> Self {
        Self {
            code: Some(code.into()),
            ..Self::default()
        }
    }
}

impl Convention for GeoProj {
    const ID: &'static str = "geo-proj";
    type Fields = GeoProjFields;

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
                FieldRule::optional(
                    "code",
                    FieldCheck::Pattern {
                        pattern: PROJ_CODE_RE.clone(),
                        hint: "an AUTHORITY:CODE identifier".to_string(),
                    },
                ),
                FieldRule::optional("wkt2", FieldCheck::NonEmptyString),
                FieldRule::optional("projjson", FieldCheck::Object),
            ],
            groups: vec![GroupRule::ExactlyOneOf(vec![
                "code".to_string(),
                "wkt2".to_string(),
                "projjson".to_string(),
            ])],
        }
    }
}
