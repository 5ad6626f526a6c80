//! license convention: license specifier for zarr data.

use crate::conventions::Convention;
use crate::registry::spec::{ConventionSpec, FieldCheck, FieldRule, GroupRule, KeyLayout};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use uuid::{uuid, Uuid};

pub const UUID: Uuid = uuid!("b77365e5-2b0c-4141-b917-c03b7c68e935");
pub const NAME: &str = "license";
pub const SCHEMA_URL: &str =
    "https://raw.githubusercontent.com/clbarnes/zarr-convention-license/refs/tags/v1/schema.json";
pub const SPEC_URL: &str = "https://github.com/clbarnes/zarr-convention-license/blob/v1/README.md";
pub const DESCRIPTION: &str = "License specifier for Zarr data";

const SOURCE_FIELDS: &[&str] = &["spdx", "url", "text", "file", "path"];

static URL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^https?://[^\s/$.?#][^\s]*$").expect("valid url regex"));

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct License;

/// Fields accepted by `License::create`; at least one must be set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LicenseFields {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub spdx: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

impl LicenseFields {
    pub fn spdx(identifier: impl Into<String>) -> Self {
        Self {
            spdx: Some(identifier.into()),
            ..Self::default()
        }
    }
}

impl Convention for License {
    const ID: &'static str = "license";
    type Fields = LicenseFields;

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
                FieldRule::optional("spdx", FieldCheck::NonEmptyString),
                FieldRule::optional(
                    "url",
                    FieldCheck::Pattern {
                        pattern: URL_RE.clone(),
                        hint: "an http(s) URL".to_string(),
                    },
                ),
                FieldRule::optional("text", FieldCheck::String),
                FieldRule::optional("file", FieldCheck::String),
                FieldRule::optional("path", FieldCheck::String),
            ],
            groups: vec![GroupRule::AtLeastOneOf(
                SOURCE_FIELDS.iter().map(|field| field.to_string()).collect(),
            )],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{License, LicenseFields};
    use crate::conventions::Convention;
    use serde_json::json;

    #[test]
    fn create_multiple_sources() {
        let fields = LicenseFields {
            url: Some("https://opensource.org/license/mit".to_string()),
            ..LicenseFields::spdx("MIT")
        };
        let data = License::create(&fields).unwrap();
        assert_eq!(
            data.get("license"),
            Some(&json!({"spdx": "MIT", "url": "https://opensource.org/license/mit"}))
        );
    }

    #[test]
    fn create_empty_needs_one_source() {
        let err = License::create(&LicenseFields::default()).unwrap_err();
        assert!(err.to_string().contains("at least one of"));
    }

    #[test]
    fn validate_rejects_non_http_url() {
        let attrs = json!({"license": {"url": "ftp://example.org/LICENSE"}});
        let err = License::validate(attrs.as_object().unwrap()).unwrap_err();
        assert!(err.to_string().contains("license.url"));
    }

    #[test]
    fn validate_rejects_non_object_group() {
        let attrs = json!({"license": "MIT"});
        let err = License::validate(attrs.as_object().unwrap()).unwrap_err();
        assert!(err.to_string().contains("must be an object, got string"));
    }
}
