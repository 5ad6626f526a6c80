//! Single-convention engine.
//!
//! # Responsibility
//! - Shape caller fields into `ConventionData` (`create`) and re-check data
//!   (`validate`).
//! - Merge data plus a provenance record into an attribute map (`insert`)
//!   and reverse it exactly (`extract`).
//!
//! # Invariants
//! - Inputs are never mutated; every operation returns a fresh value.
//! - Only keys inside the spec's namespace and the manifest key are touched.
//! - `extract(insert(attrs, data))` returns `attrs` and `data` unchanged,
//!   key order included, when `attrs` held none of the convention's keys.

use crate::error::{ConventionError, ConventionResult, NotPresentReason, SchemaError, Violation};
use crate::manifest::{Manifest, ManifestError};
use crate::model::attrs::{AttributeMap, ConventionData, MANIFEST_KEY};
use crate::registry::rules::{check_fields, unknown_fields};
use crate::registry::spec::ConventionSpec;
use log::debug;
use serde::Serialize;
use serde_json::Value;

/// Knobs for `insert_with` / `insert_many_with`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InsertOptions {
    /// Let convention data replace differing values of existing keys.
    ///
    /// The manifest duplicate-record check applies regardless.
    pub overwrite: bool,
}

impl InsertOptions {
    pub fn overwrite() -> Self {
        Self { overwrite: true }
    }
}

/// Engine bound to one registered `ConventionSpec`.
#[derive(Debug, Clone, Copy)]
pub struct ConventionEngine<'r> {
    spec: &'r ConventionSpec,
}

impl<'r> ConventionEngine<'r> {
    pub fn new(spec: &'r ConventionSpec) -> Self {
        Self { spec }
    }

    pub fn spec(&self) -> &'r ConventionSpec {
        self.spec
    }

    /// Builds canonical convention data from unprefixed `fields`.
    ///
    /// Null values count as absent. Unknown fields, missing required fields
    /// and failed checks are all reported in one `SchemaError`.
    pub fn create(&self, fields: &AttributeMap) -> ConventionResult<ConventionData> {
        let present: AttributeMap = fields
            .iter()
            .filter(|(_, value)| !value.is_null())
            .map(|(field, value)| (field.clone(), value.clone()))
            .collect();

        let mut violations = unknown_fields(self.spec, &present);
        violations.extend(check_fields(self.spec, &present));
        if !violations.is_empty() {
            return Err(SchemaError::new(violations).into());
        }

        debug!(
            "event=convention_create module=engine status=ok convention={} fields={}",
            self.spec.id,
            present.len()
        );
        Ok(ConventionData::from_raw(
            self.spec.id.clone(),
            self.spec.shape(&present),
        ))
    }

    /// `create` from any value that serializes to a JSON object of fields.
    pub fn create_from<T: Serialize>(&self, fields: &T) -> ConventionResult<ConventionData> {
        match serde_json::to_value(fields) {
            Ok(Value::Object(map)) => self.create(&map),
            Ok(_) => Err(self.single_violation(&self.spec.name, "fields must form an object")),
            Err(err) => Err(self.single_violation(&self.spec.name, err.to_string())),
        }
    }

    /// Re-applies the field rules to the convention keys found in `attrs`.
    ///
    /// Keys outside the convention namespace are ignored, so `attrs` may be a
    /// bare key group or a full attribute map. Returns the key group as is.
    pub fn validate(&self, attrs: &AttributeMap) -> ConventionResult<ConventionData> {
        let values = self.owned_values(attrs);
        let fields = self
            .spec
            .unshape(&values)
            .map_err(|found| {
                self.single_violation(
                    &self.spec.name,
                    format!("must be an object, got {found}"),
                )
            })?;

        let mut violations = unknown_fields(self.spec, &fields);
        violations.extend(check_fields(self.spec, &fields));
        if !violations.is_empty() {
            return Err(SchemaError::new(violations).into());
        }
        Ok(ConventionData::from_raw(self.spec.id.clone(), values))
    }

    /// Validates tagged data, which must belong to this convention and hold
    /// no key outside its namespace.
    pub fn validate_data(&self, data: &ConventionData) -> ConventionResult<ConventionData> {
        self.check_membership(data)?;
        self.validate(data.values())?;
        Ok(data.clone())
    }

    /// Returns `attrs` plus `data` plus this convention's manifest record.
    ///
    /// # Errors
    /// - `KeyCollision` when a key of `data` exists with a different value.
    /// - `DuplicateRecord` when the manifest already records this uuid, even
    ///   if the data is identical.
    pub fn insert(
        &self,
        attrs: &AttributeMap,
        data: &ConventionData,
    ) -> ConventionResult<AttributeMap> {
        self.insert_with(attrs, data, InsertOptions::default())
    }

    /// `insert` with explicit options; `overwrite` turns key collisions into
    /// replacements that keep the existing key position.
    pub fn insert_with(
        &self,
        attrs: &AttributeMap,
        data: &ConventionData,
        options: InsertOptions,
    ) -> ConventionResult<AttributeMap> {
        let manifest = self.read_manifest(attrs)?;
        self.check_insert(attrs, data, manifest.as_ref(), options)?;

        let mut result = attrs.clone();
        for (key, value) in data.values() {
            result.insert(key.clone(), value.clone());
        }
        let manifest = manifest
            .unwrap_or_default()
            .add_record(&self.spec.record())
            .map_err(|err| self.manifest_error(err))?;
        manifest.write_into(&mut result);

        debug!(
            "event=convention_insert module=engine status=ok convention={} keys={} manifest_len={}",
            self.spec.id,
            data.len(),
            manifest.len()
        );
        Ok(result)
    }

    /// Splits `attrs` into the remaining map and this convention's data.
    ///
    /// # Errors
    /// - `NotPresent/MissingRecord` when no manifest record has this uuid.
    /// - `NotPresent/Incomplete` when the record exists but no key of the
    ///   convention, or a required key, is missing.
    pub fn extract(&self, attrs: &AttributeMap) -> ConventionResult<(AttributeMap, ConventionData)> {
        let manifest = self
            .read_manifest(attrs)?
            .ok_or_else(|| ConventionError::missing_record(&self.spec.id))?;
        let manifest = manifest
            .remove_record(&self.spec.uuid)
            .map_err(|err| self.manifest_error(err))?;

        let missing = self.missing_keys(attrs);
        if !missing.is_empty() {
            return Err(ConventionError::NotPresent {
                convention: self.spec.id.clone(),
                reason: NotPresentReason::Incomplete { missing },
            });
        }

        let mut remaining = AttributeMap::new();
        let mut extracted = AttributeMap::new();
        for (key, value) in attrs {
            if key == MANIFEST_KEY {
                if !manifest.is_empty() {
                    remaining.insert(key.clone(), manifest.to_value());
                }
            } else if self.spec.owns_key(key) {
                extracted.insert(key.clone(), value.clone());
            } else {
                remaining.insert(key.clone(), value.clone());
            }
        }

        debug!(
            "event=convention_extract module=engine status=ok convention={} keys={} manifest_len={}",
            self.spec.id,
            extracted.len(),
            manifest.len()
        );
        Ok((
            remaining,
            ConventionData::from_raw(self.spec.id.clone(), extracted),
        ))
    }

    /// Every insert precondition against `attrs` and its parsed `manifest`.
    pub(crate) fn check_insert(
        &self,
        attrs: &AttributeMap,
        data: &ConventionData,
        manifest: Option<&Manifest>,
        options: InsertOptions,
    ) -> ConventionResult<()> {
        self.check_membership(data)?;
        if manifest.is_some_and(|manifest| manifest.contains(&self.spec.uuid)) {
            return Err(ConventionError::DuplicateRecord {
                convention: self.spec.id.clone(),
                uuid: self.spec.uuid,
            });
        }
        if options.overwrite {
            return Ok(());
        }
        for (key, value) in data.values() {
            if attrs.get(key).is_some_and(|existing| existing != value) {
                return Err(ConventionError::KeyCollision {
                    convention: self.spec.id.clone(),
                    key: key.clone(),
                });
            }
        }
        Ok(())
    }

    pub(crate) fn read_manifest(&self, attrs: &AttributeMap) -> ConventionResult<Option<Manifest>> {
        Manifest::read(attrs).map_err(|err| self.manifest_error(err))
    }

    /// Required keys absent from `attrs`; every recognized key when the
    /// convention has no key at all.
    fn missing_keys(&self, attrs: &AttributeMap) -> Vec<String> {
        if !attrs.keys().any(|key| self.spec.owns_key(key)) {
            return self.spec.recognized_keys();
        }
        self.spec
            .required_keys()
            .into_iter()
            .filter(|key| !attrs.contains_key(key))
            .collect()
    }

    fn check_membership(&self, data: &ConventionData) -> ConventionResult<()> {
        if data.convention() != self.spec.id {
            return Err(self.single_violation(
                &self.spec.name,
                format!("data belongs to convention `{}`", data.convention()),
            ));
        }
        let foreign: Vec<Violation> = data
            .keys()
            .filter(|key| !self.spec.owns_key(key))
            .map(|key| {
                Violation::new(
                    &self.spec.id,
                    key.clone(),
                    "is outside the convention namespace",
                )
            })
            .collect();
        if foreign.is_empty() {
            Ok(())
        } else {
            Err(SchemaError::new(foreign).into())
        }
    }

    fn owned_values(&self, attrs: &AttributeMap) -> AttributeMap {
        attrs
            .iter()
            .filter(|(key, _)| self.spec.owns_key(key))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect()
    }

    fn single_violation(&self, key: &str, message: impl Into<String>) -> ConventionError {
        SchemaError::single(Violation::new(&self.spec.id, key, message)).into()
    }

    fn manifest_error(&self, err: ManifestError) -> ConventionError {
        match err {
            ManifestError::DuplicateRecord(uuid) => ConventionError::DuplicateRecord {
                convention: self.spec.id.clone(),
                uuid,
            },
            ManifestError::RecordNotFound(_) => ConventionError::missing_record(&self.spec.id),
            ManifestError::Malformed(message) => ConventionError::MalformedManifest(message),
        }
    }
}
