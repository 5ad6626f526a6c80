//! Multi-convention engine.
//!
//! # Responsibility
//! - Fan `create`/`validate`/`insert`/`extract` out over several conventions
//!   sharing one attribute map.
//!
//! # Invariants
//! - Conventions are always processed in registry order, never in caller
//!   iteration order, so manifest order is reproducible.
//! - `insert_many` checks every precondition of every convention before the
//!   result map is built; a failure leaves nothing applied.
//! - `create_many` and `validate_all` report schema violations of all
//!   failing conventions together.

use crate::engine::single::{ConventionEngine, InsertOptions};
use crate::error::{
    ConventionError, ConventionResult, NotPresentReason, RegistryError, SchemaError,
};
use crate::manifest::{Manifest, ManifestError};
use crate::model::attrs::{AttributeMap, MultiConventionAttrs};
use crate::registry::ConventionRegistry;
use log::debug;
use std::collections::{BTreeMap, BTreeSet};

/// Engine orchestrating every convention of one registry.
#[derive(Debug, Clone, Copy)]
pub struct MultiConventionEngine<'r> {
    registry: &'r ConventionRegistry,
}

impl<'r> MultiConventionEngine<'r> {
    pub fn new(registry: &'r ConventionRegistry) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &'r ConventionRegistry {
        self.registry
    }

    /// Runs `create` for each named convention.
    ///
    /// Fails without partial output when any name is unknown or repeated,
    /// or any convention reports violations; violations of all failing
    /// conventions are merged into one `SchemaError`.
    pub fn create_many<I, K>(&self, fields_by_name: I) -> ConventionResult<MultiConventionAttrs>
    where
        I: IntoIterator<Item = (K, AttributeMap)>,
        K: AsRef<str>,
    {
        let mut requested: BTreeMap<String, AttributeMap> = BTreeMap::new();
        for (name, fields) in fields_by_name {
            let name = name.as_ref();
            if requested.insert(name.to_string(), fields).is_some() {
                return Err(RegistryError::RepeatedConvention(name.to_string()).into());
            }
        }
        let ordered = self.ordered_engines(requested.keys())?;

        let mut created = MultiConventionAttrs::new();
        let mut failure: Option<SchemaError> = None;
        for engine in ordered {
            match engine.create(&requested[&engine.spec().id]) {
                Ok(data) => {
                    created.insert(data);
                }
                Err(ConventionError::Schema(err)) => merge_schema(&mut failure, err),
                Err(other) => return Err(other),
            }
        }
        if let Some(err) = failure {
            return Err(err.into());
        }

        debug!(
            "event=convention_create_many module=engine status=ok conventions={}",
            created.len()
        );
        Ok(created)
    }

    /// Validates the named subset of `data`, stopping at the first failure.
    pub fn validate_many<I, S>(
        &self,
        data: &MultiConventionAttrs,
        names: I,
    ) -> ConventionResult<MultiConventionAttrs>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let names: BTreeSet<String> = names
            .into_iter()
            .map(|name| name.as_ref().to_string())
            .collect();

        let mut validated = MultiConventionAttrs::new();
        for engine in self.ordered_engines(names.iter())? {
            let id = engine.spec().id.as_str();
            let entry = data.get(id).ok_or_else(|| ConventionError::NotPresent {
                convention: id.to_string(),
                reason: NotPresentReason::MissingData,
            })?;
            validated.insert(engine.validate_data(entry)?);
        }
        Ok(validated)
    }

    /// Validates every entry of `data`, merging the schema violations of
    /// all failing conventions into one error.
    pub fn validate_all(&self, data: &MultiConventionAttrs) -> ConventionResult<MultiConventionAttrs> {
        let mut validated = MultiConventionAttrs::new();
        let mut failure: Option<SchemaError> = None;
        for engine in self.ordered_engines(data.names())? {
            let Some(entry) = data.get(&engine.spec().id) else {
                continue;
            };
            match engine.validate_data(entry) {
                Ok(checked) => {
                    validated.insert(checked);
                }
                Err(ConventionError::Schema(err)) => merge_schema(&mut failure, err),
                Err(other) => return Err(other),
            }
        }
        match failure {
            Some(err) => Err(err.into()),
            None => Ok(validated),
        }
    }

    /// Inserts every convention of `data` into `attrs`, all or nothing.
    ///
    /// Key collisions with `attrs`, duplicate manifest records and keys
    /// claimed by two conventions of the batch are all detected before the
    /// result map is built.
    pub fn insert_many(
        &self,
        attrs: &AttributeMap,
        data: &MultiConventionAttrs,
    ) -> ConventionResult<AttributeMap> {
        self.insert_many_with(attrs, data, InsertOptions::default())
    }

    /// `insert_many` with explicit options; `overwrite` lets batch data
    /// replace differing existing values. Duplicate records still fail.
    pub fn insert_many_with(
        &self,
        attrs: &AttributeMap,
        data: &MultiConventionAttrs,
        options: InsertOptions,
    ) -> ConventionResult<AttributeMap> {
        let ordered = self.ordered_engines(data.names())?;

        let manifest = match ordered.first() {
            Some(engine) => engine.read_manifest(attrs)?,
            None => return Ok(attrs.clone()),
        };
        let mut claimed: BTreeMap<&str, &str> = BTreeMap::new();
        for engine in &ordered {
            let id = engine.spec().id.as_str();
            let Some(entry) = data.get(id) else {
                continue;
            };
            engine.check_insert(attrs, entry, manifest.as_ref(), options)?;
            // Backstop: membership checks plus disjoint registry namespaces
            // already keep batch conventions off each other's keys.
            for key in entry.keys() {
                if claimed.insert(key.as_str(), id).is_some() {
                    return Err(ConventionError::KeyCollision {
                        convention: id.to_string(),
                        key: key.clone(),
                    });
                }
            }
        }

        let mut result = attrs.clone();
        for engine in &ordered {
            if let Some(entry) = data.get(&engine.spec().id) {
                result = engine.insert_with(&result, entry, options)?;
            }
        }

        debug!(
            "event=convention_insert_many module=engine status=ok conventions={}",
            ordered.len()
        );
        Ok(result)
    }

    /// Extracts the named conventions; every one must be recorded.
    pub fn extract_many<I, S>(
        &self,
        attrs: &AttributeMap,
        names: I,
    ) -> ConventionResult<(AttributeMap, MultiConventionAttrs)>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let names: BTreeSet<String> = names
            .into_iter()
            .map(|name| name.as_ref().to_string())
            .collect();
        let ordered = self.ordered_engines(names.iter())?;

        if let Some(engine) = ordered.first() {
            let manifest = engine.read_manifest(attrs)?;
            for engine in &ordered {
                let recorded = manifest
                    .as_ref()
                    .is_some_and(|manifest| manifest.contains(&engine.spec().uuid));
                if !recorded {
                    return Err(ConventionError::missing_record(&engine.spec().id));
                }
            }
        }

        let mut remaining = attrs.clone();
        let mut extracted = MultiConventionAttrs::new();
        for engine in &ordered {
            let (rest, data) = engine.extract(&remaining)?;
            remaining = rest;
            extracted.insert(data);
        }

        debug!(
            "event=convention_extract_many module=engine status=ok conventions={}",
            extracted.len()
        );
        Ok((remaining, extracted))
    }

    /// Extracts every registered convention recorded in the manifest.
    ///
    /// Manifest entries whose uuid is not registered stay in `remaining`.
    pub fn extract_all(
        &self,
        attrs: &AttributeMap,
    ) -> ConventionResult<(AttributeMap, MultiConventionAttrs)> {
        let Some(manifest) = Manifest::read(attrs).map_err(|err| match err {
            ManifestError::Malformed(message) => ConventionError::MalformedManifest(message),
            other => ConventionError::MalformedManifest(other.to_string()),
        })?
        else {
            return Ok((attrs.clone(), MultiConventionAttrs::new()));
        };

        let discovered: Vec<&str> = manifest
            .uuids()
            .iter()
            .filter_map(|uuid| self.registry.lookup_by_uuid(uuid))
            .map(|spec| spec.id.as_str())
            .collect();
        self.extract_many(attrs, discovered)
    }

    /// Resolves `names` to engines in registry order.
    fn ordered_engines<I, S>(&self, names: I) -> ConventionResult<Vec<ConventionEngine<'r>>>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut wanted = BTreeSet::new();
        for name in names {
            let name = name.as_ref();
            if self.registry.get(name).is_none() {
                return Err(RegistryError::UnknownConvention(name.to_string()).into());
            }
            wanted.insert(name.to_string());
        }
        Ok(self
            .registry
            .iter()
            .filter(|spec| wanted.contains(&spec.id))
            .map(ConventionEngine::new)
            .collect())
    }
}

fn merge_schema(failure: &mut Option<SchemaError>, err: SchemaError) {
    match failure {
        Some(existing) => existing.merge(err),
        None => *failure = Some(err),
    }
}
