//! Convention registry.
//!
//! # Responsibility
//! - Hold the immutable set of convention descriptors, in registration order.
//! - Reject descriptors whose key namespaces would overlap at registration.
//!
//! # Invariants
//! - No two specs share an id, a name (prefix) or a uuid.
//! - Every attribute key is owned by at most one registered spec.
//! - The manifest key is never owned by a spec.

pub mod builtin;
pub mod rules;
pub mod spec;

use crate::engine::single::ConventionEngine;
use crate::error::RegistryError;
use crate::model::attrs::MANIFEST_KEY;
use log::debug;
use spec::ConventionSpec;
use std::collections::BTreeSet;
use uuid::Uuid;

/// Ordered, append-only set of convention specs.
#[derive(Debug, Clone, Default)]
pub struct ConventionRegistry {
    specs: Vec<ConventionSpec>,
}

impl ConventionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a registry from `specs`, failing on the first conflict.
    pub fn from_specs(
        specs: impl IntoIterator<Item = ConventionSpec>,
    ) -> Result<Self, RegistryError> {
        let mut registry = Self::new();
        for spec in specs {
            registry.register(spec)?;
        }
        Ok(registry)
    }

    /// Registers one spec after checking it against every registered one.
    pub fn register(&mut self, spec: ConventionSpec) -> Result<(), RegistryError> {
        if spec.id.trim().is_empty() {
            return Err(RegistryError::InvalidSpec {
                id: spec.id.clone(),
                reason: "id must not be empty".to_string(),
            });
        }
        if spec.name.is_empty() {
            return Err(RegistryError::InvalidSpec {
                id: spec.id.clone(),
                reason: "name must not be empty".to_string(),
            });
        }
        if spec.fields.is_empty() {
            return Err(RegistryError::InvalidSpec {
                id: spec.id.clone(),
                reason: "at least one field rule is required".to_string(),
            });
        }
        if spec.name == MANIFEST_KEY || spec.owns_key(MANIFEST_KEY) {
            return Err(RegistryError::ReservedName(spec.name.clone()));
        }

        for existing in &self.specs {
            if existing.name == spec.name {
                return Err(RegistryError::DuplicatePrefix(spec.name.clone()));
            }
            if existing.id == spec.id {
                return Err(RegistryError::DuplicateId(spec.id.clone()));
            }
            if existing.uuid == spec.uuid {
                return Err(RegistryError::DuplicateUuid(spec.uuid));
            }
            let shadowed = spec
                .recognized_keys()
                .into_iter()
                .find(|key| existing.owns_key(key))
                .or_else(|| {
                    existing
                        .recognized_keys()
                        .into_iter()
                        .find(|key| spec.owns_key(key))
                });
            if let Some(key) = shadowed {
                return Err(RegistryError::KeyOwnedElsewhere {
                    key,
                    owner: existing.id.clone(),
                    claimant: spec.id.clone(),
                });
            }
        }

        debug!(
            "event=convention_register module=registry status=ok id={} name={} uuid={}",
            spec.id, spec.name, spec.uuid
        );
        self.specs.push(spec);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.specs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }

    /// Specs in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &ConventionSpec> {
        self.specs.iter()
    }

    pub fn get(&self, id: &str) -> Option<&ConventionSpec> {
        self.specs.iter().find(|spec| spec.id == id)
    }

    /// Returns the spec whose namespace contains `key`.
    pub fn lookup_by_prefix(&self, key: &str) -> Option<&ConventionSpec> {
        self.specs.iter().find(|spec| spec.owns_key(key))
    }

    pub fn lookup_by_uuid(&self, uuid: &Uuid) -> Option<&ConventionSpec> {
        self.specs.iter().find(|spec| spec.uuid == *uuid)
    }

    /// Convention ids in registration order.
    pub fn convention_names(&self) -> Vec<&str> {
        self.specs.iter().map(|spec| spec.id.as_str()).collect()
    }

    /// Union of every spec's recognized keys.
    pub fn all_convention_keys(&self) -> BTreeSet<String> {
        self.specs
            .iter()
            .flat_map(ConventionSpec::recognized_keys)
            .collect()
    }

    /// Single-convention engine bound to the spec registered as `id`.
    pub fn engine(&self, id: &str) -> Result<ConventionEngine<'_>, RegistryError> {
        self.get(id)
            .map(ConventionEngine::new)
            .ok_or_else(|| RegistryError::UnknownConvention(id.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::spec::{ConventionSpec, FieldCheck, FieldRule, KeyLayout};
    use super::ConventionRegistry;
    use crate::error::RegistryError;
    use uuid::Uuid;

    fn spec(id: &str, name: &str, layout: KeyLayout, uuid: u128) -> ConventionSpec {
        ConventionSpec {
            id: id.to_string(),
            name: name.to_string(),
            uuid: Uuid::from_u128(uuid),
            schema_url: format!("https://example.org/{id}/schema.json"),
            spec_url: format!("https://example.org/{id}/README.md"),
            description: format!("{id} convention"),
            layout,
            fields: vec![FieldRule::required("value", FieldCheck::String)],
            groups: vec![],
        }
    }

    #[test]
    fn keeps_registration_order() {
        let registry = ConventionRegistry::from_specs([
            spec("zeta", "zeta:", KeyLayout::Prefixed, 1),
            spec("alpha", "alpha", KeyLayout::Nested, 2),
        ])
        .expect("disjoint specs register");

        assert_eq!(registry.convention_names(), vec!["zeta", "alpha"]);
        assert_eq!(registry.lookup_by_prefix("zeta:value").unwrap().id, "zeta");
        assert_eq!(registry.lookup_by_prefix("alpha").unwrap().id, "alpha");
        assert!(registry.lookup_by_prefix("beta").is_none());
        assert_eq!(
            registry.lookup_by_uuid(&Uuid::from_u128(2)).unwrap().id,
            "alpha"
        );
    }

    #[test]
    fn rejects_duplicate_prefix() {
        let mut registry = ConventionRegistry::new();
        registry
            .register(spec("one", "dup:", KeyLayout::Prefixed, 1))
            .expect("first registration should succeed");
        let err = registry
            .register(spec("two", "dup:", KeyLayout::Prefixed, 2))
            .expect_err("duplicate prefix must fail");
        assert_eq!(err, RegistryError::DuplicatePrefix("dup:".to_string()));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn rejects_duplicate_id_and_uuid() {
        let mut registry = ConventionRegistry::new();
        registry
            .register(spec("one", "one:", KeyLayout::Prefixed, 1))
            .unwrap();
        assert!(matches!(
            registry.register(spec("one", "other:", KeyLayout::Prefixed, 2)),
            Err(RegistryError::DuplicateId(_))
        ));
        assert!(matches!(
            registry.register(spec("two", "two:", KeyLayout::Prefixed, 1)),
            Err(RegistryError::DuplicateUuid(_))
        ));
    }

    #[test]
    fn rejects_shadowing_namespace() {
        let mut registry = ConventionRegistry::new();
        registry
            .register(spec("outer", "geo:", KeyLayout::Prefixed, 1))
            .unwrap();
        let err = registry
            .register(spec("inner", "geo:proj:", KeyLayout::Prefixed, 2))
            .expect_err("nested prefix must fail");
        assert!(matches!(err, RegistryError::KeyOwnedElsewhere { .. }));
    }

    #[test]
    fn rejects_manifest_key_and_empty_specs() {
        let mut registry = ConventionRegistry::new();
        assert!(matches!(
            registry.register(spec("m", "zarr_conventions", KeyLayout::Nested, 1)),
            Err(RegistryError::ReservedName(_))
        ));

        let mut empty = spec("e", "e:", KeyLayout::Prefixed, 2);
        empty.fields.clear();
        assert!(matches!(
            registry.register(empty),
            Err(RegistryError::InvalidSpec { .. })
        ));
    }

    #[test]
    fn rejects_empty_name() {
        let mut registry = ConventionRegistry::new();
        let err = registry
            .register(spec("blank", "", KeyLayout::Prefixed, 1))
            .expect_err("empty name must fail");
        assert_eq!(
            err,
            RegistryError::InvalidSpec {
                id: "blank".to_string(),
                reason: "name must not be empty".to_string(),
            }
        );
        assert!(registry.is_empty());
    }

    #[test]
    fn unknown_engine_is_a_registry_error() {
        let registry = ConventionRegistry::new();
        let err = registry.engine("missing").err().unwrap();
        assert_eq!(err, RegistryError::UnknownConvention("missing".to_string()));
    }
}
