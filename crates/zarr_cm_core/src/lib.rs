//! Composition engine for zarr metadata conventions.
//!
//! Embeds, validates and removes convention key groups inside a generic
//! attribute map while keeping the `zarr_conventions` manifest consistent.

pub mod conventions;
pub mod engine;
pub mod error;
pub mod logging;
pub mod manifest;
pub mod model;
pub mod registry;

pub use conventions::{
    Convention, GeoProj, GeoProjFields, LayoutEntry, License, LicenseFields, Multiscales,
    MultiscalesFields, Spatial, SpatialFields, Transform, Ucum, Uom, UomFields,
};
pub use engine::multi::MultiConventionEngine;
pub use engine::single::{ConventionEngine, InsertOptions};
pub use engine::{
    create_many, extract_all, extract_many, insert_many, insert_many_with, validate_all,
    validate_many,
};
pub use error::{
    ConventionError, ConventionResult, ErrorKind, NotPresentReason, RegistryError, SchemaError,
    Violation,
};
pub use logging::{default_log_level, init_logging, logging_status, LoggingConfig};
pub use manifest::{validate_record_entry, Manifest, ManifestError, RecordQuery};
pub use model::attrs::{AttributeMap, ConventionData, MultiConventionAttrs, MANIFEST_KEY};
pub use model::record::ConventionRecord;
pub use registry::builtin::{builtin_registry, ALL_CONVENTION_KEYS, CONVENTION_NAMES};
pub use registry::spec::{ConventionSpec, FieldCheck, FieldRule, GroupRule, KeyLayout};
pub use registry::ConventionRegistry;

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::{core_version, CONVENTION_NAMES};

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }

    #[test]
    fn builtin_names_are_exported() {
        assert_eq!(CONVENTION_NAMES.len(), 5);
    }
}
