//! Process-wide registry of the built-in conventions.

use crate::conventions;
use crate::registry::ConventionRegistry;
use once_cell::sync::Lazy;
use std::collections::BTreeSet;

static BUILTIN_REGISTRY: Lazy<ConventionRegistry> = Lazy::new(|| {
    ConventionRegistry::from_specs(conventions::builtin_specs())
        .expect("built-in convention specs are disjoint")
});

/// Built-in convention ids in registration order.
pub static CONVENTION_NAMES: Lazy<Vec<&'static str>> =
    Lazy::new(|| builtin_registry().convention_names());

/// Every key recognized by a built-in convention.
pub static ALL_CONVENTION_KEYS: Lazy<BTreeSet<String>> =
    Lazy::new(|| builtin_registry().all_convention_keys());

/// Immutable registry of the built-in conventions, built on first use.
pub fn builtin_registry() -> &'static ConventionRegistry {
    &BUILTIN_REGISTRY
}
