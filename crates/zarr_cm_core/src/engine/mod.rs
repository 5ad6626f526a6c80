//! Convention engines.
//!
//! `single` handles one convention at a time; `multi` composes several
//! atomically. The free functions below bind `multi` to the built-in
//! registry.

pub mod multi;
pub mod single;

use crate::engine::single::InsertOptions;
use crate::error::ConventionResult;
use crate::model::attrs::{AttributeMap, MultiConventionAttrs};
use crate::registry::builtin::builtin_registry;
use multi::MultiConventionEngine;

fn builtin_engine() -> MultiConventionEngine<'static> {
    MultiConventionEngine::new(builtin_registry())
}

/// `MultiConventionEngine::create_many` over the built-in conventions.
pub fn create_many<I, K>(fields_by_name: I) -> ConventionResult<MultiConventionAttrs>
where
    I: IntoIterator<Item = (K, AttributeMap)>,
    K: AsRef<str>,
{
    builtin_engine().create_many(fields_by_name)
}

/// `MultiConventionEngine::validate_many` over the built-in conventions.
pub fn validate_many<I, S>(
    data: &MultiConventionAttrs,
    names: I,
) -> ConventionResult<MultiConventionAttrs>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    builtin_engine().validate_many(data, names)
}

/// `MultiConventionEngine::validate_all` over the built-in conventions.
pub fn validate_all(data: &MultiConventionAttrs) -> ConventionResult<MultiConventionAttrs> {
    builtin_engine().validate_all(data)
}

/// `MultiConventionEngine::insert_many` over the built-in conventions.
pub fn insert_many(
    attrs: &AttributeMap,
    data: &MultiConventionAttrs,
) -> ConventionResult<AttributeMap> {
    builtin_engine().insert_many(attrs, data)
}

/// `MultiConventionEngine::insert_many_with` over the built-in conventions.
pub fn insert_many_with(
    attrs: &AttributeMap,
    data: &MultiConventionAttrs,
    options: InsertOptions,
) -> ConventionResult<AttributeMap> {
    builtin_engine().insert_many_with(attrs, data, options)
}

/// `MultiConventionEngine::extract_many` over the built-in conventions.
pub fn extract_many<I, S>(
    attrs: &AttributeMap,
    names: I,
) -> ConventionResult<(AttributeMap, MultiConventionAttrs)>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    builtin_engine().extract_many(attrs, names)
}

/// `MultiConventionEngine::extract_all` over the built-in conventions.
pub fn extract_all(attrs: &AttributeMap) -> ConventionResult<(AttributeMap, MultiConventionAttrs)> {
    builtin_engine().extract_all(attrs)
}
