//! Built-in convention descriptors.
//!
//! # Responsibility
//! - Declare identity, provenance URLs and field rules of each bundled
//!   convention.
//! - Offer typed field structs and per-convention entry points bound to the
//!   built-in registry.
//!
//! # Invariants
//! - `builtin_specs` order is the canonical `CONVENTION_NAMES` order.

pub mod geo_proj;
pub mod license;
pub mod multiscales;
pub mod spatial;
pub mod uom;

use crate::engine::single::{ConventionEngine, InsertOptions};
use crate::error::ConventionResult;
use crate::model::attrs::{AttributeMap, ConventionData};
use crate::registry::builtin::builtin_registry;
use crate::registry::spec::ConventionSpec;
use serde::Serialize;

pub use geo_proj::{GeoProj, GeoProjFields};
pub use license::{License, LicenseFields};
pub use multiscales::{LayoutEntry, Multiscales, MultiscalesFields, Transform};
pub use spatial::{Spatial, SpatialFields};
pub use uom::{Ucum, Uom, UomFields};

/// A bundled convention with a typed field struct.
///
/// The provided methods run the single-convention engine registered under
/// `ID` in the built-in registry.
pub trait Convention {
    /// Stable id, e.g. `geo-proj`.
    const ID: &'static str;
    /// Unprefixed fields accepted by `create`.
    type Fields: Serialize;

    fn spec() -> ConventionSpec;

    fn engine() -> ConventionResult<ConventionEngine<'static>> {
        Ok(builtin_registry().engine(Self::ID)?)
    }

    fn create(fields: &Self::Fields) -> ConventionResult<ConventionData> {
        Self::engine()?.create_from(fields)
    }

    fn validate(attrs: &AttributeMap) -> ConventionResult<ConventionData> {
        Self::engine()?.validate(attrs)
    }

    fn insert(attrs: &AttributeMap, data: &ConventionData) -> ConventionResult<AttributeMap> {
        Self::engine()?.insert(attrs, data)
    }

    fn insert_with(
        attrs: &AttributeMap,
        data: &ConventionData,
        options: InsertOptions,
    ) -> ConventionResult<AttributeMap> {
        Self::engine()?.insert_with(attrs, data, options)
    }

    fn extract(attrs: &AttributeMap) -> ConventionResult<(AttributeMap, ConventionData)> {
        Self::engine()?.extract(attrs)
    }
}

/// Specs of every bundled convention, in canonical order.
pub fn builtin_specs() -> Vec<ConventionSpec> {
    vec![
        GeoProj::spec(),
        Spatial::spec(),
        Multiscales::spec(),
        License::spec(),
        Uom::spec(),
    ]
}
