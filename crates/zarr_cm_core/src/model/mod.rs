//! Data shapes exchanged by the engines.
//!
//! # Responsibility
//! - Define the attribute map boundary type and the convention data units.
//! - Define the provenance record stored in the manifest.
//!
//! # Invariants
//! - `AttributeMap` preserves insertion order.
//! - `ConventionData` always names the convention that owns its keys.

pub mod attrs;
pub mod record;
