//! Error taxonomy for convention composition and extraction.
//!
//! # Responsibility
//! - Classify every failure into one of four categories: schema, collision,
//!   not-present and registry.
//! - Carry enough context (convention id, key, uuid) for callers to recover.
//!
//! # Invariants
//! - Errors are returned to the immediate caller; core code never logs or
//!   swallows them.
//! - A `SchemaError` lists every violation found, in discovery order.

use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

pub type ConventionResult<T> = Result<T, ConventionError>;

/// Failure category, independent of the concrete variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Schema,
    Collision,
    NotPresent,
    Registry,
}

/// One failed field check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    /// Stable id of the convention whose rule failed, e.g. `geo-proj`.
    pub convention: String,
    /// Attribute key (or nested path) the rule applies to.
    pub key: String,
    pub message: String,
}

impl Violation {
    pub fn new(
        convention: impl Into<String>,
        key: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            convention: convention.into(),
            key: key.into(),
            message: message.into(),
        }
    }
}

impl Display for Violation {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}: {}", self.convention, self.key, self.message)
    }
}

/// Aggregated field-rule failures from `create`/`validate`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaError {
    violations: Vec<Violation>,
}

impl SchemaError {
    pub fn new(violations: Vec<Violation>) -> Self {
        Self { violations }
    }

    pub fn single(violation: Violation) -> Self {
        Self::new(vec![violation])
    }

    pub fn violations(&self) -> &[Violation] {
        &self.violations
    }

    /// Ids of the conventions that reported at least one violation.
    pub fn conventions(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = Vec::new();
        for violation in &self.violations {
            if !ids.contains(&violation.convention.as_str()) {
                ids.push(violation.convention.as_str());
            }
        }
        ids
    }

    /// Appends every violation of `other` after the current ones.
    pub fn merge(&mut self, other: SchemaError) {
        self.violations.extend(other.violations);
    }
}

impl Display for SchemaError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "schema validation failed")?;
        for (idx, violation) in self.violations.iter().enumerate() {
            let sep = if idx == 0 { ": " } else { "; " };
            write!(f, "{sep}{violation}")?;
        }
        Ok(())
    }
}

impl Error for SchemaError {}

/// Registration-time failures of a `ConventionRegistry`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    DuplicatePrefix(String),
    DuplicateId(String),
    DuplicateUuid(Uuid),
    KeyOwnedElsewhere {
        key: String,
        owner: String,
        claimant: String,
    },
    ReservedName(String),
    InvalidSpec { id: String, reason: String },
    UnknownConvention(String),
    /// The same convention id was requested twice in one batch.
    RepeatedConvention(String),
}

impl Display for RegistryError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DuplicatePrefix(name) => {
                write!(f, "convention prefix already registered: {name}")
            }
            Self::DuplicateId(id) => write!(f, "convention id already registered: {id}"),
            Self::DuplicateUuid(uuid) => write!(f, "convention uuid already registered: {uuid}"),
            Self::KeyOwnedElsewhere {
                key,
                owner,
                claimant,
            } => write!(
                f,
                "key `{key}` of convention `{claimant}` is already owned by `{owner}`"
            ),
            Self::ReservedName(name) => write!(f, "convention name is reserved: {name}"),
            Self::InvalidSpec { id, reason } => {
                write!(f, "convention spec `{id}` is invalid: {reason}")
            }
            Self::UnknownConvention(id) => write!(f, "unknown convention: {id}"),
            Self::RepeatedConvention(id) => write!(f, "convention requested twice: {id}"),
        }
    }
}

impl Error for RegistryError {}

/// Why an extraction could not find a convention.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotPresentReason {
    /// No manifest record carries the convention uuid.
    MissingRecord,
    /// The record exists but the attribute map lacks the convention keys.
    Incomplete { missing: Vec<String> },
    /// A multi-convention input has no data for the convention.
    MissingData,
}

/// Top-level error for every core operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConventionError {
    Schema(SchemaError),
    KeyCollision {
        convention: String,
        key: String,
    },
    DuplicateRecord {
        convention: String,
        uuid: Uuid,
    },
    NotPresent {
        convention: String,
        reason: NotPresentReason,
    },
    MalformedManifest(String),
    Registry(RegistryError),
}

impl ConventionError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Schema(_) | Self::MalformedManifest(_) => ErrorKind::Schema,
            Self::KeyCollision { .. } | Self::DuplicateRecord { .. } => ErrorKind::Collision,
            Self::NotPresent { .. } => ErrorKind::NotPresent,
            Self::Registry(_) => ErrorKind::Registry,
        }
    }

    pub(crate) fn missing_record(convention: &str) -> Self {
        Self::NotPresent {
            convention: convention.to_string(),
            reason: NotPresentReason::MissingRecord,
        }
    }
}

impl Display for ConventionError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Schema(err) => write!(f, "{err}"),
            Self::KeyCollision { convention, key } => write!(
                f,
                "attrs already contain key `{key}` with a different value than convention `{convention}`"
            ),
            Self::DuplicateRecord { convention, uuid } => write!(
                f,
                "manifest already records convention `{convention}` (uuid {uuid})"
            ),
            Self::NotPresent {
                convention,
                reason: NotPresentReason::MissingRecord,
            } => write!(f, "convention `{convention}` is not recorded in the manifest"),
            Self::NotPresent {
                convention,
                reason: NotPresentReason::Incomplete { missing },
            } => write!(
                f,
                "convention `{convention}` is recorded but its keys are missing: {}",
                missing.join(", ")
            ),
            Self::NotPresent {
                convention,
                reason: NotPresentReason::MissingData,
            } => write!(f, "no data supplied for convention `{convention}`"),
            Self::MalformedManifest(message) => write!(f, "malformed manifest: {message}"),
            Self::Registry(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ConventionError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Schema(err) => Some(err),
            Self::Registry(err) => Some(err),
            _ => None,
        }
    }
}

impl From<SchemaError> for ConventionError {
    fn from(value: SchemaError) -> Self {
        Self::Schema(value)
    }
}

impl From<RegistryError> for ConventionError {
    fn from(value: RegistryError) -> Self {
        Self::Registry(value)
    }
}

#[cfg(test)]
mod tests {
    use super::{ConventionError, ErrorKind, NotPresentReason, SchemaError, Violation};

    #[test]
    fn schema_error_lists_every_violation() {
        let err = SchemaError::new(vec![
            Violation::new("spatial", "spatial:dimensions", "is required"),
            Violation::new("spatial", "spatial:bbox", "must have 4 or 6 items, got 2"),
        ]);
        let text = err.to_string();
        assert!(text.contains("spatial:dimensions"));
        assert!(text.contains("spatial:bbox"));
    }

    #[test]
    fn merged_schema_error_reports_each_convention_once() {
        let mut err = SchemaError::single(Violation::new("license", "license", "empty"));
        err.merge(SchemaError::new(vec![
            Violation::new("uom", "uom.ucum", "is required"),
            Violation::new("license", "license.url", "bad url"),
        ]));
        assert_eq!(err.conventions(), vec!["license", "uom"]);
        assert_eq!(err.violations().len(), 3);
    }

    #[test]
    fn kinds_follow_taxonomy() {
        let incomplete = ConventionError::NotPresent {
            convention: "geo-proj".to_string(),
            reason: NotPresentReason::Incomplete { missing: vec![] },
        };
        assert_eq!(incomplete.kind(), ErrorKind::NotPresent);
        assert_eq!(
            ConventionError::MalformedManifest("x".to_string()).kind(),
            ErrorKind::Schema
        );
        assert_eq!(
            ConventionError::KeyCollision {
                convention: "geo-proj".to_string(),
                key: "proj:code".to_string(),
            }
            .kind(),
            ErrorKind::Collision
        );
    }
}
