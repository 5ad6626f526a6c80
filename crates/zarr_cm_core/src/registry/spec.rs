//! Static convention descriptors.
//!
//! # Responsibility
//! - Describe one convention: identity, provenance URLs, key layout and
//!   field rules.
//! - Translate between unprefixed field maps and attribute-map key groups.
//!
//! # Invariants
//! - A spec owns exactly the keys matched by `owns_key`; nothing else.
//! - `recognized_keys` lists keys in field-rule declaration order.

use crate::model::attrs::AttributeMap;
use crate::model::record::ConventionRecord;
use regex::Regex;
use serde_json::Value;
use uuid::Uuid;

/// How a convention's fields are laid out in the attribute map.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyLayout {
    /// Every field `f` is a top-level key `{name}{f}`, e.g. `proj:code`.
    Prefixed,
    /// One top-level key equal to `name` holds an object of fields.
    Nested,
}

/// Value check applied to one present field.
#[derive(Debug, Clone)]
pub enum FieldCheck {
    String,
    NonEmptyString,
    /// String matching `pattern`; `hint` names the expected form in messages.
    Pattern { pattern: Regex, hint: String },
    OneOf(Vec<String>),
    Object,
    /// Array of strings; empty `lengths` accepts any length.
    StringArray { lengths: Vec<usize> },
    NumberArray { lengths: Vec<usize> },
    /// Array of non-negative integers.
    UnsignedArray { lengths: Vec<usize> },
    /// Structural check returning one message per problem.
    Custom(fn(&Value) -> Vec<String>),
}

/// Rule for one field of a convention.
#[derive(Debug, Clone)]
pub struct FieldRule {
    /// Unprefixed field name, e.g. `code`.
    pub field: String,
    pub required: bool,
    pub check: FieldCheck,
}

impl FieldRule {
    pub fn required(field: impl Into<String>, check: FieldCheck) -> Self {
        Self {
            field: field.into(),
            required: true,
            check,
        }
    }

    pub fn optional(field: impl Into<String>, check: FieldCheck) -> Self {
        Self {
            field: field.into(),
            required: false,
            check,
        }
    }
}

/// Constraint spanning several optional fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GroupRule {
    ExactlyOneOf(Vec<String>),
    AtLeastOneOf(Vec<String>),
}

/// Immutable descriptor of one convention.
#[derive(Debug, Clone)]
pub struct ConventionSpec {
    /// Stable identifier used by the multi-convention API, e.g. `geo-proj`.
    pub id: String,
    /// Key prefix (prefixed layout) or owned key (nested layout).
    pub name: String,
    pub uuid: Uuid,
    pub schema_url: String,
    pub spec_url: String,
    pub description: String,
    pub layout: KeyLayout,
    pub fields: Vec<FieldRule>,
    pub groups: Vec<GroupRule>,
}

impl ConventionSpec {
    /// Provenance record inserted into the manifest.
    pub fn record(&self) -> ConventionRecord {
        ConventionRecord {
            uuid: self.uuid,
            schema_url: self.schema_url.clone(),
            spec_url: self.spec_url.clone(),
            name: self.name.clone(),
            description: self.description.clone(),
        }
    }

    /// Every attribute key this convention declares.
    pub fn recognized_keys(&self) -> Vec<String> {
        match self.layout {
            KeyLayout::Prefixed => self
                .fields
                .iter()
                .map(|rule| format!("{}{}", self.name, rule.field))
                .collect(),
            KeyLayout::Nested => vec![self.name.clone()],
        }
    }

    /// Whether `key` falls inside this convention's namespace.
    pub fn owns_key(&self, key: &str) -> bool {
        match self.layout {
            KeyLayout::Prefixed => key.len() > self.name.len() && key.starts_with(&self.name),
            KeyLayout::Nested => key == self.name,
        }
    }

    /// Top-level keys a complete instance must carry.
    pub fn required_keys(&self) -> Vec<String> {
        match self.layout {
            KeyLayout::Prefixed => self
                .fields
                .iter()
                .filter(|rule| rule.required)
                .map(|rule| format!("{}{}", self.name, rule.field))
                .collect(),
            KeyLayout::Nested => vec![self.name.clone()],
        }
    }

    /// Display path of a field, used in violation messages.
    pub fn field_key(&self, field: &str) -> String {
        match self.layout {
            KeyLayout::Prefixed => format!("{}{field}", self.name),
            KeyLayout::Nested => format!("{}.{field}", self.name),
        }
    }

    pub fn rule(&self, field: &str) -> Option<&FieldRule> {
        self.fields.iter().find(|rule| rule.field == field)
    }

    /// Lays out canonical fields as attribute keys, in rule order.
    ///
    /// Fields without a rule are dropped; callers reject them beforehand.
    pub fn shape(&self, fields: &AttributeMap) -> AttributeMap {
        let ordered = self.fields.iter().filter_map(|rule| {
            fields
                .get(&rule.field)
                .map(|value| (rule.field.clone(), value.clone()))
        });
        match self.layout {
            KeyLayout::Prefixed => ordered
                .map(|(field, value)| (format!("{}{field}", self.name), value))
                .collect(),
            KeyLayout::Nested => {
                let mut values = AttributeMap::new();
                values.insert(self.name.clone(), Value::Object(ordered.collect()));
                values
            }
        }
    }

    /// Recovers unprefixed fields from this convention's key group.
    ///
    /// Keys outside the namespace are ignored. A nested group whose value is
    /// not an object yields `Err` with the offending JSON type name.
    pub fn unshape(&self, values: &AttributeMap) -> Result<AttributeMap, &'static str> {
        match self.layout {
            KeyLayout::Prefixed => Ok(values
                .iter()
                .filter(|(key, _)| self.owns_key(key))
                .map(|(key, value)| (key[self.name.len()..].to_string(), value.clone()))
                .collect()),
            KeyLayout::Nested => match values.get(&self.name) {
                None => Ok(AttributeMap::new()),
                Some(Value::Object(fields)) => Ok(fields.clone()),
                Some(other) => Err(json_type_name(other)),
            },
        }
    }
}

pub(crate) fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
