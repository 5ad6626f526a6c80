//! Field rule evaluation.
//!
//! Every check is an explicit function over JSON values; no rule ever
//! inspects keys outside the field map it is handed.

use crate::error::Violation;
use crate::model::attrs::AttributeMap;
use crate::registry::spec::{json_type_name, ConventionSpec, FieldCheck, GroupRule};
use serde_json::Value;

/// Applies every field and group rule of `spec` to unprefixed `fields`.
///
/// Returns all violations in rule order; an empty vector means valid.
pub fn check_fields(spec: &ConventionSpec, fields: &AttributeMap) -> Vec<Violation> {
    let mut violations = Vec::new();

    for rule in &spec.fields {
        let key = spec.field_key(&rule.field);
        match fields.get(&rule.field) {
            None if rule.required => {
                violations.push(Violation::new(&spec.id, key, "is required"));
            }
            None => {}
            Some(value) => {
                for message in check_value(&rule.check, value) {
                    violations.push(Violation::new(&spec.id, key.clone(), message));
                }
            }
        }
    }

    for group in &spec.groups {
        if let Some(message) = check_group(spec, group, fields) {
            violations.push(Violation::new(&spec.id, spec.name.clone(), message));
        }
    }

    violations
}

/// Reports fields that no rule of `spec` declares.
pub fn unknown_fields(spec: &ConventionSpec, fields: &AttributeMap) -> Vec<Violation> {
    fields
        .keys()
        .filter(|field| spec.rule(field).is_none())
        .map(|field| Violation::new(&spec.id, spec.field_key(field), "is not a recognized field"))
        .collect()
}

/// Runs one value check, returning a message per problem.
pub fn check_value(check: &FieldCheck, value: &Value) -> Vec<String> {
    match check {
        FieldCheck::String => expect_string(value).err().into_iter().collect(),
        FieldCheck::NonEmptyString => match expect_string(value) {
            Ok(text) if text.trim().is_empty() => vec!["must not be empty".to_string()],
            Ok(_) => vec![],
            Err(message) => vec![message],
        },
        FieldCheck::Pattern { pattern, hint } => match expect_string(value) {
            Ok(text) if !pattern.is_match(text) => {
                vec![format!("must be {hint}, got {text:?}")]
            }
            Ok(_) => vec![],
            Err(message) => vec![message],
        },
        FieldCheck::OneOf(allowed) => match expect_string(value) {
            Ok(text) if !allowed.iter().any(|candidate| candidate == text) => vec![format!(
                "must be one of {}, got {text:?}",
                quoted_list(allowed)
            )],
            Ok(_) => vec![],
            Err(message) => vec![message],
        },
        FieldCheck::Object => match value {
            Value::Object(_) => vec![],
            other => vec![format!("must be an object, got {}", json_type_name(other))],
        },
        FieldCheck::StringArray { lengths } => {
            check_array(value, lengths, "strings", Value::is_string)
        }
        FieldCheck::NumberArray { lengths } => {
            check_array(value, lengths, "numbers", Value::is_number)
        }
        FieldCheck::UnsignedArray { lengths } => {
            check_array(value, lengths, "non-negative integers", Value::is_u64)
        }
        FieldCheck::Custom(check) => check(value),
    }
}

fn expect_string(value: &Value) -> Result<&str, String> {
    value
        .as_str()
        .ok_or_else(|| format!("must be a string, got {}", json_type_name(value)))
}

fn check_array(
    value: &Value,
    lengths: &[usize],
    item_kind: &str,
    item_ok: fn(&Value) -> bool,
) -> Vec<String> {
    let Some(items) = value.as_array() else {
        return vec![format!("must be an array, got {}", json_type_name(value))];
    };

    let mut messages = Vec::new();
    if !lengths.is_empty() && !lengths.contains(&items.len()) {
        let expected = lengths
            .iter()
            .map(usize::to_string)
            .collect::<Vec<_>>()
            .join(" or ");
        messages.push(format!("must have {expected} items, got {}", items.len()));
    }
    if !items.iter().all(item_ok) {
        messages.push(format!("must contain only {item_kind}"));
    }
    messages
}

fn check_group(spec: &ConventionSpec, group: &GroupRule, fields: &AttributeMap) -> Option<String> {
    match group {
        GroupRule::ExactlyOneOf(names) => {
            let present = present_keys(spec, names, fields);
            (present.len() != 1).then(|| {
                format!(
                    "exactly one of {} must be present, got [{}]",
                    quoted_keys(spec, names),
                    present.join(", ")
                )
            })
        }
        GroupRule::AtLeastOneOf(names) => present_keys(spec, names, fields)
            .is_empty()
            .then(|| format!("at least one of {} must be present", quoted_keys(spec, names))),
    }
}

fn present_keys(spec: &ConventionSpec, names: &[String], fields: &AttributeMap) -> Vec<String> {
    names
        .iter()
        .filter(|name| fields.contains_key(name.as_str()))
        .map(|name| spec.field_key(name))
        .collect()
}

fn quoted_keys(spec: &ConventionSpec, names: &[String]) -> String {
    let keys: Vec<String> = names.iter().map(|name| spec.field_key(name)).collect();
    quoted_list(&keys)
}

fn quoted_list(values: &[String]) -> String {
    values
        .iter()
        .map(|value| format!("'{value}'"))
        .collect::<Vec<_>>()
        .join(", ")
}
