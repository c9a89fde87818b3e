//! Validation of a merged document against a schema.
//!
//! Validation is strict about types: a string that happens to contain digits
//! is still a string, whatever the source format. Every violation is
//! collected; nothing stops at the first error.

use std::fmt;

use serde::Serialize;

use crate::document::{describe_value, ConfigDocument, KeyPath, Map, Value};
use crate::schema::{FieldSpec, FieldType, ObjectSpec, SchemaDefinition};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    /// Key path in dot/bracket notation, e.g. `database.hosts[0]`.
    pub path: String,
    pub expected: String,
    pub actual: String,
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: expected {}, found {}", self.path, self.expected, self.actual)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationResult {
    Valid,
    Invalid(Vec<FieldError>),
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        matches!(self, ValidationResult::Valid)
    }

    pub fn errors(&self) -> &[FieldError] {
        match self {
            ValidationResult::Valid => &[],
            ValidationResult::Invalid(errors) => errors,
        }
    }
}

pub fn validate(doc: &ConfigDocument, schema: &SchemaDefinition) -> ValidationResult {
    let mut errors = Vec::new();
    check_object(doc, &schema.root, &KeyPath::root(), &mut errors);
    if errors.is_empty() {
        ValidationResult::Valid
    } else {
        ValidationResult::Invalid(errors)
    }
}

fn push(
    errors: &mut Vec<FieldError>,
    path: &KeyPath,
    expected: impl Into<String>,
    actual: impl Into<String>,
) {
    errors.push(FieldError {
        path: path.to_string(),
        expected: expected.into(),
        actual: actual.into(),
    });
}

fn check_object(
    map: &Map<String, Value>,
    spec: &ObjectSpec,
    at: &KeyPath,
    errors: &mut Vec<FieldError>,
) {
    for (name, field) in &spec.fields {
        let path = at.key(name);
        match map.get(name) {
            Some(value) => check_value(value, field, &path, errors),
            None if field.required => push(
                errors,
                &path,
                format!("required field of type {}", field.field_type),
                "missing",
            ),
            None => {}
        }
    }

    if spec.strict {
        for key in map.keys() {
            if spec.field(key).is_none() {
                let expected = "no undeclared fields (strict schema)";
                push(errors, &at.key(key), expected, "unexpected field");
            }
        }
    }
}

fn check_value(value: &Value, field: &FieldSpec, at: &KeyPath, errors: &mut Vec<FieldError>) {
    if value.is_null() {
        if field.nullable || !field.required || field.field_type == FieldType::Any {
            return;
        }
        push(errors, at, format!("{} (not null)", field.field_type), "null");
        return;
    }

    let type_ok = match (field.field_type, value) {
        (FieldType::Any, _) => true,
        (FieldType::String, Value::String(_)) => true,
        (FieldType::Integer, Value::Number(n)) => n.is_i64() || n.is_u64(),
        (FieldType::Number, Value::Number(_)) => true,
        (FieldType::Boolean, Value::Bool(_)) => true,
        (FieldType::Array, Value::Array(_)) => true,
        (FieldType::Object, Value::Object(_)) => true,
        _ => false,
    };
    if !type_ok {
        push(errors, at, field.field_type.as_str(), describe_value(value));
        return;
    }

    if let Some(allowed) = &field.allowed {
        if !allowed.contains(value) {
            let options = allowed.iter().map(Value::to_string).collect::<Vec<_>>().join(", ");
            push(errors, at, format!("one of [{options}]"), describe_value(value));
        }
    }

    match value {
        Value::Number(n) => check_range(n.as_f64().unwrap_or(f64::NAN), field, at, value, errors),
        Value::String(s) => check_string(s, field, at, value, errors),
        Value::Array(items) => {
            check_count(items.len(), field, at, errors);
            if let Some(item_spec) = &field.items {
                for (i, item) in items.iter().enumerate() {
                    check_value(item, item_spec, &at.index(i), errors);
                }
            }
        }
        Value::Object(map) => {
            if let Some(object) = &field.object {
                check_object(map, object, at, errors);
            }
        }
        Value::Bool(_) | Value::Null => {}
    }
}

fn check_range(
    n: f64,
    field: &FieldSpec,
    at: &KeyPath,
    value: &Value,
    errors: &mut Vec<FieldError>,
) {
    if let Some(min) = field.minimum {
        if n < min {
            push(errors, at, format!("value >= {min}"), describe_value(value));
        }
    }
    if let Some(max) = field.maximum {
        if n > max {
            push(errors, at, format!("value <= {max}"), describe_value(value));
        }
    }
}

fn check_string(
    s: &str,
    field: &FieldSpec,
    at: &KeyPath,
    value: &Value,
    errors: &mut Vec<FieldError>,
) {
    let len = s.chars().count();
    if let Some(min) = field.min_length {
        if len < min {
            push(errors, at, format!("at least {min} character(s)"), format!("{len} character(s)"));
        }
    }
    if let Some(max) = field.max_length {
        if len > max {
            push(errors, at, format!("at most {max} character(s)"), format!("{len} character(s)"));
        }
    }
    if let Some(pattern) = &field.pattern {
        if !pattern.is_match(s) {
            let expected = format!("string matching /{}/", pattern.as_str());
            push(errors, at, expected, describe_value(value));
        }
    }
}

fn check_count(count: usize, field: &FieldSpec, at: &KeyPath, errors: &mut Vec<FieldError>) {
    if let Some(min) = field.min_items {
        if count < min {
            push(errors, at, format!("at least {min} item(s)"), format!("{count} item(s)"));
        }
    }
    if let Some(max) = field.max_items {
        if count > max {
            push(errors, at, format!("at most {max} item(s)"), format!("{count} item(s)"));
        }
    }
}
