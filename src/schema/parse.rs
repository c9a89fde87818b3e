//! Declarative schema documents.
//!
//! ```yaml
//! schemas:
//!   AppConfig:
//!     strict: false
//!     fields:
//!       timeout: { type: integer, minimum: 1, maximum: 300 }
//!       mode: { type: string, enum: [dev, prod] }
//!       name: string            # shorthand for { type: string }
//!       database:
//!         type: object
//!         strict: true
//!         fields:
//!           port: integer
//! ```

use serde::Deserialize;

use super::{FieldSpec, FieldType, ObjectSpec, Pattern, SchemaDefinition};
use crate::document::{ConfigDocument, Map, Value};

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawSchema {
    #[serde(default)]
    strict: bool,
    #[allow(dead_code)]
    description: Option<String>,
    #[serde(default)]
    fields: Map<String, Value>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawField {
    #[serde(rename = "type")]
    field_type: FieldType,
    #[serde(default = "default_required")]
    required: bool,
    #[serde(default)]
    nullable: bool,
    #[allow(dead_code)]
    description: Option<String>,
    #[serde(rename = "enum", default)]
    allowed: Option<Vec<Value>>,
    minimum: Option<f64>,
    maximum: Option<f64>,
    min_length: Option<usize>,
    max_length: Option<usize>,
    pattern: Option<String>,
    min_items: Option<usize>,
    max_items: Option<usize>,
    items: Option<Value>,
    fields: Option<Map<String, Value>>,
    strict: Option<bool>,
}

fn default_required() -> bool {
    true
}

/// Parse every definition under the top-level `schemas` table.
pub fn parse_schema_document(doc: &ConfigDocument) -> Result<Vec<SchemaDefinition>, String> {
    let Some(schemas) = doc.get("schemas") else {
        return Err("missing top-level 'schemas' table".to_string());
    };
    let Value::Object(schemas) = schemas else {
        return Err("'schemas' must be a mapping of schema name to definition".to_string());
    };

    schemas
        .iter()
        .map(|(name, body)| parse_schema(name, body).map_err(|e| format!("schemas.{name}: {e}")))
        .collect()
}

fn parse_schema(name: &str, body: &Value) -> Result<SchemaDefinition, String> {
    let raw: RawSchema = serde_json::from_value(body.clone()).map_err(|e| e.to_string())?;
    Ok(SchemaDefinition {
        name: name.to_string(),
        root: parse_fields(&raw.fields, raw.strict, "fields")?,
    })
}

fn parse_fields(fields: &Map<String, Value>, strict: bool, at: &str) -> Result<ObjectSpec, String> {
    let fields = fields
        .iter()
        .map(|(name, body)| {
            let path = format!("{at}.{name}");
            parse_field(body, &path).map(|spec| (name.clone(), spec))
        })
        .collect::<Result<Vec<_>, String>>()?;
    Ok(ObjectSpec { fields, strict })
}

fn parse_field(body: &Value, at: &str) -> Result<FieldSpec, String> {
    let body = match body {
        Value::String(shorthand) => {
            let mut map = Map::new();
            map.insert("type".to_string(), Value::String(shorthand.clone()));
            Value::Object(map)
        }
        other => other.clone(),
    };
    let raw: RawField = serde_json::from_value(body).map_err(|e| format!("{at}: {e}"))?;

    if raw.fields.is_some() && raw.field_type != FieldType::Object {
        return Err(format!("{at}: 'fields' is only allowed on object fields"));
    }
    if raw.strict.is_some() && raw.field_type != FieldType::Object {
        return Err(format!("{at}: 'strict' is only allowed on object fields"));
    }
    if raw.items.is_some() && raw.field_type != FieldType::Array {
        return Err(format!("{at}: 'items' is only allowed on array fields"));
    }
    if let (Some(min), Some(max)) = (raw.minimum, raw.maximum) {
        if min > max {
            return Err(format!("{at}: minimum {min} exceeds maximum {max}"));
        }
    }

    let pattern = raw
        .pattern
        .as_deref()
        .map(Pattern::new)
        .transpose()
        .map_err(|e| format!("{at}: invalid pattern: {e}"))?;
    let items = raw
        .items
        .as_ref()
        .map(|items| parse_field(items, &format!("{at}.items")))
        .transpose()?;
    let object = match &raw.fields {
        Some(fields) => {
            Some(parse_fields(fields, raw.strict.unwrap_or(false), &format!("{at}.fields"))?)
        }
        None if raw.strict == Some(true) => Some(ObjectSpec { fields: Vec::new(), strict: true }),
        None => None,
    };

    Ok(FieldSpec {
        field_type: raw.field_type,
        required: raw.required,
        nullable: raw.nullable,
        allowed: raw.allowed,
        minimum: raw.minimum,
        maximum: raw.maximum,
        min_length: raw.min_length,
        max_length: raw.max_length,
        pattern,
        min_items: raw.min_items,
        max_items: raw.max_items,
        items: items.map(Box::new),
        object,
    })
}
