//! Format loaders
//!
//! Each supported format is parsed with its native parser and then converted
//! into the shared [`ConfigDocument`] model, so later stages never see
//! format-specific value types.

use std::fs;
use std::path::Path;

use crate::document::{ConfigDocument, Map, Number, Value};
use crate::error::{ConfigError, Result};
use crate::format::Format;

pub mod properties;

/// Load a single configuration file, picking the parser from its extension.
pub fn load_document(path: &Path) -> Result<ConfigDocument> {
    let format = Format::from_path(path)?;
    let content = fs::read_to_string(path)
        .map_err(|source| ConfigError::Read { path: path.to_path_buf(), source })?;

    tracing::debug!("Parsing {} as {}", path.display(), format);
    let doc = parse_document(&content, format, path)?;
    tracing::debug!("Loaded {} top-level key(s) from {}", doc.len(), path.display());
    Ok(doc)
}

/// Parse already-read content. `origin` is only used for error messages.
pub fn parse_document(content: &str, format: Format, origin: &Path) -> Result<ConfigDocument> {
    let parsed = match format {
        Format::Yaml => parse_yaml(content),
        Format::Json => parse_json(content),
        Format::Toml => parse_toml(content),
        Format::Properties => properties::parse(content).map_err(|e| e.to_string()),
    };
    parsed.map_err(|message| ConfigError::parse(origin, format, message))
}

fn parse_json(content: &str) -> std::result::Result<ConfigDocument, String> {
    let raw: Value = serde_json::from_str(content).map_err(|e| e.to_string())?;
    match raw {
        Value::Object(map) => Ok(map),
        other => Err(top_level_error(crate::document::type_name(&other))),
    }
}

fn parse_yaml(content: &str) -> std::result::Result<ConfigDocument, String> {
    let mut raw: serde_yaml::Value =
        serde_yaml::from_str(content).map_err(|e| e.to_string())?;
    // `<<: *anchor` merge keys are expanded before conversion.
    raw.apply_merge().map_err(|e| e.to_string())?;
    // An empty YAML stream parses as null; treat it as an empty document.
    match yaml_to_value(raw)? {
        Value::Null => Ok(ConfigDocument::new()),
        Value::Object(map) => Ok(map),
        other => Err(top_level_error(crate::document::type_name(&other))),
    }
}

fn parse_toml(content: &str) -> std::result::Result<ConfigDocument, String> {
    let table: toml::Table = content.parse().map_err(|e: toml::de::Error| e.to_string())?;
    toml_table_to_map(table)
}

fn top_level_error(found: &str) -> String {
    format!("top-level value must be a mapping, found {found}")
}

fn float_value(f: f64) -> std::result::Result<Value, String> {
    Number::from_f64(f)
        .map(Value::Number)
        .ok_or_else(|| format!("non-finite number {f} is not supported in configuration values"))
}

fn yaml_to_value(value: serde_yaml::Value) -> std::result::Result<Value, String> {
    use serde_yaml::Value as Y;

    Ok(match value {
        Y::Null => Value::Null,
        Y::Bool(b) => Value::Bool(b),
        Y::Number(n) => {
            if let Some(i) = n.as_i64() {
                Value::from(i)
            } else if let Some(u) = n.as_u64() {
                Value::from(u)
            } else {
                float_value(n.as_f64().unwrap_or(f64::NAN))?
            }
        }
        Y::String(s) => Value::String(s),
        Y::Sequence(items) => Value::Array(
            items.into_iter().map(yaml_to_value).collect::<std::result::Result<_, _>>()?,
        ),
        Y::Mapping(mapping) => {
            let mut map = Map::new();
            for (key, val) in mapping {
                map.insert(yaml_key(key)?, yaml_to_value(val)?);
            }
            Value::Object(map)
        }
        Y::Tagged(tagged) => yaml_to_value(tagged.value)?,
    })
}

fn yaml_key(key: serde_yaml::Value) -> std::result::Result<String, String> {
    use serde_yaml::Value as Y;

    match key {
        Y::String(s) => Ok(s),
        Y::Bool(b) => Ok(b.to_string()),
        Y::Number(n) => Ok(n.to_string()),
        Y::Null => Ok("null".to_string()),
        Y::Tagged(tagged) => yaml_key(tagged.value),
        Y::Sequence(_) | Y::Mapping(_) => {
            Err("mapping keys must be scalars, found a collection".to_string())
        }
    }
}

fn toml_table_to_map(table: toml::Table) -> std::result::Result<ConfigDocument, String> {
    let mut map = Map::new();
    for (key, val) in table {
        map.insert(key, toml_to_value(val)?);
    }
    Ok(map)
}

fn toml_to_value(value: toml::Value) -> std::result::Result<Value, String> {
    use toml::Value as T;

    Ok(match value {
        T::String(s) => Value::String(s),
        T::Integer(i) => Value::from(i),
        T::Float(f) => float_value(f)?,
        T::Boolean(b) => Value::Bool(b),
        T::Datetime(dt) => Value::String(dt.to_string()),
        T::Array(items) => Value::Array(
            items.into_iter().map(toml_to_value).collect::<std::result::Result<_, _>>()?,
        ),
        T::Table(table) => Value::Object(toml_table_to_map(table)?),
    })
}
