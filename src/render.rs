//! Serialize a normalized document back into one of the source formats.

use crate::document::{ConfigDocument, Value};
use crate::error::{ConfigError, Result};
use crate::format::Format;
use crate::loader::properties;

pub fn render_document(doc: &ConfigDocument, format: Format) -> Result<String> {
    let rendered = match format {
        Format::Json => {
            serde_json::to_string_pretty(doc).map(|s| s + "\n").map_err(|e| e.to_string())
        }
        Format::Yaml => serde_yaml::to_string(doc).map_err(|e| e.to_string()),
        Format::Toml => render_toml(doc),
        Format::Properties => properties::render(doc),
    };
    rendered.map_err(|message| ConfigError::Stage {
        stage: format!("Rendering {format}"),
        message,
    })
}

fn render_toml(doc: &ConfigDocument) -> std::result::Result<String, String> {
    let mut table = toml::Table::new();
    for (key, value) in doc {
        table.insert(key.clone(), to_toml(value, key)?);
    }
    toml::to_string_pretty(&table).map_err(|e| e.to_string())
}

fn to_toml(value: &Value, path: &str) -> std::result::Result<toml::Value, String> {
    Ok(match value {
        Value::Null => return Err(format!("TOML has no null; cannot write '{path}'")),
        Value::Bool(b) => toml::Value::Boolean(*b),
        Value::Number(n) => match n.as_i64() {
            Some(i) => toml::Value::Integer(i),
            None => match n.as_f64() {
                Some(f) if n.is_f64() => toml::Value::Float(f),
                _ => return Err(format!("integer at '{path}' does not fit in TOML's 64-bit range")),
            },
        },
        Value::String(s) => toml::Value::String(s.clone()),
        Value::Array(items) => toml::Value::Array(
            items
                .iter()
                .enumerate()
                .map(|(i, item)| to_toml(item, &format!("{path}[{i}]")))
                .collect::<std::result::Result<_, _>>()?,
        ),
        Value::Object(map) => {
            let mut table = toml::Table::new();
            for (key, val) in map {
                table.insert(key.clone(), to_toml(val, &format!("{path}.{key}"))?);
            }
            toml::Value::Table(table)
        }
    })
}
