//! Normalized, format-independent configuration document.
//!
//! Every loader converges on [`ConfigDocument`]: an insertion-ordered map of
//! string keys to JSON-model values. `serde_json` is built with
//! `preserve_order`, so key order follows the source file.

use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;
pub use serde_json::{Map, Number, Value};

pub type ConfigDocument = Map<String, Value>;

static PLAIN_KEY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_\-]*$").expect("valid key regex"));

const MAX_DISPLAY_CHARS: usize = 60;

/// Human readable type name used in error messages.
pub fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(n) if n.is_f64() => "number",
        Value::Number(_) => "integer",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Short rendering of a value together with its type, e.g. `"30" (string)`.
pub fn describe_value(value: &Value) -> String {
    match value {
        Value::Array(items) => format!("array of {} item(s)", items.len()),
        Value::Object(map) => format!("object with {} key(s)", map.len()),
        other => {
            let mut text = other.to_string();
            if text.chars().count() > MAX_DISPLAY_CHARS {
                text = text.chars().take(MAX_DISPLAY_CHARS).collect::<String>() + "...";
            }
            format!("{text} ({})", type_name(other))
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Key(String),
    Index(usize),
}

/// Location of a value inside a document, rendered in dot/bracket notation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyPath {
    segments: Vec<Segment>,
}

impl KeyPath {
    pub fn root() -> Self {
        Self::default()
    }

    pub fn key(&self, key: &str) -> Self {
        let mut next = self.clone();
        next.segments.push(Segment::Key(key.to_string()));
        next
    }

    pub fn index(&self, index: usize) -> Self {
        let mut next = self.clone();
        next.segments.push(Segment::Index(index));
        next
    }

    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }
}

impl fmt::Display for KeyPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.segments.is_empty() {
            return f.write_str("<root>");
        }
        for (i, segment) in self.segments.iter().enumerate() {
            match segment {
                Segment::Key(key) if PLAIN_KEY_RE.is_match(key) => {
                    if i > 0 {
                        f.write_str(".")?;
                    }
                    f.write_str(key)?;
                }
                Segment::Key(key) => write!(f, "[{}]", Value::String(key.clone()))?,
                Segment::Index(idx) => write!(f, "[{idx}]")?,
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn key_path_uses_dots_and_brackets() {
        let path = KeyPath::root().key("database").key("replicas").index(2).key("host");
        assert_eq!(path.to_string(), "database.replicas[2].host");
    }

    #[test]
    fn key_path_quotes_unusual_keys() {
        let path = KeyPath::root().key("servers").key("eu.west 1");
        assert_eq!(path.to_string(), "servers[\"eu.west 1\"]");
    }

    #[test]
    fn root_path_is_labelled() {
        assert!(KeyPath::root().is_root());
        assert_eq!(KeyPath::root().to_string(), "<root>");
    }

    #[test]
    fn type_names_distinguish_integers_from_floats() {
        assert_eq!(type_name(&json!(30)), "integer");
        assert_eq!(type_name(&json!(30.5)), "number");
        assert_eq!(type_name(&json!("30")), "string");
        assert_eq!(type_name(&json!(true)), "boolean");
    }

    #[test]
    fn describe_value_truncates_long_strings() {
        let long = "x".repeat(200);
        let described = describe_value(&Value::String(long));
        assert!(described.ends_with("... (string)"));
        assert_eq!(describe_value(&json!([1, 2])), "array of 2 item(s)");
    }
}
