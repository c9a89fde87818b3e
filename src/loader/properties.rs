//! INI-style `.properties` reader and writer.
//!
//! Layout handled:
//! - `[section]` headers; every entry must belong to a section
//! - `key = value` or `key: value`, keys lowercased, values trimmed
//! - full-line `#` / `;` comments
//! - indented lines continue the previous value (joined with `\n`); blank
//!   lines between continuation lines are kept, trailing ones are dropped
//! - a `[DEFAULT]` section whose entries every other section inherits
//!
//! Values are never typed: everything stays a string.

use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

use crate::document::{ConfigDocument, Map, Value};

pub const DEFAULT_SECTION: &str = "DEFAULT";

static SECTION_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\[(?P<name>[^\]]+)\]\s*$").expect("valid section regex"));

#[derive(Debug, Error, PartialEq, Eq)]
#[error("line {line}: {message}")]
pub struct PropertiesError {
    pub line: usize,
    pub message: String,
}

impl PropertiesError {
    fn new(line: usize, message: impl Into<String>) -> Self {
        Self { line, message: message.into() }
    }
}

struct Section {
    name: String,
    entries: Vec<(String, String)>,
}

pub fn parse(content: &str) -> Result<ConfigDocument, PropertiesError> {
    let mut defaults: Vec<(String, String)> = Vec::new();
    let mut sections: Vec<Section> = Vec::new();
    // None until the first header; Some(None) while inside DEFAULT.
    let mut current: Option<Option<usize>> = None;
    let mut last_key: Option<String> = None;
    // Blank lines seen since the last entry line; they only become part of
    // the value if another continuation line follows.
    let mut pending_blanks = 0usize;

    for (idx, raw_line) in content.lines().enumerate() {
        let line_no = idx + 1;
        let line = raw_line.trim_end_matches('\r');
        let trimmed = line.trim();

        if trimmed.is_empty() {
            pending_blanks += 1;
            continue;
        }
        if trimmed.starts_with('#') || trimmed.starts_with(';') {
            continue;
        }

        let indented = line.starts_with(char::is_whitespace);
        if indented {
            if let (Some(section), Some(key)) = (current, last_key.as_ref()) {
                let entries = match section {
                    Some(i) => &mut sections[i].entries,
                    None => &mut defaults,
                };
                if let Some((_, value)) = entries.iter_mut().find(|(k, _)| k == key) {
                    value.push_str(&"\n".repeat(pending_blanks + 1));
                    value.push_str(trimmed);
                }
                pending_blanks = 0;
                continue;
            }
        }
        pending_blanks = 0;

        if let Some(caps) = SECTION_RE.captures(trimmed) {
            let name = caps["name"].to_string();
            if name == DEFAULT_SECTION {
                current = Some(None);
            } else {
                if sections.iter().any(|s| s.name == name) {
                    let message = format!("duplicate section [{name}]");
                    return Err(PropertiesError::new(line_no, message));
                }
                sections.push(Section { name, entries: Vec::new() });
                current = Some(Some(sections.len() - 1));
            }
            last_key = None;
            continue;
        }

        let Some(section) = current else {
            return Err(PropertiesError::new(line_no, "entry appears before any [section] header"));
        };

        let Some(split_at) = trimmed.find(['=', ':']) else {
            return Err(PropertiesError::new(
                line_no,
                format!("expected 'key = value' or 'key: value', found '{trimmed}'"),
            ));
        };
        let key = trimmed[..split_at].trim().to_lowercase();
        let value = trimmed[split_at + 1..].trim().to_string();
        if key.is_empty() {
            return Err(PropertiesError::new(line_no, "empty key"));
        }

        let entries = match section {
            Some(i) => &mut sections[i].entries,
            None => &mut defaults,
        };
        if entries.iter().any(|(k, _)| *k == key) {
            return Err(PropertiesError::new(line_no, format!("duplicate key '{key}'")));
        }
        entries.push((key.clone(), value));
        last_key = Some(key);
    }

    let mut doc = ConfigDocument::new();
    for section in sections {
        let mut map = Map::new();
        for (key, value) in section.entries {
            map.insert(key, Value::String(value));
        }
        for (key, value) in &defaults {
            if !map.contains_key(key) {
                map.insert(key.clone(), Value::String(value.clone()));
            }
        }
        doc.insert(section.name, Value::Object(map));
    }
    Ok(doc)
}

/// Write a two-level document back out. Scalars other than strings are
/// written as their text form; nulls, nested mappings and sequences cannot
/// be expressed and are rejected.
pub fn render(doc: &ConfigDocument) -> Result<String, String> {
    let mut out = String::new();
    for (section, body) in doc {
        if section.is_empty() || section.contains(['[', ']', '\n']) {
            return Err(format!("section name '{section}' cannot be written as a header"));
        }
        if section == DEFAULT_SECTION {
            return Err(format!("a [{DEFAULT_SECTION}] section would be read back as defaults"));
        }
        let Value::Object(entries) = body else {
            return Err(format!(
                "top-level key '{section}' must map to a section, found {}",
                crate::document::type_name(body)
            ));
        };

        if !out.is_empty() {
            out.push('\n');
        }
        out.push_str(&format!("[{section}]\n"));
        for (key, value) in entries {
            let unwritable = key.contains(['=', ':', '\n'])
                || key.starts_with(['#', ';', '['])
                || key.trim() != key
                || key.to_lowercase() != *key;
            if key.is_empty() || unwritable {
                return Err(format!("key '{key}' in [{section}] cannot be written"));
            }
            let text = match value {
                Value::String(s) => s.clone(),
                Value::Bool(b) => b.to_string(),
                Value::Number(n) => n.to_string(),
                other => {
                    return Err(format!(
                        "value of {section}.{key} must be a scalar, found {}",
                        crate::document::type_name(other)
                    ))
                }
            };
            if text.lines().any(|l| l.trim() != l) || text.trim() != text {
                return Err(format!(
                    "value of {section}.{key} has surrounding whitespace that would be lost"
                ));
            }
            let mut lines = text.lines();
            out.push_str(&format!("{key} = {}\n", lines.next().unwrap_or("")));
            for continuation in lines {
                if continuation.is_empty() {
                    out.push('\n');
                } else {
                    out.push_str(&format!("    {continuation}\n"));
                }
            }
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_sections_and_both_delimiters() {
        let doc = parse("[server]\nhost = localhost\nport: 8080\n\n[db]\nurl=postgres://x\n")
            .expect("parse");
        assert_eq!(
            Value::Object(doc),
            json!({
                "server": {"host": "localhost", "port": "8080"},
                "db": {"url": "postgres://x"}
            })
        );
    }

    #[test]
    fn keys_are_lowercased_and_comments_skipped() {
        let doc = parse("# top comment\n[App]\n; inline section comment\nLogLevel = DEBUG\n")
            .expect("parse");
        assert_eq!(doc["App"], json!({"loglevel": "DEBUG"}));
    }

    #[test]
    fn default_section_is_inherited_not_emitted() {
        let doc = parse("[DEFAULT]\nretries = 3\nregion = eu\n\n[a]\nregion = us\n\n[b]\n")
            .expect("parse");
        assert_eq!(doc.len(), 2);
        assert_eq!(doc["a"], json!({"region": "us", "retries": "3"}));
        assert_eq!(doc["b"], json!({"retries": "3", "region": "eu"}));
    }

    #[test]
    fn indented_lines_continue_values() {
        let doc = parse("[motd]\ntext = hello\n  world\n  again\nnext = 1\n").expect("parse");
        assert_eq!(doc["motd"], json!({"text": "hello\nworld\nagain", "next": "1"}));
    }

    #[test]
    fn blank_lines_inside_values_are_kept() {
        let doc = parse("[motd]\ntext = one\n\n  two\n\n\nnext = 1\n").expect("parse");
        assert_eq!(doc["motd"], json!({"text": "one\n\ntwo", "next": "1"}));
    }

    #[test]
    fn trailing_blank_lines_end_a_value() {
        let doc = parse("[a]\nx = 1\n\n\n[b]\ny = 2\n").expect("parse");
        assert_eq!(doc["a"], json!({"x": "1"}));
        assert_eq!(doc["b"], json!({"y": "2"}));
    }

    #[test]
    fn value_may_contain_delimiters() {
        let doc = parse("[db]\nurl = postgres://u:p@h/db?a=b\n").expect("parse");
        assert_eq!(doc["db"]["url"], json!("postgres://u:p@h/db?a=b"));
    }

    #[test]
    fn entry_before_header_is_rejected() {
        let err = parse("key = value\n[s]\n").unwrap_err();
        assert_eq!(err.line, 1);
        assert!(err.message.contains("before any [section]"));
    }

    #[test]
    fn duplicate_section_and_key_are_rejected() {
        let err = parse("[s]\na = 1\n[s]\n").unwrap_err();
        assert_eq!(err, PropertiesError::new(3, "duplicate section [s]"));

        let err = parse("[s]\na = 1\nA = 2\n").unwrap_err();
        assert_eq!(err.line, 3);
        assert!(err.message.contains("duplicate key 'a'"));
    }

    #[test]
    fn line_without_delimiter_is_rejected() {
        let err = parse("[s]\njust words\n").unwrap_err();
        assert_eq!(err.line, 2);
    }

    #[test]
    fn render_then_parse_round_trips() {
        let original = parse("[server]\nhost = localhost\nbanner = one\n  two\n\n[db]\nport = 5432\n")
            .expect("parse");
        let text = render(&original).expect("render");
        assert_eq!(parse(&text).expect("reparse"), original);
    }

    #[test]
    fn render_keeps_blank_lines_inside_values() {
        let Value::Object(doc) = json!({"motd": {"text": "one\n\ntwo"}}) else { unreachable!() };
        let text = render(&doc).expect("render");
        assert_eq!(parse(&text).expect("reparse"), doc);
    }

    #[test]
    fn render_rejects_what_would_not_read_back() {
        let cases = [
            (json!({"s": {"Port": "1"}}), "cannot be written"),
            (json!({"s": {" port": "1"}}), "cannot be written"),
            (json!({"DEFAULT": {"port": "1"}}), "read back as defaults"),
            (json!({"s": {"motd": "  padded"}}), "surrounding whitespace"),
            (json!({"s": {"motd": "one\n  indented"}}), "surrounding whitespace"),
            (json!({"s": {"motd": "trailing\n"}}), "surrounding whitespace"),
        ];
        for (value, expected) in cases {
            let Value::Object(doc) = value else { unreachable!() };
            let err = render(&doc).unwrap_err();
            assert!(err.contains(expected), "{err}");
        }
    }

    #[test]
    fn render_rejects_nested_values() {
        let doc = json!({"s": {"k": {"deep": 1}}});
        let Value::Object(doc) = doc else { unreachable!() };
        assert!(render(&doc).unwrap_err().contains("must be a scalar"));

        let flat = json!({"timeout": 30});
        let Value::Object(flat) = flat else { unreachable!() };
        assert!(render(&flat).unwrap_err().contains("must map to a section"));
    }
}
