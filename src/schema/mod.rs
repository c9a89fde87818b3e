//! Schema model and resolution
//!
//! A [`SchemaDefinition`] describes the fields a merged document must carry.
//! Definitions are obtained at run time through a [`SchemaProvider`]; the
//! tool itself knows no schema. Two providers ship with the crate:
//! [`SchemaRegistry`] for definitions built in code, and
//! [`FileSchemaProvider`] for declarative schema files.

use std::fmt;

use regex::Regex;
use serde::Deserialize;

use crate::document::Value;
use crate::error::Result;

pub mod parse;
pub mod registry;

pub use registry::{FileSchemaProvider, SchemaRegistry};

/// Resolves schema definitions by name.
pub trait SchemaProvider {
    /// Where definitions come from, for messages.
    fn location(&self) -> String;

    /// Names of every definition this provider can resolve.
    fn schema_names(&self) -> Result<Vec<String>>;

    /// Resolve one definition, failing with `SchemaNotFound` when the name is unknown.
    fn resolve(&self, name: &str) -> Result<SchemaDefinition>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    String,
    Integer,
    Number,
    Boolean,
    Object,
    Array,
    Any,
}

impl FieldType {
    pub fn as_str(self) -> &'static str {
        match self {
            FieldType::String => "string",
            FieldType::Integer => "integer",
            FieldType::Number => "number",
            FieldType::Boolean => "boolean",
            FieldType::Object => "object",
            FieldType::Array => "array",
            FieldType::Any => "any",
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Compiled regular expression compared by its source text.
#[derive(Debug, Clone)]
pub struct Pattern(Regex);

impl Pattern {
    pub fn new(source: &str) -> std::result::Result<Self, regex::Error> {
        Regex::new(source).map(Pattern)
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    pub fn is_match(&self, text: &str) -> bool {
        self.0.is_match(text)
    }
}

impl PartialEq for Pattern {
    fn eq(&self, other: &Self) -> bool {
        self.as_str() == other.as_str()
    }
}

/// Declared fields of a mapping, in declaration order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ObjectSpec {
    pub fields: Vec<(String, FieldSpec)>,
    /// Reject keys that are not declared.
    pub strict: bool,
}

impl ObjectSpec {
    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|(n, _)| n == name).map(|(_, spec)| spec)
    }

    fn close(&mut self) {
        self.strict = true;
        for (_, spec) in &mut self.fields {
            spec.close();
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FieldSpec {
    pub field_type: FieldType,
    pub required: bool,
    pub nullable: bool,
    pub allowed: Option<Vec<Value>>,
    pub minimum: Option<f64>,
    pub maximum: Option<f64>,
    pub min_length: Option<usize>,
    pub max_length: Option<usize>,
    pub pattern: Option<Pattern>,
    pub min_items: Option<usize>,
    pub max_items: Option<usize>,
    pub items: Option<Box<FieldSpec>>,
    pub object: Option<ObjectSpec>,
}

impl FieldSpec {
    /// A required, non-nullable field of the given type with no constraints.
    pub fn new(field_type: FieldType) -> Self {
        Self {
            field_type,
            required: true,
            nullable: false,
            allowed: None,
            minimum: None,
            maximum: None,
            min_length: None,
            max_length: None,
            pattern: None,
            min_items: None,
            max_items: None,
            items: None,
            object: None,
        }
    }

    pub fn optional(mut self) -> Self {
        self.required = false;
        self
    }

    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    pub fn range(mut self, minimum: Option<f64>, maximum: Option<f64>) -> Self {
        self.minimum = minimum;
        self.maximum = maximum;
        self
    }

    pub fn length(mut self, min: Option<usize>, max: Option<usize>) -> Self {
        self.min_length = min;
        self.max_length = max;
        self
    }

    pub fn one_of(mut self, allowed: Vec<Value>) -> Self {
        self.allowed = Some(allowed);
        self
    }

    pub fn matching(mut self, pattern: Pattern) -> Self {
        self.pattern = Some(pattern);
        self
    }

    pub fn items(mut self, items: FieldSpec) -> Self {
        self.items = Some(Box::new(items));
        self
    }

    pub fn item_count(mut self, min: Option<usize>, max: Option<usize>) -> Self {
        self.min_items = min;
        self.max_items = max;
        self
    }

    pub fn fields(mut self, object: ObjectSpec) -> Self {
        self.object = Some(object);
        self
    }

    fn close(&mut self) {
        if let Some(object) = &mut self.object {
            object.close();
        }
        if let Some(items) = &mut self.items {
            items.close();
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SchemaDefinition {
    pub name: String,
    pub root: ObjectSpec,
}

impl SchemaDefinition {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), root: ObjectSpec::default() }
    }

    pub fn field(mut self, name: impl Into<String>, spec: FieldSpec) -> Self {
        self.root.fields.push((name.into(), spec));
        self
    }

    pub fn strict(mut self, strict: bool) -> Self {
        self.root.strict = strict;
        self
    }

    /// Mark this schema and every nested object as closed to unknown keys.
    pub fn into_closed(mut self) -> Self {
        self.root.close();
        self
    }
}
