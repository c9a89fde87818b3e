//! Schema providers.

use std::path::{Path, PathBuf};

use super::parse::parse_schema_document;
use super::{SchemaDefinition, SchemaProvider};
use crate::document::ConfigDocument;
use crate::error::{ConfigError, Result};
use crate::format::Format;
use crate::loader::load_document;

/// In-memory name → definition table.
#[derive(Debug, Clone)]
pub struct SchemaRegistry {
    location: String,
    schemas: Vec<SchemaDefinition>,
}

impl Default for SchemaRegistry {
    fn default() -> Self {
        Self::new("<registry>")
    }
}

impl SchemaRegistry {
    pub fn new(location: impl Into<String>) -> Self {
        Self { location: location.into(), schemas: Vec::new() }
    }

    /// Add a definition, replacing any previous one with the same name.
    pub fn register(&mut self, schema: SchemaDefinition) -> &mut Self {
        match self.schemas.iter_mut().find(|s| s.name == schema.name) {
            Some(existing) => *existing = schema,
            None => self.schemas.push(schema),
        }
        self
    }

    pub fn with(mut self, schema: SchemaDefinition) -> Self {
        self.register(schema);
        self
    }

    /// Build a registry from a declarative schema document.
    pub fn from_document(doc: &ConfigDocument, location: impl Into<String>) -> Result<Self> {
        let location = location.into();
        let schemas = parse_schema_document(doc)
            .map_err(|message| ConfigError::schema_load(location.clone(), message))?;
        Ok(Self { location, schemas })
    }

    pub fn get(&self, name: &str) -> Option<&SchemaDefinition> {
        self.schemas.iter().find(|s| s.name == name)
    }

    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }
}

impl SchemaProvider for SchemaRegistry {
    fn location(&self) -> String {
        self.location.clone()
    }

    fn schema_names(&self) -> Result<Vec<String>> {
        Ok(self.schemas.iter().map(|s| s.name.clone()).collect())
    }

    fn resolve(&self, name: &str) -> Result<SchemaDefinition> {
        self.get(name).cloned().ok_or_else(|| ConfigError::SchemaNotFound {
            name: name.to_string(),
            location: self.location.clone(),
            available: self.schemas.iter().map(|s| s.name.clone()).collect(),
        })
    }
}

/// Reads definitions from a YAML, JSON or TOML schema file on each lookup.
///
/// Nothing is read until [`SchemaProvider::resolve`] or
/// [`SchemaProvider::schema_names`] is called, so a broken schema file
/// surfaces during schema resolution rather than at construction.
#[derive(Debug, Clone)]
pub struct FileSchemaProvider {
    path: PathBuf,
}

impl FileSchemaProvider {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Parse the schema file into a registry.
    pub fn load(&self) -> Result<SchemaRegistry> {
        let location = self.path.display().to_string();
        if Format::from_path(&self.path).ok() == Some(Format::Properties) {
            return Err(ConfigError::schema_load(
                location,
                "properties files cannot describe schemas; use YAML, JSON or TOML",
            ));
        }

        tracing::debug!("Loading schema definitions from {}", location);
        let doc = load_document(&self.path)
            .map_err(|err| ConfigError::schema_load(location.clone(), err))?;
        let registry = SchemaRegistry::from_document(&doc, location)?;
        tracing::debug!("Found {} schema definition(s)", registry.len());
        Ok(registry)
    }
}

impl SchemaProvider for FileSchemaProvider {
    fn location(&self) -> String {
        self.path.display().to_string()
    }

    fn schema_names(&self) -> Result<Vec<String>> {
        self.load()?.schema_names()
    }

    fn resolve(&self, name: &str) -> Result<SchemaDefinition> {
        self.load()?.resolve(name)
    }
}
