//! Error taxonomy shared by every pipeline stage.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

use crate::format::Format;
use crate::validate::FieldError;

pub type Result<T> = std::result::Result<T, ConfigError>;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Unsupported file type '{extension}' for {}", path.display())]
    UnsupportedFormat { path: PathBuf, extension: String },

    #[error("Failed reading {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid {format} in {}: {message}", path.display())]
    Parse { path: PathBuf, format: Format, message: String },

    #[error("Schema '{name}' not found in {location} (available: {})", display_names(available))]
    SchemaNotFound { name: String, location: String, available: Vec<String> },

    #[error("Failed to load schema source {location}: {message}")]
    SchemaLoad { location: String, message: String },

    #[error("Validation failed with {} error(s)", .0.len())]
    ValidationFailure(Vec<FieldError>),

    #[error("{stage} failed: {message}")]
    Stage { stage: String, message: String },
}

impl ConfigError {
    pub(crate) fn parse(
        path: impl Into<PathBuf>,
        format: Format,
        message: impl fmt::Display,
    ) -> Self {
        ConfigError::Parse { path: path.into(), format, message: message.to_string() }
    }

    pub(crate) fn schema_load(location: impl Into<String>, message: impl fmt::Display) -> Self {
        ConfigError::SchemaLoad { location: location.into(), message: message.to_string() }
    }
}

fn display_names(names: &[String]) -> String {
    if names.is_empty() {
        "none".to_string()
    } else {
        names.join(", ")
    }
}
