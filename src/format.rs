//! Source format detection.

use std::fmt;
use std::path::Path;

use clap::ValueEnum;

use crate::error::{ConfigError, Result};

/// On-disk formats understood by the loader.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Format {
    Yaml,
    Json,
    Toml,
    Properties,
}

impl Format {
    /// Resolve the format from a file extension, ignoring case.
    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("").to_ascii_lowercase();
        match ext.as_str() {
            "yaml" | "yml" => Ok(Format::Yaml),
            "json" => Ok(Format::Json),
            "toml" => Ok(Format::Toml),
            "properties" => Ok(Format::Properties),
            _ => Err(ConfigError::UnsupportedFormat {
                path: path.to_path_buf(),
                extension: if ext.is_empty() { "<none>".to_string() } else { format!(".{ext}") },
            }),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Format::Yaml => "YAML",
            Format::Json => "JSON",
            Format::Toml => "TOML",
            Format::Properties => "properties",
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
