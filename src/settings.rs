//! Tool settings
//!
//! Defaults for the command line, layered with the usual precedence
//! (CLI > Env > File > Defaults). The CLI layer is applied by the command
//! modules; this module resolves the rest.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::ValueEnum;
use figment::providers::{Env, Format as _, Serialized, Toml, Yaml};
use figment::value::magic::RelativePathBuf;
use figment::Figment;
use serde::{Deserialize, Serialize};

pub const ENV_PREFIX: &str = "CONFIG_VALIDATOR_";

const CANDIDATES: [&str; 5] = [
    "config-validator.toml",
    ".config-validator.toml",
    "config-validator.yaml",
    ".config-validator.yaml",
    "config-validator.yml",
];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputMode {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Schema file used when `--schema-file` is not given. Relative paths
    /// read from a settings file are relative to that file.
    pub schema_file: Option<RelativePathBuf>,
    /// Schema name used when `--schema` is not given.
    pub schema: Option<String>,
    /// Close every schema to undeclared keys.
    pub strict: bool,
    pub output: OutputMode,
}

impl Settings {
    pub fn schema_file(&self) -> Option<PathBuf> {
        self.schema_file.as_ref().map(RelativePathBuf::relative)
    }
}

/// Resolve settings from `explicit` or the first candidate file in `dir`,
/// then the environment.
///
/// An explicitly named file must exist and parse. A discovered file that
/// fails to parse is skipped with a warning.
pub fn load_settings(dir: &Path, explicit: Option<&Path>) -> Result<Settings> {
    let file = match explicit {
        Some(path) => {
            if !path.is_file() {
                anyhow::bail!("Settings file not found: {}", path.display());
            }
            Some(path.to_path_buf())
        }
        None => discover_settings(dir),
    };

    let Some(file) = file else {
        return extract(base());
    };

    let ext = file.extension().and_then(|e| e.to_str()).unwrap_or("").to_ascii_lowercase();
    let layered = match ext.as_str() {
        "toml" => base().merge(Toml::file(&file)),
        "yaml" | "yml" => base().merge(Yaml::file(&file)),
        other => {
            let err = anyhow::anyhow!(
                "Unsupported settings extension '.{}' for file {}",
                other,
                file.display()
            );
            if explicit.is_some() {
                return Err(err);
            }
            tracing::warn!("{}", err);
            return extract(base());
        }
    };

    match extract(layered) {
        Ok(settings) => {
            tracing::debug!("Loaded settings from {}", file.display());
            Ok(settings)
        }
        Err(e) if explicit.is_none() => {
            tracing::warn!(
                "Failed to parse auto-discovered settings {}: {:#}",
                file.display(),
                e
            );
            extract(base())
        }
        Err(e) => Err(e.context(format!("Invalid settings file: {}", file.display()))),
    }
}

fn base() -> Figment {
    Figment::from(Serialized::defaults(Settings::default()))
}

fn extract(figment: Figment) -> Result<Settings> {
    figment
        .merge(Env::prefixed(ENV_PREFIX))
        .extract::<Settings>()
        .context("Failed to resolve settings")
}

fn discover_settings(dir: &Path) -> Option<PathBuf> {
    CANDIDATES.iter().map(|name| dir.join(name)).find(|path| path.is_file())
}
