//! Schemas command implementation

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use crate::schema::{FileSchemaProvider, SchemaProvider};
use crate::settings::Settings;

#[derive(Args)]
pub struct SchemasArgs {
    /// Schema file (YAML, JSON or TOML) holding named schema definitions
    #[arg(short = 'm', long = "schema-file", visible_alias = "model-file", value_name = "FILE")]
    pub schema_file: Option<PathBuf>,
}

pub fn run(args: SchemasArgs, settings: &Settings) -> Result<()> {
    let schema_file = args
        .schema_file
        .or_else(|| settings.schema_file())
        .context("No schema file given: pass --schema-file or set schema_file in settings")?;

    let registry = FileSchemaProvider::new(schema_file).load()?;
    println!("Schemas in {}:", registry.location());
    for name in registry.schema_names()? {
        if let Some(schema) = registry.get(&name) {
            let required = schema.root.fields.iter().filter(|(_, f)| f.required).count();
            let mode = if schema.root.strict { ", strict" } else { "" };
            println!(
                "  {} ({} field(s), {} required{})",
                name,
                schema.root.fields.len(),
                required,
                mode
            );
        }
    }
    Ok(())
}
