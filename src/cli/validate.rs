//! Validate command implementation

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{ArgAction, Args};
use serde_json::json;

use crate::pipeline::{Pipeline, PipelineOutcome};
use crate::schema::FileSchemaProvider;
use crate::settings::{OutputMode, Settings};

#[derive(Args)]
pub struct ValidateArgs {
    /// Configuration files, applied in order (later files override earlier ones)
    #[arg(
        short = 'v',
        long = "variables",
        value_name = "FILE",
        num_args = 1..,
        required = true,
        action = ArgAction::Append
    )]
    pub variables: Vec<PathBuf>,

    /// Schema file (YAML, JSON or TOML) holding named schema definitions
    #[arg(short = 'm', long = "schema-file", visible_alias = "model-file", value_name = "FILE")]
    pub schema_file: Option<PathBuf>,

    /// Name of the schema definition to validate against
    #[arg(short = 'c', long = "schema", visible_alias = "class-model", value_name = "NAME")]
    pub schema: Option<String>,

    /// Reject keys the schema does not declare
    #[arg(long)]
    pub strict: bool,

    /// Report format
    #[arg(long, value_name = "MODE")]
    pub output: Option<OutputMode>,
}

pub fn run(args: ValidateArgs, settings: &Settings) -> Result<ExitCode> {
    let schema_file = args
        .schema_file
        .or_else(|| settings.schema_file())
        .context("No schema file given: pass --schema-file or set schema_file in settings")?;
    let schema_name = args
        .schema
        .or_else(|| settings.schema.clone())
        .context("No schema name given: pass --schema or set schema in settings")?;
    let strict = args.strict || settings.strict;
    let output = args.output.unwrap_or(settings.output);

    let provider = FileSchemaProvider::new(schema_file);
    let file_count = args.variables.len();
    let run = Pipeline::new(args.variables, &provider, schema_name.clone()).closed(strict).run();

    match output {
        OutputMode::Text => report_text(&run.outcome, &schema_name, file_count),
        OutputMode::Json => report_json(&run.outcome, &schema_name)?,
    }
    Ok(ExitCode::from(run.outcome.exit_code()))
}

fn report_text(outcome: &PipelineOutcome, schema_name: &str, file_count: usize) {
    match outcome {
        PipelineOutcome::Valid(_) => {
            println!(
                "Validation successful: {} file(s) merged and checked against '{}'",
                file_count, schema_name
            );
        }
        PipelineOutcome::Invalid(errors) => {
            println!("Validation failed with {} error(s):", errors.len());
            for error in errors {
                println!("  - {}", error);
            }
        }
        PipelineOutcome::Failed(failure) => {
            eprintln!("Error: {}", failure);
        }
    }
}

fn report_json(outcome: &PipelineOutcome, schema_name: &str) -> Result<()> {
    let report = match outcome {
        PipelineOutcome::Valid(doc) => json!({
            "status": "valid",
            "schema": schema_name,
            "config": doc,
        }),
        PipelineOutcome::Invalid(errors) => json!({
            "status": "invalid",
            "schema": schema_name,
            "errors": errors,
        }),
        PipelineOutcome::Failed(failure) => json!({
            "status": "failed",
            "schema": schema_name,
            "stage": failure.stage.as_str(),
            "error": failure.error.to_string(),
        }),
    };
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
