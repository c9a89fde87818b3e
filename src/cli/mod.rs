//! Command-line interface for config-validator
//!
//! Provides `validate`, `merge` and `schemas` subcommands.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::settings::load_settings;

mod merge;
mod schemas;
mod validate;

/// Merge layered configuration files and validate them against a schema
#[derive(Parser)]
#[command(name = "config-validator")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging (sets log level to DEBUG)
    #[arg(long, global = true)]
    verbose: bool,

    /// Settings file (default: config-validator.toml or .yaml in the working directory)
    #[arg(long, global = true, value_name = "FILE")]
    settings: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Merge configuration files and validate the result against a schema
    Validate(validate::ValidateArgs),

    /// Merge configuration files and print the merged document
    Merge(merge::MergeArgs),

    /// List the schema definitions in a schema file
    Schemas(schemas::SchemasArgs),
}

pub fn run() -> Result<ExitCode> {
    let cli = Cli::parse();

    // RUST_LOG in the environment always takes precedence; --verbose falls back to DEBUG.
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(if cli.verbose { "debug" } else { "warn" }));
    let _ = tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .try_init();

    let cwd = std::env::current_dir()?;
    let settings = load_settings(&cwd, cli.settings.as_deref())?;

    match cli.command {
        Commands::Validate(args) => validate::run(args, &settings),
        Commands::Merge(args) => merge::run(args).map(|()| ExitCode::SUCCESS),
        Commands::Schemas(args) => schemas::run(args, &settings).map(|()| ExitCode::SUCCESS),
    }
}
