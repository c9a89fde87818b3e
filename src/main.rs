//! config-validator: Merge layered configuration files and validate them
//!
//! Loads YAML, JSON, TOML and properties files in the order given, merges
//! them with later files taking precedence, and checks the result against a
//! named schema from a declarative schema file.

use std::process::ExitCode;

use anyhow::Result;

fn main() -> Result<ExitCode> {
    config_validator::cli::run()
}
