//! Merge command implementation

use std::path::PathBuf;

use anyhow::Result;
use clap::{ArgAction, Args};

use crate::format::Format;
use crate::merge::merge_documents;
use crate::pipeline::load_all;
use crate::render::render_document;

#[derive(Args)]
pub struct MergeArgs {
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

    /// Format of the printed document
    #[arg(short = 'o', long, value_name = "FORMAT", default_value = "yaml")]
    pub output_format: Format,
}

pub fn run(args: MergeArgs) -> Result<()> {
    let documents = load_all(&args.variables)?;
    let merged = merge_documents(&documents);
    print!("{}", render_document(&merged, args.output_format)?);
    Ok(())
}
