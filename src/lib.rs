//! Load, merge and validate layered configuration.
//!
//! ```text
//! files ──load──▶ documents ──merge──▶ merged ──validate(schema)──▶ result
//! ```

pub mod cli;
pub mod document;
pub mod error;
pub mod format;
pub mod loader;
pub mod merge;
pub mod pipeline;
pub mod render;
pub mod schema;
pub mod settings;
pub mod validate;

pub use document::{ConfigDocument, Value};
pub use error::{ConfigError, Result};
pub use format::Format;
pub use loader::load_document;
pub use merge::merge_documents;
pub use pipeline::{Pipeline, PipelineOutcome, PipelineRun, Stage, StageFailure};
pub use schema::{FileSchemaProvider, SchemaDefinition, SchemaProvider, SchemaRegistry};
pub use validate::{validate, FieldError, ValidationResult};
