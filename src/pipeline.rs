//! Load → merge → resolve schema → validate.
//!
//! Stages run strictly in sequence. A failure while loading, merging or
//! resolving the schema ends the run immediately, so validation only ever
//! sees a fully assembled document.

use std::fmt;
use std::path::{Path, PathBuf};

use crate::document::ConfigDocument;
use crate::error::{ConfigError, Result};
use crate::loader::load_document;
use crate::merge::merge_documents;
use crate::schema::SchemaProvider;
use crate::validate::{validate, FieldError, ValidationResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Idle,
    Loading,
    Merging,
    ResolvingSchema,
    Validating,
    Done,
}

impl Stage {
    pub fn as_str(self) -> &'static str {
        match self {
            Stage::Idle => "idle",
            Stage::Loading => "loading",
            Stage::Merging => "merging",
            Stage::ResolvingSchema => "resolving schema",
            Stage::Validating => "validating",
            Stage::Done => "done",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which stage failed and why.
#[derive(Debug)]
pub struct StageFailure {
    pub stage: Stage,
    pub error: ConfigError,
}

impl fmt::Display for StageFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} stage failed: {}", self.stage, self.error)
    }
}

#[derive(Debug)]
pub enum PipelineOutcome {
    Valid(ConfigDocument),
    Invalid(Vec<FieldError>),
    Failed(StageFailure),
}

impl PipelineOutcome {
    pub fn is_valid(&self) -> bool {
        matches!(self, PipelineOutcome::Valid(_))
    }

    /// Process exit status: 0 valid, 1 invalid, 2 failed.
    pub fn exit_code(&self) -> u8 {
        match self {
            PipelineOutcome::Valid(_) => 0,
            PipelineOutcome::Invalid(_) => 1,
            PipelineOutcome::Failed(_) => 2,
        }
    }

    pub fn into_result(self) -> Result<ConfigDocument> {
        match self {
            PipelineOutcome::Valid(doc) => Ok(doc),
            PipelineOutcome::Invalid(errors) => Err(ConfigError::ValidationFailure(errors)),
            PipelineOutcome::Failed(failure) => Err(failure.error),
        }
    }
}

/// Result of one run together with every stage it entered.
#[derive(Debug)]
pub struct PipelineRun {
    pub outcome: PipelineOutcome,
    pub stages: Vec<Stage>,
}

pub struct Pipeline<'a> {
    inputs: Vec<PathBuf>,
    provider: &'a dyn SchemaProvider,
    schema_name: String,
    closed: bool,
}

impl<'a> Pipeline<'a> {
    /// `inputs` are applied in the given order: later files take precedence.
    pub fn new(
        inputs: Vec<PathBuf>,
        provider: &'a dyn SchemaProvider,
        schema_name: impl Into<String>,
    ) -> Self {
        Self { inputs, provider, schema_name: schema_name.into(), closed: false }
    }

    /// Treat the resolved schema as closed to undeclared keys.
    pub fn closed(mut self, closed: bool) -> Self {
        self.closed = closed;
        self
    }

    pub fn run(&self) -> PipelineRun {
        let mut stages = vec![Stage::Idle];
        let outcome = self.execute(&mut stages);
        stages.push(Stage::Done);
        match &outcome {
            PipelineOutcome::Valid(_) => tracing::info!("Configuration is valid"),
            PipelineOutcome::Invalid(errors) => {
                tracing::info!("Configuration is invalid ({} field error(s))", errors.len())
            }
            PipelineOutcome::Failed(failure) => tracing::warn!("{}", failure),
        }
        PipelineRun { outcome, stages }
    }

    fn execute(&self, stages: &mut Vec<Stage>) -> PipelineOutcome {
        let fail = |stage: Stage, error: ConfigError| {
            PipelineOutcome::Failed(StageFailure { stage, error })
        };

        stages.push(Stage::Loading);
        let documents = match load_all(&self.inputs) {
            Ok(docs) => docs,
            Err(err) => return fail(Stage::Loading, err),
        };

        stages.push(Stage::Merging);
        let merged = merge_documents(&documents);
        tracing::debug!("Merged {} document(s) into {} key(s)", documents.len(), merged.len());

        stages.push(Stage::ResolvingSchema);
        tracing::debug!(
            "Resolving schema '{}' from {}",
            self.schema_name,
            self.provider.location()
        );
        let schema = match self.provider.resolve(&self.schema_name) {
            Ok(schema) if self.closed => schema.into_closed(),
            Ok(schema) => schema,
            Err(err) => return fail(Stage::ResolvingSchema, err),
        };

        stages.push(Stage::Validating);
        match validate(&merged, &schema) {
            ValidationResult::Valid => PipelineOutcome::Valid(merged),
            ValidationResult::Invalid(errors) => PipelineOutcome::Invalid(errors),
        }
    }
}

/// Load every input in order, stopping at the first failure.
pub fn load_all(paths: &[PathBuf]) -> Result<Vec<ConfigDocument>> {
    paths.iter().map(|path| load_logged(path)).collect()
}

fn load_logged(path: &Path) -> Result<ConfigDocument> {
    tracing::info!("Loading file: {}", path.display());
    load_document(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{FieldSpec, FieldType, SchemaDefinition, SchemaRegistry};
    use std::cell::Cell;
    use std::fs;
    use tempfile::TempDir;

    fn registry() -> SchemaRegistry {
        SchemaRegistry::default().with(
            SchemaDefinition::new("AppConfig")
                .field("timeout", FieldSpec::new(FieldType::Integer))
                .field("name", FieldSpec::new(FieldType::String).optional()),
        )
    }

    fn write(tmp: &TempDir, name: &str, content: &str) -> PathBuf {
        let path = tmp.path().join(name);
        fs::write(&path, content).expect("write");
        path
    }

    #[test]
    fn valid_run_visits_every_stage() {
        let tmp = TempDir::new().expect("tmp");
        let base = write(&tmp, "base.yaml", "timeout: 10\nname: api\n");
        let registry = registry();

        let run = Pipeline::new(vec![base], &registry, "AppConfig").run();
        assert!(run.outcome.is_valid());
        assert_eq!(
            run.stages,
            vec![
                Stage::Idle,
                Stage::Loading,
                Stage::Merging,
                Stage::ResolvingSchema,
                Stage::Validating,
                Stage::Done
            ]
        );
        assert_eq!(run.outcome.exit_code(), 0);
    }

    #[test]
    fn later_string_value_fails_numeric_field() {
        let tmp = TempDir::new().expect("tmp");
        let base = write(&tmp, "base.yaml", "timeout: 30\n");
        let over = write(&tmp, "override.json", r#"{"timeout": "30"}"#);
        let registry = registry();

        let run = Pipeline::new(vec![base, over], &registry, "AppConfig").run();
        match run.outcome {
            PipelineOutcome::Invalid(errors) => {
                assert_eq!(errors.len(), 1);
                assert_eq!(errors[0].path, "timeout");
                assert_eq!(errors[0].expected, "integer");
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[test]
    fn properties_values_are_strings() {
        let tmp = TempDir::new().expect("tmp");
        let props = write(&tmp, "app.properties", "[limits]\nretries = 3\n");
        let registry = SchemaRegistry::default().with(SchemaDefinition::new("Limits").field(
            "limits",
            FieldSpec::new(FieldType::Object).fields(crate::schema::ObjectSpec {
                fields: vec![("retries".to_string(), FieldSpec::new(FieldType::Integer))],
                strict: false,
            }),
        ));

        let run = Pipeline::new(vec![props], &registry, "Limits").run();
        let errors = match run.outcome {
            PipelineOutcome::Invalid(errors) => errors,
            other => panic!("unexpected outcome: {other:?}"),
        };
        assert_eq!(errors[0].path, "limits.retries");
    }

    #[test]
    fn unknown_schema_fails_before_validation() {
        let tmp = TempDir::new().expect("tmp");
        let base = write(&tmp, "base.yaml", "timeout: 10\n");
        let registry = registry();

        let run = Pipeline::new(vec![base], &registry, "Missing").run();
        assert!(!run.stages.contains(&Stage::Validating));
        match run.outcome {
            PipelineOutcome::Failed(StageFailure { stage, error }) => {
                assert_eq!(stage, Stage::ResolvingSchema);
                assert!(matches!(error, ConfigError::SchemaNotFound { .. }));
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    struct CountingProvider {
        inner: SchemaRegistry,
        calls: Cell<usize>,
    }

    impl SchemaProvider for CountingProvider {
        fn location(&self) -> String {
            self.inner.location()
        }

        fn schema_names(&self) -> Result<Vec<String>> {
            self.inner.schema_names()
        }

        fn resolve(&self, name: &str) -> Result<SchemaDefinition> {
            self.calls.set(self.calls.get() + 1);
            self.inner.resolve(name)
        }
    }

    #[test]
    fn first_bad_file_stops_loading() {
        let tmp = TempDir::new().expect("tmp");
        let good = write(&tmp, "a.yaml", "timeout: 1\n");
        let unsupported = tmp.path().join("b.ini");
        // Would fail with a read error if it were attempted.
        let never_read = tmp.path().join("c.yaml");
        let provider = CountingProvider { inner: registry(), calls: Cell::new(0) };

        let run = Pipeline::new(vec![good, unsupported, never_read], &provider, "AppConfig").run();
        assert_eq!(run.stages, vec![Stage::Idle, Stage::Loading, Stage::Done]);
        assert_eq!(provider.calls.get(), 0);
        match run.outcome {
            PipelineOutcome::Failed(StageFailure { stage, error }) => {
                assert_eq!(stage, Stage::Loading);
                assert!(matches!(error, ConfigError::UnsupportedFormat { .. }));
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[test]
    fn malformed_file_mid_sequence_fails_loading() {
        let tmp = TempDir::new().expect("tmp");
        let good = write(&tmp, "a.yaml", "timeout: 1\n");
        let broken = write(&tmp, "b.json", "{\"timeout\": 2, ");
        let later = write(&tmp, "c.toml", "timeout = 3\n");
        let provider = CountingProvider { inner: registry(), calls: Cell::new(0) };

        let run = Pipeline::new(vec![good, broken.clone(), later], &provider, "AppConfig").run();
        assert_eq!(run.stages, vec![Stage::Idle, Stage::Loading, Stage::Done]);
        assert_eq!(provider.calls.get(), 0);
        match run.outcome {
            PipelineOutcome::Failed(StageFailure { stage, error }) => {
                assert_eq!(stage, Stage::Loading);
                match error {
                    ConfigError::Parse { path, format, .. } => {
                        assert_eq!(path, broken);
                        assert_eq!(format, crate::format::Format::Json);
                    }
                    other => panic!("unexpected error: {other}"),
                }
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[test]
    fn closed_pipeline_rejects_extra_keys() {
        let tmp = TempDir::new().expect("tmp");
        let base = write(&tmp, "base.toml", "timeout = 5\nextra = true\n");
        let registry = registry();

        let open = Pipeline::new(vec![base.clone()], &registry, "AppConfig").run();
        assert!(open.outcome.is_valid());

        let closed = Pipeline::new(vec![base], &registry, "AppConfig").closed(true).run();
        assert_eq!(closed.outcome.exit_code(), 1);
    }

    #[test]
    fn into_result_maps_invalid_to_validation_failure() {
        let outcome = PipelineOutcome::Invalid(vec![FieldError {
            path: "timeout".to_string(),
            expected: "integer".to_string(),
            actual: "missing".to_string(),
        }]);
        match outcome.into_result() {
            Err(ConfigError::ValidationFailure(errors)) => assert_eq!(errors.len(), 1),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn load_all_preserves_argument_order() {
        let tmp = TempDir::new().expect("tmp");
        let b = write(&tmp, "b.json", r#"{"k": "b"}"#);
        let a = write(&tmp, "a.json", r#"{"k": "a"}"#);
        let docs = load_all(&[b, a]).expect("load");
        assert_eq!(docs[0]["k"], "b");
        assert_eq!(docs[1]["k"], "a");
    }
}
