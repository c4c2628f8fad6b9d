use std::fmt;
use std::sync::Arc;

use ergraph_core::{Dialect, Error, Model, Result, SchemaEntry};

use crate::context::Context;
use crate::notifier::{NoopNotifier, Notifier, ProgressEvent};
use crate::options::ReverseEngineeringOptions;
use crate::relations::build_relations;
use crate::source::MetadataSource;
use crate::tables::{IndexOutcome, TableOutcome, reverse_engineer_table};

/// Step of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Scopes,
    Tables,
    Relations,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Stage::Scopes => "scopes",
            Stage::Tables => "tables",
            Stage::Relations => "relations",
        };
        f.write_str(label)
    }
}

/// Lifecycle of a [`ReverseEngineer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    Idle,
    Running(Stage),
    Done,
    /// The run stopped at the given stage; the model keeps what was built.
    Failed(Stage),
}

/// Counters of a finished run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub scopes: usize,
    pub tables_loaded: usize,
    pub tables_skipped: usize,
    pub relations: usize,
    /// Tables loaded without their secondary indexes.
    pub indexes_skipped: Vec<String>,
}

/// Drives a reverse engineering run: every scope's tables first, then one
/// relation pass over the whole model.
pub struct ReverseEngineer {
    dialect: Arc<dyn Dialect>,
    source: Arc<dyn MetadataSource>,
    notifier: Arc<dyn Notifier>,
    phase: Phase,
}

impl ReverseEngineer {
    pub fn new(dialect: Arc<dyn Dialect>, source: Arc<dyn MetadataSource>) -> Self {
        Self {
            dialect,
            source,
            notifier: Arc::new(NoopNotifier),
            phase: Phase::Idle,
        }
    }

    pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = notifier;
        self
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn dialect(&self) -> &Arc<dyn Dialect> {
        &self.dialect
    }

    /// Build a fresh model for this engine's dialect.
    pub async fn create_model(&mut self, options: &ReverseEngineeringOptions) -> Result<Model> {
        let mut model = Model::new(self.dialect.clone());
        self.reverse_engineer_into(&mut model, options).await?;
        Ok(model)
    }

    /// Populate a caller-owned model. On error the model keeps every entity
    /// added before the failure.
    ///
    /// The model must use the engine's dialect.
    pub async fn reverse_engineer_into(
        &mut self,
        model: &mut Model,
        options: &ReverseEngineeringOptions,
    ) -> Result<RunSummary> {
        tracing::info!(
            event = "run_started",
            dialect = %model.dialect().name(),
            engine = self.source.engine(),
            schemas = options.schema_entries.len()
        );

        self.phase = Phase::Running(Stage::Scopes);
        match self.run(model, options).await {
            Ok(summary) => {
                self.phase = Phase::Done;
                tracing::info!(
                    event = "run_finished",
                    scopes = summary.scopes,
                    tables = summary.tables_loaded,
                    skipped = summary.tables_skipped,
                    relations = summary.relations,
                    indexes_skipped = summary.indexes_skipped.len()
                );
                Ok(summary)
            }
            Err(err) => {
                let stage = match self.phase {
                    Phase::Running(stage) => stage,
                    _ => Stage::Scopes,
                };
                self.phase = Phase::Failed(stage);
                tracing::error!(event = "run_failed", stage = %stage, error = %err);
                Err(err)
            }
        }
    }

    async fn run(
        &mut self,
        model: &mut Model,
        options: &ReverseEngineeringOptions,
    ) -> Result<RunSummary> {
        let source = self.source.clone();
        let notifier = self.notifier.clone();
        let ctx = Context::new(source.as_ref(), notifier.as_ref());
        if model.dialect().name() != self.dialect.name() {
            return Err(Error::DialectMismatch {
                expected: self.dialect.name().to_string(),
                found: model.dialect().name().to_string(),
            });
        }
        let dialect = self.dialect.clone();

        let scopes: Vec<Option<SchemaEntry>> = if !dialect.supports_schema_information() {
            vec![None]
        } else if options.schema_entries.is_empty() {
            source.schemas().await?.into_iter().map(Some).collect()
        } else {
            options.schema_entries.iter().cloned().map(Some).collect()
        };

        let mut summary = RunSummary {
            scopes: scopes.len(),
            ..RunSummary::default()
        };

        self.phase = Phase::Running(Stage::Tables);
        let table_types = dialect.table_types();
        for scope in &scopes {
            let label = scope.as_ref().map(ToString::to_string).unwrap_or_default();
            notifier.notify(ProgressEvent::EngineeringSchema, &label);
            tracing::info!(event = "scope_started", scope = %label);

            let listed = source.tables(scope.as_ref(), None, &table_types).await?;
            for raw in listed {
                if !dialect.is_valid_table(&raw.name, &raw.table_type) {
                    summary.tables_skipped += 1;
                    continue;
                }

                match reverse_engineer_table(&ctx, model, scope.as_ref(), &raw.name).await? {
                    TableOutcome::AlreadyPresent | TableOutcome::Missing => {
                        summary.tables_skipped += 1;
                    }
                    TableOutcome::Loaded { indexes, .. } => {
                        summary.tables_loaded += 1;
                        if let IndexOutcome::Skipped(_) = indexes {
                            summary.indexes_skipped.push(dialect.cast(&raw.name));
                        }
                    }
                }
            }
        }

        self.phase = Phase::Running(Stage::Relations);
        summary.relations = build_relations(&ctx, model).await?;
        notifier.notify(ProgressEvent::EngineeringFinished, "");

        Ok(summary)
    }
}

impl fmt::Debug for ReverseEngineer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReverseEngineer")
            .field("dialect", &self.dialect.name())
            .field("engine", &self.source.engine())
            .field("phase", &self.phase)
            .finish()
    }
}
