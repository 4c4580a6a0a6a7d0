use crate::data_model::{Dataset, Record, RemovalLog};
use crate::error::{PipelineError, Result};
use crate::events::{EventSink, PipelineEvent};
use tracing::{debug, warn};

/// How the executor books a step's removals.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepKind {
    /// Removed rows are counted and written to the removal log.
    Blocklist,
    /// Removed rows are counted only (duplicates are not audited).
    Dedup,
    /// Never removes rows; reports on its own.
    Annotation,
}

/// What a step hands back: the surviving table and the rows it dropped,
/// in input order.
#[derive(Debug)]
pub struct StepOutput {
    pub kept: Dataset,
    pub removed: Vec<Record>,
}

impl StepOutput {
    pub fn unchanged(dataset: Dataset) -> Self {
        StepOutput {
            kept: dataset,
            removed: Vec::new(),
        }
    }
}

pub trait ProcessingStep: Send + Sync {
    fn name(&self) -> &str; // For logging/error reporting

    fn kind(&self) -> StepKind {
        StepKind::Blocklist
    }

    /// Consumes the current table and returns what survives. A step only ever
    /// sees the previous step's survivors.
    fn process(&self, dataset: Dataset, events: &dyn EventSink) -> Result<StepOutput>;
}

/// The working table plus everything removed from it so far.
#[derive(Debug, Clone, Default)]
pub struct PipelineState {
    pub dataset: Dataset,
    pub removed: RemovalLog,
}

impl PipelineState {
    pub fn new(dataset: Dataset) -> Self {
        PipelineState {
            dataset,
            removed: RemovalLog::new(),
        }
    }
}

pub struct PipelineExecutor {
    steps: Vec<Box<dyn ProcessingStep>>, // Holds the ordered steps
}

impl PipelineExecutor {
    pub fn new(steps: Vec<Box<dyn ProcessingStep>>) -> Self {
        if steps.is_empty() {
            warn!("Pipeline created with no steps.");
        }
        PipelineExecutor { steps }
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn step_names(&self) -> Vec<&str> {
        self.steps.iter().map(|s| s.name()).collect()
    }

    /// Runs every step in order, threading the table from one to the next and
    /// booking removals into the state's log.
    pub fn run(&self, state: PipelineState, events: &dyn EventSink) -> Result<PipelineState> {
        let PipelineState {
            mut dataset,
            mut removed,
        } = state;

        for step in &self.steps {
            debug!("Running step: {}", step.name());
            let output = step
                .process(dataset, events)
                .map_err(|e| PipelineError::StepError {
                    step_name: step.name().to_string(),
                    source: Box::new(e),
                })?;

            let removed_count = output.removed.len();
            match step.kind() {
                StepKind::Blocklist => {
                    removed.append(step.name(), output.kept.columns(), output.removed);
                }
                StepKind::Dedup => {}
                StepKind::Annotation => {
                    debug_assert!(output.removed.is_empty());
                }
            }
            if step.kind() != StepKind::Annotation {
                events.emit(PipelineEvent::StageCompleted {
                    stage: step.name().to_string(),
                    removed: removed_count,
                    remaining: output.kept.len(),
                });
            }
            dataset = output.kept;
        }

        Ok(PipelineState { dataset, removed })
    }
}
