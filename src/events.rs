// src/events.rs
//
// Stages report what they did through an `EventSink` handed to them by the
// caller instead of writing to a global logger.

use std::sync::Mutex;

use tracing::{debug, info, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PipelineEvent {
    Started {
        records: usize,
    },
    StageCompleted {
        stage: String,
        removed: usize,
        remaining: usize,
    },
    /// A stage was asked to look at a column the table does not have.
    ColumnMissing {
        stage: String,
        column: String,
    },
    NoGreenFlags,
    PatternMatched {
        column: String,
        pattern: String,
        matches: usize,
    },
    GreenFlagsScored {
        total: usize,
    },
    Saved {
        path: String,
        records: usize,
    },
}

pub trait EventSink: Send + Sync {
    fn emit(&self, event: PipelineEvent);
}

/// Forwards events to `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl EventSink for TracingSink {
    fn emit(&self, event: PipelineEvent) {
        match event {
            PipelineEvent::Started { records } => {
                info!(records, "Starting filtering with {} records", records)
            }
            PipelineEvent::StageCompleted {
                stage,
                removed,
                remaining,
            } => info!(
                stage = %stage,
                removed,
                remaining,
                "{}: removed {} records", stage, removed
            ),
            PipelineEvent::ColumnMissing { stage, column } => {
                warn!(stage = %stage, column = %column, "Column '{}' not found.", column)
            }
            PipelineEvent::NoGreenFlags => warn!("No green flags defined."),
            PipelineEvent::PatternMatched {
                column,
                pattern,
                matches,
            } => debug!(
                column = %column,
                pattern = %pattern,
                matches,
                "Pattern '{}' found {} matches in column '{}'", pattern, matches, column
            ),
            PipelineEvent::GreenFlagsScored { total } => {
                info!(total, "Total green flags found: {}", total)
            }
            PipelineEvent::Saved { path, records } => {
                info!(path = %path, records, "Saved {} records to {}", records, path)
            }
        }
    }
}

/// Keeps every event in memory. Used by tests to assert on what a run reported.
#[derive(Debug, Default)]
pub struct MemorySink {
    events: Mutex<Vec<PipelineEvent>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<PipelineEvent> {
        match self.events.lock() {
            Ok(events) => events.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Rows removed by the stage named `stage`, if it reported.
    pub fn removed_by(&self, stage: &str) -> Option<usize> {
        self.events().into_iter().find_map(|e| match e {
            PipelineEvent::StageCompleted {
                stage: s, removed, ..
            } if s == stage => Some(removed),
            _ => None,
        })
    }
}

impl EventSink for MemorySink {
    fn emit(&self, event: PipelineEvent) {
        match self.events.lock() {
            Ok(mut events) => events.push(event),
            Err(poisoned) => poisoned.into_inner().push(event),
        }
    }
}
