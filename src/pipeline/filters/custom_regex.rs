use crate::data_model::Dataset;
use crate::error::Result;
use crate::events::{EventSink, PipelineEvent};
use crate::executor::{ProcessingStep, StepOutput};
use crate::pipeline::filters::column_mask;
use crate::pipeline::rules::RuleSet;

/// A one-off blocklist over any column with a single caller-supplied pattern.
///
/// Unlike the built-in stages, a missing column is not an error: the stage
/// reports it and passes the table through.
#[derive(Debug, Clone)]
pub struct CustomRegexFilter {
    name: String,
    rules: RuleSet,
}

impl CustomRegexFilter {
    /// Fails if `pattern` does not compile.
    pub fn new(column: &str, pattern: &str) -> Result<Self> {
        let rules = RuleSet::compile(column, vec![pattern.to_string()])?;
        Ok(CustomRegexFilter {
            name: format!("Custom regex filtering on '{}'", column),
            rules,
        })
    }

    pub fn column(&self) -> &str {
        self.rules.field()
    }
}

impl ProcessingStep for CustomRegexFilter {
    fn name(&self) -> &str {
        &self.name
    }

    fn process(&self, dataset: Dataset, events: &dyn EventSink) -> Result<StepOutput> {
        let Some(index) = dataset.column_index(self.column()) else {
            events.emit(PipelineEvent::ColumnMissing {
                stage: self.name.clone(),
                column: self.column().to_string(),
            });
            return Ok(StepOutput::unchanged(dataset));
        };

        let mask = column_mask(dataset.rows(), index, |text| self.rules.is_match(text));
        let (kept, removed) = dataset.partition_by_mask(&mask);
        Ok(StepOutput { kept, removed })
    }
}
