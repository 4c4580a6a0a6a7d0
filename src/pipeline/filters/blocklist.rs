use crate::data_model::Dataset;
use crate::error::{PipelineError, Result};
use crate::events::EventSink;
use crate::executor::{ProcessingStep, StepOutput};
use crate::pipeline::filters::column_mask;
use crate::pipeline::rules::RuleSet;

/// Removes every row whose value in the rule set's column matches the set.
/// Absent values are read as empty strings. Surviving rows are left untouched.
#[derive(Debug, Clone)]
pub struct BlocklistFilter {
    name: String,
    rules: RuleSet,
}

impl BlocklistFilter {
    pub fn new(name: impl Into<String>, rules: RuleSet) -> Self {
        BlocklistFilter {
            name: name.into(),
            rules,
        }
    }

    pub fn title(rules: RuleSet) -> Self {
        Self::new("Title filtering", rules)
    }

    pub fn description(rules: RuleSet) -> Self {
        Self::new("Description filtering", rules)
    }

    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }
}

impl ProcessingStep for BlocklistFilter {
    fn name(&self) -> &str {
        &self.name
    }

    fn process(&self, dataset: Dataset, _events: &dyn EventSink) -> Result<StepOutput> {
        let index =
            dataset
                .column_index(self.rules.field())
                .ok_or_else(|| PipelineError::MissingColumn {
                    column: self.rules.field().to_string(),
                })?;

        let mask = column_mask(dataset.rows(), index, |text| self.rules.is_match(text));
        let (kept, removed) = dataset.partition_by_mask(&mask);
        Ok(StepOutput { kept, removed })
    }
}
