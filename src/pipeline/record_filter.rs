// src/pipeline/record_filter.rs

use std::path::Path;
use std::sync::Arc;

use crate::config::filter::FilterConfig;
use crate::data_model::{Dataset, RemovalLog, REQUIRED_COLUMNS};
use crate::error::Result;
use crate::events::{EventSink, PipelineEvent, TracingSink};
use crate::executor::{PipelineExecutor, PipelineState, ProcessingStep};
use crate::pipeline::filters::{
    BlocklistFilter, CustomRegexFilter, Deduplicator, GreenFlagScorer, UrlFilter,
};
use crate::pipeline::rules::{RuleField, RuleSet};
use crate::pipeline::writers::{BaseWriter, CsvWriter};

/// One configured filtering run: built-in rule sets with the caller's red
/// flags appended, the optional locale gate, configured custom passes, and the
/// green-flag scorer.
///
/// Every pattern is compiled in [`RecordFilter::new`], so a bad pattern stops
/// the run before any row is touched. Each instance owns its own copies of the
/// built-in lists.
pub struct RecordFilter {
    url_rules: RuleSet,
    title_rules: RuleSet,
    description_rules: RuleSet,
    locale: Option<String>,
    custom_filters: Vec<CustomRegexFilter>,
    green_flags: GreenFlagScorer,
    events: Arc<dyn EventSink>,
}

impl RecordFilter {
    pub fn new(config: &FilterConfig) -> Result<Self> {
        Self::with_sink(config, Arc::new(TracingSink))
    }

    pub fn with_sink(config: &FilterConfig, events: Arc<dyn EventSink>) -> Result<Self> {
        let rules = |field| RuleSet::with_defaults(field, &config.red_flags.for_field(field));
        let custom_filters = config
            .custom_filters
            .iter()
            .map(|c| CustomRegexFilter::new(&c.column, &c.pattern))
            .collect::<Result<Vec<_>>>()?;

        Ok(RecordFilter {
            url_rules: rules(RuleField::Url)?,
            title_rules: rules(RuleField::Title)?,
            description_rules: rules(RuleField::Description)?,
            locale: config.locale().map(str::to_string),
            custom_filters,
            green_flags: GreenFlagScorer::new(&config.green_flags)?,
            events,
        })
    }

    /// The stage list `apply_all` runs, in order: dedup, URL, title,
    /// description, then any configured custom passes.
    pub fn pipeline(&self) -> PipelineExecutor {
        let mut steps: Vec<Box<dyn ProcessingStep>> = vec![
            Box::new(Deduplicator::new()),
            Box::new(UrlFilter::new(self.url_rules.clone(), self.locale.clone())),
            Box::new(BlocklistFilter::title(self.title_rules.clone())),
            Box::new(BlocklistFilter::description(
                self.description_rules.clone(),
            )),
        ];
        for custom in &self.custom_filters {
            steps.push(Box::new(custom.clone()));
        }
        PipelineExecutor::new(steps)
    }

    /// Runs the full filtering pipeline over `dataset`.
    pub fn apply_all(&self, dataset: Dataset) -> Result<PipelineState> {
        dataset.require_columns(&REQUIRED_COLUMNS)?;
        self.events.emit(PipelineEvent::Started {
            records: dataset.len(),
        });
        self.pipeline()
            .run(PipelineState::new(dataset), self.events.as_ref())
    }

    /// One ad-hoc removal pass on `column`, continuing from `state`.
    /// A missing column leaves the state untouched.
    pub fn filter_with_custom_regex(
        &self,
        state: PipelineState,
        column: &str,
        pattern: &str,
    ) -> Result<PipelineState> {
        let steps: Vec<Box<dyn ProcessingStep>> =
            vec![Box::new(CustomRegexFilter::new(column, pattern)?)];
        PipelineExecutor::new(steps).run(state, self.events.as_ref())
    }

    /// Scores and sorts `dataset` by green flags. Returns the total match count.
    pub fn score_green_flags(&self, dataset: Dataset) -> (Dataset, usize) {
        self.green_flags.score(dataset, self.events.as_ref())
    }

    pub fn save(&self, dataset: &Dataset, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let mut writer = CsvWriter::create(path)?;
        writer.write_dataset(dataset)?;
        writer.close()?;
        self.events.emit(PipelineEvent::Saved {
            path: path.display().to_string(),
            records: dataset.len(),
        });
        Ok(())
    }

    /// Writes the removal log. Returns `false` without creating a file when
    /// nothing was removed.
    pub fn save_removed(&self, log: &RemovalLog, path: impl AsRef<Path>) -> Result<bool> {
        if log.is_empty() {
            return Ok(false);
        }
        let path = path.as_ref();
        let mut writer = CsvWriter::create(path)?;
        writer.write_removal_log(log)?;
        writer.close()?;
        self.events.emit(PipelineEvent::Saved {
            path: path.display().to_string(),
            records: log.len(),
        });
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::filter::{parse_filter_config, CustomFilterConfig};
    use crate::error::PipelineError;
    use crate::events::MemorySink;

    #[test]
    fn test_pipeline_stage_order() {
        let mut config = FilterConfig::default();
        config.custom_filters.push(CustomFilterConfig {
            column: "phone".into(),
            pattern: r"^\+7".into(),
        });
        let filter = RecordFilter::new(&config).unwrap();
        assert_eq!(
            filter.pipeline().step_names(),
            vec![
                "Duplicate removal",
                "URL filtering",
                "Title filtering",
                "Description filtering",
                "Custom regex filtering on 'phone'",
            ]
        );
    }

    #[test]
    fn test_bad_red_flag_aborts_construction() {
        let config = parse_filter_config("red_flags:\n  description: \"[а-я\"\n").unwrap();
        match RecordFilter::new(&config) {
            Err(PipelineError::InvalidPattern { field, pattern, .. }) => {
                assert_eq!(field, "description");
                assert_eq!(pattern, "[а-я");
            }
            Err(other) => panic!("Expected InvalidPattern, got {:?}", other),
            Ok(_) => panic!("Expected construction to fail"),
        }
    }

    #[test]
    fn test_apply_all_requires_core_columns() {
        let sink = Arc::new(MemorySink::new());
        let filter = RecordFilter::with_sink(&FilterConfig::default(), sink.clone()).unwrap();
        let ds = Dataset::new(["url", "title"]);
        let err = filter.apply_all(ds).unwrap_err();
        assert!(matches!(err, PipelineError::MissingColumn { column } if column == "description"));
        assert!(sink.events().is_empty());
    }

    #[test]
    fn test_save_removed_skips_empty_log() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("removed.csv");
        let filter = RecordFilter::new(&FilterConfig::default()).unwrap();
        assert!(!filter.save_removed(&RemovalLog::new(), &path).unwrap());
        assert!(!path.exists());
    }
}
