use crate::data_model::{Dataset, URL_COLUMN};
use crate::error::{PipelineError, Result};
use crate::events::EventSink;
use crate::executor::{ProcessingStep, StepOutput};
use crate::pipeline::filters::column_mask;
use crate::pipeline::rules::RuleSet;
use crate::utils::normalize_url;

/// Rewrites `url` to its normalized form, then drops rows whose url is
/// unusable, matches the domain rules, or (when a locale is set) does not
/// contain the locale token.
#[derive(Debug, Clone)]
pub struct UrlFilter {
    rules: RuleSet,
    locale: Option<String>,
}

impl UrlFilter {
    pub fn new(rules: RuleSet, locale: Option<String>) -> Self {
        UrlFilter {
            rules,
            locale: locale.filter(|l| !l.is_empty()),
        }
    }

    fn should_remove(&self, url: &str) -> bool {
        if url.is_empty() || self.rules.is_match(url) {
            return true;
        }
        match &self.locale {
            Some(locale) => !url.contains(locale.as_str()),
            None => false,
        }
    }
}

impl ProcessingStep for UrlFilter {
    fn name(&self) -> &str {
        "URL filtering"
    }

    fn process(&self, mut dataset: Dataset, _events: &dyn EventSink) -> Result<StepOutput> {
        let index = dataset
            .column_index(URL_COLUMN)
            .ok_or_else(|| PipelineError::MissingColumn {
                column: URL_COLUMN.to_string(),
            })?;

        for row in dataset.rows_mut() {
            let normalized = normalize_url(row.get(index));
            row.set(index, Some(normalized));
        }

        let mask = column_mask(dataset.rows(), index, |url| self.should_remove(url));
        let (kept, removed) = dataset.partition_by_mask(&mask);
        Ok(StepOutput { kept, removed })
    }
}
