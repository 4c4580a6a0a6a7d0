use std::collections::HashSet;

use crate::data_model::{Dataset, URL_COLUMN};
use crate::error::Result;
use crate::events::{EventSink, PipelineEvent};
use crate::executor::{ProcessingStep, StepKind, StepOutput};

/// Drops every row whose raw `url` value was already seen, keeping the first.
/// Absent urls count as one shared value.
#[derive(Debug, Default, Clone, Copy)]
pub struct Deduplicator;

impl Deduplicator {
    pub fn new() -> Self {
        Deduplicator
    }
}

impl ProcessingStep for Deduplicator {
    fn name(&self) -> &str {
        "Duplicate removal"
    }

    fn kind(&self) -> StepKind {
        StepKind::Dedup
    }

    fn process(&self, dataset: Dataset, events: &dyn EventSink) -> Result<StepOutput> {
        let Some(index) = dataset.column_index(URL_COLUMN) else {
            events.emit(PipelineEvent::ColumnMissing {
                stage: self.name().to_string(),
                column: URL_COLUMN.to_string(),
            });
            return Ok(StepOutput::unchanged(dataset));
        };

        let mask: Vec<bool> = {
            let mut seen: HashSet<Option<&str>> = HashSet::with_capacity(dataset.len());
            dataset
                .rows()
                .iter()
                .map(|row| !seen.insert(row.get(index)))
                .collect()
        };

        let (kept, removed) = dataset.partition_by_mask(&mask);
        Ok(StepOutput { kept, removed })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::MemorySink;

    fn dataset(rows: &[(Option<&str>, &str)]) -> Dataset {
        let mut ds = Dataset::new(["url", "title", "description"]);
        for (url, title) in rows {
            ds.push_row(vec![url.map(str::to_string), Some(title.to_string()), None]);
        }
        ds
    }

    #[test]
    fn test_first_occurrence_wins() {
        let ds = dataset(&[
            (Some("https://a.uz"), "first"),
            (Some("https://b.uz"), "other"),
            (Some("https://a.uz"), "second"),
        ]);
        let out = Deduplicator::new().process(ds, &MemorySink::new()).unwrap();

        let titles: Vec<_> = out.kept.rows().iter().map(|r| r.get(1).unwrap()).collect();
        assert_eq!(titles, vec!["first", "other"]);
        assert_eq!(out.removed.len(), 1);
        assert_eq!(out.removed[0].id, 2);
    }

    #[test]
    fn test_compares_raw_values() {
        // Dedup runs before normalization, so these are distinct.
        let ds = dataset(&[
            (Some("https://www.a.uz/"), "raw"),
            (Some("https://a.uz"), "clean"),
        ]);
        let out = Deduplicator::new().process(ds, &MemorySink::new()).unwrap();
        assert_eq!(out.kept.len(), 2);
    }

    #[test]
    fn test_absent_urls_collapse_to_one() {
        let ds = dataset(&[(None, "one"), (None, "two"), (Some("x"), "three")]);
        let out = Deduplicator::new().process(ds, &MemorySink::new()).unwrap();
        let ids: Vec<usize> = out.kept.rows().iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![0, 2]);
    }

    #[test]
    fn test_remaining_urls_are_distinct_and_earliest() {
        let urls = ["c", "a", "b", "a", "c", "c", "d", "b"];
        let ds = dataset(
            &urls
                .iter()
                .map(|u| (Some(*u), "t"))
                .collect::<Vec<_>>(),
        );
        let out = Deduplicator::new().process(ds, &MemorySink::new()).unwrap();

        let kept: Vec<(usize, &str)> = out
            .kept
            .rows()
            .iter()
            .map(|r| (r.id, r.get(0).unwrap()))
            .collect();
        assert_eq!(kept, vec![(0, "c"), (1, "a"), (2, "b"), (6, "d")]);
    }

    #[test]
    fn test_missing_url_column_is_a_no_op() {
        let mut ds = Dataset::new(["title"]);
        ds.push_row(vec![Some("x".into())]);
        ds.push_row(vec![Some("x".into())]);
        let sink = MemorySink::new();
        let out = Deduplicator::new().process(ds, &sink).unwrap();
        assert_eq!(out.kept.len(), 2);
        assert!(matches!(
            sink.events()[0],
            PipelineEvent::ColumnMissing { .. }
        ));
    }
}
