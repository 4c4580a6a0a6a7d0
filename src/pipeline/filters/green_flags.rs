use std::cmp::Reverse;
use std::collections::BTreeMap;

use regex::Regex;

use crate::data_model::{Dataset, Record, SCORE_COLUMN};
use crate::error::Result;
use crate::events::{EventSink, PipelineEvent};
use crate::executor::{ProcessingStep, StepKind, StepOutput};
use crate::pipeline::filters::column_mask;
use crate::pipeline::rules::compile_pattern;

/// Scores rows by how many positive-signal patterns they match and orders the
/// table by that score, highest first. Never removes rows.
///
/// Patterns are compiled one by one rather than merged, since every pattern
/// that matches adds its own point.
#[derive(Debug, Clone, Default)]
pub struct GreenFlagScorer {
    flags: Vec<(String, Vec<Regex>)>,
}

impl GreenFlagScorer {
    pub fn new(green_flags: &BTreeMap<String, Vec<String>>) -> Result<Self> {
        let mut flags = Vec::with_capacity(green_flags.len());
        for (column, patterns) in green_flags {
            let compiled = patterns
                .iter()
                .map(|p| compile_pattern(column, p))
                .collect::<Result<Vec<_>>>()?;
            flags.push((column.clone(), compiled));
        }
        Ok(GreenFlagScorer { flags })
    }

    /// True only when no column is configured. A column with an empty pattern
    /// list still gets a zero score.
    pub fn is_empty(&self) -> bool {
        self.flags.is_empty()
    }

    /// Writes each row's score into the `green_flags_count` column, stably
    /// sorts by descending score, and returns the total number of matches.
    ///
    /// Columns the table lacks are reported and skipped. With no flags
    /// configured the table is returned as is.
    pub fn score(&self, mut dataset: Dataset, events: &dyn EventSink) -> (Dataset, usize) {
        if self.is_empty() {
            events.emit(PipelineEvent::NoGreenFlags);
            events.emit(PipelineEvent::GreenFlagsScored { total: 0 });
            return (dataset, 0);
        }

        let mut scores = vec![0usize; dataset.len()];
        let mut total = 0;
        for (column, patterns) in &self.flags {
            let Some(index) = dataset.column_index(column) else {
                events.emit(PipelineEvent::ColumnMissing {
                    stage: self.name().to_string(),
                    column: column.clone(),
                });
                continue;
            };
            for pattern in patterns {
                let hits = column_mask(dataset.rows(), index, |text| pattern.is_match(text));
                let mut matches = 0;
                for (score, hit) in scores.iter_mut().zip(hits) {
                    if hit {
                        *score += 1;
                        matches += 1;
                    }
                }
                total += matches;
                events.emit(PipelineEvent::PatternMatched {
                    column: column.clone(),
                    pattern: pattern.as_str().to_string(),
                    matches,
                });
            }
        }

        let score_index = dataset.ensure_column(SCORE_COLUMN);
        let template = dataset.with_rows(Vec::new());
        let mut scored: Vec<(usize, Record)> = scores.into_iter().zip(dataset.into_rows()).collect();
        for (score, row) in &mut scored {
            row.set(score_index, Some(score.to_string()));
        }
        // sort_by_key is stable: equal scores keep their input order.
        scored.sort_by_key(|(score, _)| Reverse(*score));

        events.emit(PipelineEvent::GreenFlagsScored { total });
        let rows = scored.into_iter().map(|(_, row)| row).collect();
        (template.with_rows(rows), total)
    }
}

impl ProcessingStep for GreenFlagScorer {
    fn name(&self) -> &str {
        "Green flag scoring"
    }

    fn kind(&self) -> StepKind {
        StepKind::Annotation
    }

    fn process(&self, dataset: Dataset, events: &dyn EventSink) -> Result<StepOutput> {
        let (kept, _) = self.score(dataset, events);
        Ok(StepOutput::unchanged(kept))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::MemorySink;

    fn flags(entries: &[(&str, &[&str])]) -> BTreeMap<String, Vec<String>> {
        entries
            .iter()
            .map(|(col, pats)| (col.to_string(), pats.iter().map(|p| p.to_string()).collect()))
            .collect()
    }

    fn listings(rows: &[(&str, &str)]) -> Dataset {
        let mut ds = Dataset::new(["url", "title", "description"]);
        for (title, description) in rows {
            ds.push_row(vec![
                Some("https://a.uz".into()),
                Some(title.to_string()),
                Some(description.to_string()),
            ]);
        }
        ds
    }

    fn score_of(ds: &Dataset, row: &Record) -> usize {
        ds.value(row, SCORE_COLUMN).unwrap().parse().unwrap()
    }

    #[test]
    fn test_scores_and_sorts_matching_rows_first() {
        let scorer = GreenFlagScorer::new(&flags(&[("title", &[r"оптов\w*"])])).unwrap();
        let ds = listings(&[("Магазин у дома", ""), ("Оптовая компания", "")]);
        let (scored, total) = scorer.score(ds, &MemorySink::new());

        assert_eq!(total, 1);
        assert_eq!(scored.rows()[0].get(1), Some("Оптовая компания"));
        assert_eq!(score_of(&scored, &scored.rows()[0]), 1);
        assert_eq!(score_of(&scored, &scored.rows()[1]), 0);
    }

    #[test]
    fn test_each_pattern_counts_separately_across_columns() {
        let scorer = GreenFlagScorer::new(&flags(&[
            ("title", &[r"оптов\w*", r"дистрибьютор\w*"]),
            ("description", &[r"оптовые\s+цены"]),
        ]))
        .unwrap();
        let ds = listings(&[
            ("Оптовый дистрибьютор", "Оптовые цены"),
            ("Оптовый склад", ""),
            ("Кафе", ""),
        ]);
        let (scored, total) = scorer.score(ds, &MemorySink::new());

        let scores: Vec<usize> = scored.rows().iter().map(|r| score_of(&scored, r)).collect();
        assert_eq!(scores, vec![3, 1, 0]);
        assert_eq!(total, 4);
    }

    #[test]
    fn test_ties_keep_input_order() {
        let scorer = GreenFlagScorer::new(&flags(&[("title", &["опт"])])).unwrap();
        let ds = listings(&[("a", ""), ("опт b", ""), ("c", ""), ("опт d", ""), ("e", "")]);
        let (scored, _) = scorer.score(ds, &MemorySink::new());
        let ids: Vec<usize> = scored.rows().iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![1, 3, 0, 2, 4]);
    }

    #[test]
    fn test_superset_of_matches_never_scores_lower() {
        let scorer = GreenFlagScorer::new(&flags(&[("title", &["опт", "склад", "доставк"])])).unwrap();
        let ds = listings(&[("опт", ""), ("опт склад", ""), ("опт склад доставка", "")]);
        let (scored, _) = scorer.score(ds, &MemorySink::new());
        let ids: Vec<usize> = scored.rows().iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![2, 1, 0]);
    }

    #[test]
    fn test_unknown_column_is_skipped() {
        let sink = MemorySink::new();
        let scorer = GreenFlagScorer::new(&flags(&[
            ("category", &["опт"]),
            ("title", &["опт"]),
        ]))
        .unwrap();
        let (scored, total) = scorer.score(listings(&[("опт", "")]), &sink);

        assert_eq!(total, 1);
        assert_eq!(scored.len(), 1);
        assert!(sink.events().contains(&PipelineEvent::ColumnMissing {
            stage: "Green flag scoring".into(),
            column: "category".into(),
        }));
    }

    #[test]
    fn test_empty_config_is_a_no_op() {
        let sink = MemorySink::new();
        let scorer = GreenFlagScorer::new(&BTreeMap::new()).unwrap();
        let ds = listings(&[("опт", "")]);
        let (scored, total) = scorer.score(ds.clone(), &sink);

        assert_eq!(total, 0);
        assert_eq!(scored, ds);
        assert!(!scored.has_column(SCORE_COLUMN));
        assert_eq!(
            sink.events(),
            vec![
                PipelineEvent::NoGreenFlags,
                PipelineEvent::GreenFlagsScored { total: 0 }
            ]
        );
    }

    #[test]
    fn test_column_without_patterns_still_writes_zero_scores() {
        let sink = MemorySink::new();
        let no_patterns: &[&str] = &[];
        let scorer = GreenFlagScorer::new(&flags(&[("title", no_patterns)])).unwrap();
        assert!(!scorer.is_empty());
        let (scored, total) = scorer.score(listings(&[("опт", ""), ("склад", "")]), &sink);

        assert_eq!(total, 0);
        assert!(scored.has_column(SCORE_COLUMN));
        let scores: Vec<usize> = scored.rows().iter().map(|r| score_of(&scored, r)).collect();
        assert_eq!(scores, vec![0, 0]);
        assert!(!sink.events().contains(&PipelineEvent::NoGreenFlags));
    }

    #[test]
    fn test_rescoring_overwrites_previous_score() {
        let scorer = GreenFlagScorer::new(&flags(&[("title", &["опт"])])).unwrap();
        let (once, _) = scorer.score(listings(&[("опт", "")]), &MemorySink::new());
        let (twice, _) = scorer.score(once, &MemorySink::new());
        assert_eq!(twice.columns().len(), 4);
        assert_eq!(score_of(&twice, &twice.rows()[0]), 1);
    }
}
