use crate::error::{PipelineError, Result};

pub const URL_COLUMN: &str = "url";
pub const TITLE_COLUMN: &str = "title";
pub const DESCRIPTION_COLUMN: &str = "description";
/// Column appended by the green-flag scorer.
pub const SCORE_COLUMN: &str = "green_flags_count";

/// Columns every input table must carry.
pub const REQUIRED_COLUMNS: [&str; 3] = [URL_COLUMN, TITLE_COLUMN, DESCRIPTION_COLUMN];

/// One row of the table. `values` is positionally aligned with the owning
/// [`Dataset`]'s columns; `None` marks an absent cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    /// Position of the row in the table it was loaded from. Never reassigned,
    /// so it identifies the row across stages and in the removal log.
    pub id: usize,
    pub values: Vec<Option<String>>,
}

impl Record {
    pub fn new(id: usize, values: Vec<Option<String>>) -> Self {
        Record { id, values }
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.values.get(index).and_then(|v| v.as_deref())
    }

    pub fn set(&mut self, index: usize, value: Option<String>) {
        if index >= self.values.len() {
            self.values.resize(index + 1, None);
        }
        self.values[index] = value;
    }
}

/// An ordered, in-memory table of records with named columns.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Dataset {
    columns: Vec<String>,
    rows: Vec<Record>,
    next_id: usize,
}

impl Dataset {
    pub fn new<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Dataset {
            columns: columns.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
            next_id: 0,
        }
    }

    /// Appends a row, padding or truncating it to the column count.
    pub fn push_row(&mut self, mut values: Vec<Option<String>>) -> usize {
        values.resize(self.columns.len(), None);
        let id = self.next_id;
        self.next_id += 1;
        self.rows.push(Record::new(id, values));
        id
    }

    /// Builds a table with the same columns as `self` holding `rows`.
    pub fn with_rows(&self, rows: Vec<Record>) -> Dataset {
        Dataset {
            columns: self.columns.clone(),
            rows,
            next_id: self.next_id,
        }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    pub fn require_columns(&self, names: &[&str]) -> Result<()> {
        for name in names {
            if !self.has_column(name) {
                return Err(PipelineError::MissingColumn {
                    column: name.to_string(),
                });
            }
        }
        Ok(())
    }

    /// Returns the index of `name`, adding it as an all-absent column first if needed.
    pub fn ensure_column(&mut self, name: &str) -> usize {
        if let Some(idx) = self.column_index(name) {
            return idx;
        }
        self.columns.push(name.to_string());
        let width = self.columns.len();
        for row in &mut self.rows {
            row.values.resize(width, None);
        }
        width - 1
    }

    pub fn value<'a>(&self, record: &'a Record, column: &str) -> Option<&'a str> {
        self.column_index(column).and_then(|idx| record.get(idx))
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn rows(&self) -> &[Record] {
        &self.rows
    }

    pub fn rows_mut(&mut self) -> &mut [Record] {
        &mut self.rows
    }

    pub fn into_rows(self) -> Vec<Record> {
        self.rows
    }

    /// Splits the table by `remove`, which must hold one flag per row.
    /// Both halves keep the input order.
    pub fn partition_by_mask(self, remove: &[bool]) -> (Dataset, Vec<Record>) {
        debug_assert_eq!(remove.len(), self.rows.len());
        let Dataset {
            columns,
            rows,
            next_id,
        } = self;
        let mut kept = Vec::with_capacity(rows.len());
        let mut removed = Vec::new();
        for (row, &drop_row) in rows.into_iter().zip(remove) {
            if drop_row {
                removed.push(row);
            } else {
                kept.push(row);
            }
        }
        (
            Dataset {
                columns,
                rows: kept,
                next_id,
            },
            removed,
        )
    }
}

/// A row discarded by a blocklist stage, tagged with the stage that dropped it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemovedRecord {
    pub stage: String,
    pub record: Record,
}

/// Cumulative audit table of every row removed during a run. Only grows.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RemovalLog {
    columns: Vec<String>,
    entries: Vec<RemovedRecord>,
}

impl RemovalLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `records`, laid out by `columns`, under `stage`.
    ///
    /// Columns the log has not seen yet are added at the end and earlier
    /// entries are padded with absent values, so a row keeps every field it
    /// carried at removal time.
    pub fn append(&mut self, stage: &str, columns: &[String], records: Vec<Record>) {
        if records.is_empty() {
            return;
        }
        let targets: Vec<usize> = columns
            .iter()
            .map(|col| match self.columns.iter().position(|c| c == col) {
                Some(idx) => idx,
                None => {
                    self.columns.push(col.clone());
                    self.columns.len() - 1
                }
            })
            .collect();
        let width = self.columns.len();
        for entry in &mut self.entries {
            entry.record.values.resize(width, None);
        }

        for mut record in records {
            let mut values = vec![None; width];
            for (src, &dst) in targets.iter().enumerate() {
                if let Some(value) = record.values.get_mut(src) {
                    values[dst] = value.take();
                }
            }
            record.values = values;
            self.entries.push(RemovedRecord {
                stage: stage.to_string(),
                record,
            });
        }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn entries(&self) -> &[RemovedRecord] {
        &self.entries
    }

    pub fn value<'a>(&self, entry: &'a RemovedRecord, column: &str) -> Option<&'a str> {
        self.columns
            .iter()
            .position(|c| c == column)
            .and_then(|idx| entry.record.get(idx))
    }

    pub fn contains(&self, record_id: usize) -> bool {
        self.entries.iter().any(|e| e.record.id == record_id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Dataset {
        let mut ds = Dataset::new(["url", "title"]);
        ds.push_row(vec![Some("a".into()), Some("first".into())]);
        ds.push_row(vec![Some("b".into())]);
        ds.push_row(vec![Some("c".into()), Some("third".into())]);
        ds
    }

    #[test]
    fn test_push_row_pads_missing_values() {
        let ds = sample();
        assert_eq!(ds.rows()[1].values, vec![Some("b".to_string()), None]);
        assert_eq!(ds.value(&ds.rows()[1], "title"), None);
    }

    #[test]
    fn test_partition_keeps_order_on_both_sides() {
        let ds = sample();
        let (kept, removed) = ds.partition_by_mask(&[false, true, false]);
        let kept_ids: Vec<usize> = kept.rows().iter().map(|r| r.id).collect();
        assert_eq!(kept_ids, vec![0, 2]);
        assert_eq!(removed.len(), 1);
        assert_eq!(removed[0].id, 1);
    }

    #[test]
    fn test_require_columns_reports_first_missing() {
        let ds = sample();
        match ds.require_columns(&["url", "description"]) {
            Err(PipelineError::MissingColumn { column }) => assert_eq!(column, "description"),
            other => panic!("Expected MissingColumn, got {:?}", other),
        }
    }

    #[test]
    fn test_ensure_column_extends_existing_rows() {
        let mut ds = sample();
        let idx = ds.ensure_column("score");
        assert_eq!(idx, 2);
        assert!(ds.rows().iter().all(|r| r.values.len() == 3));
        assert_eq!(ds.ensure_column("score"), 2);
    }

    #[test]
    fn test_removal_log_merges_new_columns() {
        let mut log = RemovalLog::new();
        let cols = vec!["url".to_string(), "title".to_string()];
        log.append(
            "url",
            &cols,
            vec![Record::new(0, vec![Some("a".into()), Some("t".into())])],
        );
        let wider = vec!["url".to_string(), "title".to_string(), "score".to_string()];
        log.append(
            "custom",
            &wider,
            vec![Record::new(
                4,
                vec![Some("b".into()), None, Some("2".into())],
            )],
        );

        assert_eq!(log.columns(), wider.as_slice());
        assert_eq!(log.len(), 2);
        assert_eq!(log.entries()[0].record.values.len(), 3);
        assert_eq!(log.value(&log.entries()[1], "score"), Some("2"));
        assert_eq!(log.entries()[1].stage, "custom");
        assert!(log.contains(4));
        assert!(!log.contains(1));
    }

    #[test]
    fn test_removal_log_ignores_empty_batches() {
        let mut log = RemovalLog::new();
        log.append("title", &["url".to_string()], Vec::new());
        assert!(log.is_empty());
        assert!(log.columns().is_empty());
    }
}
