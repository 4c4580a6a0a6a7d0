// src/pipeline/filters/mod.rs

mod blocklist;
mod custom_regex;
mod dedup;
mod green_flags;
mod url_filter;

pub use blocklist::BlocklistFilter;
pub use custom_regex::CustomRegexFilter;
pub use dedup::Deduplicator;
pub use green_flags::GreenFlagScorer;
pub use url_filter::UrlFilter;

use rayon::prelude::*;

use crate::data_model::Record;

/// Evaluates `predicate` against column `index` of every row, treating absent
/// cells as empty. Rows are checked in parallel; the flags come back in row order.
pub(crate) fn column_mask<F>(rows: &[Record], index: usize, predicate: F) -> Vec<bool>
where
    F: Fn(&str) -> bool + Sync,
{
    rows.par_iter()
        .map(|row| predicate(row.get(index).unwrap_or("")))
        .collect()
}
