// src/pipeline/readers/csv_reader.rs

use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use crate::data_model::Dataset;
use crate::error::Result;
use crate::pipeline::readers::BaseReader;

/// Field separator used by scraped tables on both input and output.
pub const FIELD_DELIMITER: u8 = b'|';

const BOM: char = '\u{FEFF}';

/// Reads a `|`-delimited table with a header row. Empty cells become absent
/// values; rows with the wrong number of fields are an error.
#[derive(Debug, Clone)]
pub struct CsvReader {
    path: PathBuf,
}

impl CsvReader {
    pub fn new(path: impl AsRef<Path>) -> Self {
        CsvReader {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Dataset> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .delimiter(FIELD_DELIMITER)
            .has_headers(true)
            .from_reader(reader);

        let columns: Vec<String> = csv_reader
            .headers()?
            .iter()
            .enumerate()
            .map(|(i, name)| {
                if i == 0 {
                    name.trim_start_matches(BOM).to_string()
                } else {
                    name.to_string()
                }
            })
            .collect();

        let mut dataset = Dataset::new(columns);
        for record in csv_reader.records() {
            let record = record?;
            let values = record
                .iter()
                .map(|field| {
                    if field.is_empty() {
                        None
                    } else {
                        Some(field.to_string())
                    }
                })
                .collect();
            dataset.push_row(values);
        }
        Ok(dataset)
    }
}

impl BaseReader for CsvReader {
    fn read_dataset(&self) -> Result<Dataset> {
        let file = File::open(&self.path)?;
        Self::from_reader(file)
    }
}
