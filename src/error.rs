use thiserror::Error;

/// Custom Result type for this crate.
pub type Result<T> = std::result::Result<T, PipelineError>;

/// The Error type for pipeline operations.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// A rule pattern failed to compile. Fatal: a blocklist with a silently
    /// dropped rule would let through rows it was meant to remove.
    #[error("Invalid pattern for '{field}': {pattern:?}: {source}")]
    InvalidPattern {
        field: String,
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("Required column '{column}' is missing from the input table")]
    MissingColumn { column: String },

    #[error("I/O error: {source}")]
    IoError {
        #[from]
        source: std::io::Error,
    },

    #[error("Delimited table error: {source}")]
    CsvError {
        #[from]
        source: csv::Error,
    },

    #[error("Error in processing step '{step_name}': {source}")]
    StepError {
        step_name: String,
        source: Box<PipelineError>,
    },
}
