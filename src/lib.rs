// Declare the modules that form the library's public API
pub mod config;
pub mod data_model;
pub mod error;
pub mod events;
pub mod executor;
pub mod pipeline;
pub mod utils;

pub use data_model::{Dataset, Record, RemovalLog};
pub use error::{PipelineError, Result};
pub use pipeline::RecordFilter;
