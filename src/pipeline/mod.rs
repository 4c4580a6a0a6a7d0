// src/pipeline/mod.rs

pub mod filters;
pub mod readers;
pub mod record_filter;
pub mod rules;
pub mod writers;

pub use record_filter::RecordFilter;
