pub mod base_writer;
pub mod csv_writer;

pub use base_writer::BaseWriter;
pub use csv_writer::CsvWriter;
