use crate::data_model::{Dataset, RemovalLog};
use crate::error::Result;

/// Trait for persisting tables to an output sink (e.g. file).
pub trait BaseWriter {
    fn write_dataset(&mut self, dataset: &Dataset) -> Result<()>;

    /// Writes the removal log with a trailing column naming the removing stage.
    fn write_removal_log(&mut self, log: &RemovalLog) -> Result<()>;

    /// Finalize and close the output writer.
    fn close(self) -> Result<()>;
}
