use crate::data_model::Dataset;
use crate::error::Result;

pub trait BaseReader {
    fn read_dataset(&self) -> Result<Dataset>;
}
