// Utils

pub mod url;

pub use url::normalize_url;
