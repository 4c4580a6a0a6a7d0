// src/config.rs

pub mod cli;
pub mod filter;

pub use filter::{
    load_filter_config, parse_filter_config, CustomFilterConfig, FilterConfig, PatternList,
    RedFlags,
};
