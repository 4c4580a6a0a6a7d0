use crate::error::{PipelineError, Result};
use crate::pipeline::filters::{CustomRegexFilter, GreenFlagScorer};
use crate::pipeline::rules::{RuleField, RuleSet};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// Either a single pattern or a list of them, as written in YAML.
#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(untagged)]
pub enum PatternList {
    One(String),
    Many(Vec<String>),
}

impl PatternList {
    pub fn to_vec(&self) -> Vec<String> {
        match self {
            PatternList::One(p) => vec![p.clone()],
            PatternList::Many(ps) => ps.clone(),
        }
    }
}

/// Extra patterns appended to the built-in blocklists.
#[derive(Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct RedFlags {
    pub url: Option<PatternList>,
    pub title: Option<PatternList>,
    pub description: Option<PatternList>,
}

impl RedFlags {
    pub fn for_field(&self, field: RuleField) -> Vec<String> {
        let entry = match field {
            RuleField::Url => &self.url,
            RuleField::Title => &self.title,
            RuleField::Description => &self.description,
        };
        entry.as_ref().map(PatternList::to_vec).unwrap_or_default()
    }
}

/// A single ad-hoc removal pass over one column.
#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct CustomFilterConfig {
    pub column: String,
    pub pattern: String,
}

/// Everything a filter run can be configured with. All fields are optional.
#[derive(Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(default)]
pub struct FilterConfig {
    pub red_flags: RedFlags,
    /// Column name -> positive-signal patterns, used only for scoring.
    pub green_flags: BTreeMap<String, Vec<String>>,
    /// Substring every surviving url must contain.
    pub locale: Option<String>,
    /// Extra blocklist passes run after the built-in stages, in order.
    pub custom_filters: Vec<CustomFilterConfig>,
}

impl FilterConfig {
    /// The locale token, with an empty string treated as unset.
    pub fn locale(&self) -> Option<&str> {
        self.locale.as_deref().filter(|l| !l.is_empty())
    }

    /// Compiles every pattern, failing on the first one that does not compile.
    pub fn validate(&self) -> Result<()> {
        for field in [RuleField::Url, RuleField::Title, RuleField::Description] {
            RuleSet::with_defaults(field, &self.red_flags.for_field(field))?;
        }
        GreenFlagScorer::new(&self.green_flags)?;
        for custom in &self.custom_filters {
            CustomRegexFilter::new(&custom.column, &custom.pattern)?;
        }
        Ok(())
    }
}

/// Loads and parses the filter configuration YAML file.
pub fn load_filter_config<P: AsRef<Path>>(config_path: P) -> Result<FilterConfig> {
    let path_ref = config_path.as_ref();
    let config_content = fs::read_to_string(path_ref).map_err(|e| {
        PipelineError::ConfigError(format!(
            "Failed to read filter config file '{}': {}",
            path_ref.display(),
            e
        ))
    })?;

    parse_filter_config(&config_content).map_err(|e| match e {
        PipelineError::ConfigError(msg) => PipelineError::ConfigError(format!(
            "Failed to parse filter config YAML from '{}': {}",
            path_ref.display(),
            msg
        )),
        other => other,
    })
}

pub fn parse_filter_config(yaml: &str) -> Result<FilterConfig> {
    // An empty document means "all defaults".
    if yaml.trim().is_empty() {
        return Ok(FilterConfig::default());
    }
    serde_yaml::from_str(yaml).map_err(|e| PipelineError::ConfigError(e.to_string()))
}
