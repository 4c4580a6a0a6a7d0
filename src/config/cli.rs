use std::path::PathBuf;

use clap::Parser;

use crate::config::filter::CustomFilterConfig;

// Define command-line arguments
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// `|`-delimited input table with at least url, title and description columns
    #[arg(short, long)]
    pub input: PathBuf,

    /// Where to write the surviving rows
    #[arg(short, long, default_value = "filtered_output.csv")]
    pub output: PathBuf,

    /// Where to write every removed row (skipped when nothing was removed)
    #[arg(short, long)]
    pub removed: Option<PathBuf>,

    /// Path to the filter configuration YAML file.
    #[arg(short = 'c', long)]
    pub config: Option<PathBuf>,

    /// Keep only urls containing this token (overrides the config file)
    #[arg(short, long)]
    pub locale: Option<String>,

    /// Extra removal pass as COLUMN=PATTERN; may be repeated
    #[arg(long = "custom", value_parser = parse_custom_filter)]
    pub custom: Vec<CustomFilterConfig>,

    /// Score surviving rows by green flags and sort by score
    #[arg(long)]
    pub score: bool,

    /// Validate the filter configuration and exit
    #[arg(long)]
    pub validate_config: bool,

    /// Emit logs as JSON lines
    #[arg(long)]
    pub json_logs: bool,
}

pub fn parse_custom_filter(raw: &str) -> std::result::Result<CustomFilterConfig, String> {
    match raw.split_once('=') {
        Some((column, pattern)) if !column.is_empty() && !pattern.is_empty() => {
            Ok(CustomFilterConfig {
                column: column.to_string(),
                pattern: pattern.to_string(),
            })
        }
        _ => Err(format!("expected COLUMN=PATTERN, got '{}'", raw)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_custom_filter_splits_on_first_equals() {
        let parsed = parse_custom_filter("phone=^\\+7(?:=)?").unwrap();
        assert_eq!(parsed.column, "phone");
        assert_eq!(parsed.pattern, "^\\+7(?:=)?");
        assert!(parse_custom_filter("phone").is_err());
        assert!(parse_custom_filter("=x").is_err());
    }

    #[test]
    fn test_args_parse() {
        let args = Args::try_parse_from([
            "listing-filter",
            "--input",
            "in.csv",
            "--custom",
            "phone=^\\+7",
            "--custom",
            "title=вакансии",
            "--score",
        ])
        .unwrap();
        assert_eq!(args.custom.len(), 2);
        assert!(args.score);
        assert_eq!(args.output, PathBuf::from("filtered_output.csv"));
    }
}
