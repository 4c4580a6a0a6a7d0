use anyhow::{Context, Result};
use clap::Parser;
use listing_filter::config::cli::Args;
use listing_filter::config::{load_filter_config, FilterConfig};
use listing_filter::pipeline::readers::{BaseReader, CsvReader};
use listing_filter::RecordFilter;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize tracing subscriber
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")); // Default to info if RUST_LOG is not set
    if args.json_logs {
        fmt::Subscriber::builder()
            .with_env_filter(filter)
            .json()
            .init();
    } else {
        fmt::Subscriber::builder().with_env_filter(filter).init();
    }

    let mut config = match &args.config {
        Some(path) => load_filter_config(path)?,
        None => FilterConfig::default(),
    };
    if let Some(locale) = &args.locale {
        config.locale = Some(locale.clone());
    }

    if args.validate_config {
        config
            .validate()
            .context("Filter configuration is invalid")?;
        info!("Filter configuration is valid.");
        return Ok(());
    }

    let record_filter = RecordFilter::new(&config).context("Failed to build filter")?;

    let dataset = CsvReader::new(&args.input)
        .read_dataset()
        .with_context(|| format!("Failed to read {}", args.input.display()))?;

    let mut state = record_filter.apply_all(dataset)?;
    for custom in &args.custom {
        state = record_filter.filter_with_custom_regex(state, &custom.column, &custom.pattern)?;
    }
    if args.score {
        let (scored, _) = record_filter.score_green_flags(state.dataset);
        state.dataset = scored;
    }

    record_filter
        .save(&state.dataset, &args.output)
        .with_context(|| format!("Failed to write {}", args.output.display()))?;
    if let Some(path) = &args.removed {
        record_filter
            .save_removed(&state.removed, path)
            .with_context(|| format!("Failed to write {}", path.display()))?;
    }

    info!(
        kept = state.dataset.len(),
        removed = state.removed.len(),
        "Filtering complete."
    );
    Ok(())
}
