pub mod cli;
pub mod core;
pub mod providers;
pub mod store;

use crate::core::config::{AppConfig, CacheMode};
use crate::core::{LoadedTable, TableRequest};
use anyhow::Result;
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppCommand {
    /// Render the dashboard using the configured cache mode.
    Show { raw: bool },
    /// Refetch every series and overwrite the cache.
    Refresh,
}

fn load_config(config_path: Option<&str>) -> Result<AppConfig> {
    let config = match config_path {
        Some(path) => AppConfig::load_from_path(path)?,
        None => AppConfig::load()?,
    };
    debug!("Loaded config: {config:#?}");
    Ok(config)
}

/// Builds the combined table for a loaded configuration.
///
/// Only configuration problems (bad cache path, HTTP client setup) are errors;
/// fetch failures produce a partial or empty table.
pub async fn load_table(config: &AppConfig, cache_mode: CacheMode) -> Result<LoadedTable> {
    let (start_year, end_year) = config.year_range();
    let request = TableRequest {
        series: config.series.clone(),
        start_year,
        end_year,
        cache_mode,
    };

    let fetcher = providers::BlsProvider::new(config.providers.bls_base_url())?;
    let cache = store::CsvFileCache::new(config.cache_path()?);
    debug!(path = %cache.path().display(), ?cache_mode, "Using cache file");

    let pb = cli::ui::new_progress_bar(request.series.len() as u64);
    let loaded =
        crate::core::build_combined_table(&request, &fetcher, &cache, &|| pb.inc(1)).await;
    pb.finish_and_clear();
    Ok(loaded)
}

pub async fn run_command(command: AppCommand, config_path: Option<&str>) -> Result<()> {
    info!("Labor statistics dashboard starting...");
    let config = load_config(config_path)?;

    match command {
        AppCommand::Show { raw } => {
            let loaded = load_table(&config, config.cache_mode).await?;
            println!("{}", cli::dashboard::render(&loaded, &config.series, raw));
        }
        AppCommand::Refresh => {
            let loaded = load_table(&config, CacheMode::AlwaysRefresh).await?;
            println!(
                "Refreshed {} of {} series ({} months) into {}",
                loaded.table.columns().len(),
                config.series.len(),
                loaded.table.row_count(),
                config.cache_path()?.display()
            );
            if !loaded.failed.is_empty() {
                println!(
                    "{}",
                    cli::ui::style_text(
                        &format!("Unavailable: {}", loaded.failed.join(", ")),
                        cli::ui::StyleType::Error
                    )
                );
            }
        }
    }
    Ok(())
}
