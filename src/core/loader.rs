//! Fetch, normalize, combine and cache the configured series

use super::cache::TableCache;
use super::config::{CacheMode, SeriesDescriptor};
use super::normalize::normalize;
use super::series::SeriesFetcher;
use super::table::{CombinedTable, ObservationTable};
use tracing::{debug, info, warn};

/// Everything needed to build a combined table.
#[derive(Debug, Clone)]
pub struct TableRequest {
    pub series: Vec<SeriesDescriptor>,
    pub start_year: i32,
    pub end_year: i32,
    pub cache_mode: CacheMode,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableOrigin {
    /// Read back from the cache; nothing was fetched.
    Cache,
    Fetched,
}

/// A combined table and how it was obtained. The table may be empty.
#[derive(Debug, Clone)]
pub struct LoadedTable {
    pub table: CombinedTable,
    pub origin: TableOrigin,
    /// Series that returned no observations and were left out.
    pub failed: Vec<String>,
}

/// Fetches every series in order and outer-joins the results on date.
async fn fetch_all(
    request: &TableRequest,
    fetcher: &dyn SeriesFetcher,
    on_progress: &(dyn Fn() + Sync),
) -> (CombinedTable, Vec<String>) {
    let mut fetched: Vec<(&str, ObservationTable)> = Vec::new();
    let mut failed = Vec::new();

    for descriptor in &request.series {
        let observations = fetcher
            .fetch(&descriptor.id, request.start_year, request.end_year)
            .await;
        on_progress();

        if observations.is_empty() {
            warn!(
                series = %descriptor.name,
                id = %descriptor.id,
                "No observations returned, skipping series"
            );
            failed.push(descriptor.name.clone());
            continue;
        }

        let table = normalize(&observations);
        debug!(series = %descriptor.name, rows = table.len(), "Normalized series");
        fetched.push((descriptor.name.as_str(), table));
    }

    let table = CombinedTable::combine(fetched.iter().map(|(name, table)| (*name, table)));
    (table, failed)
}

/// Builds the combined table according to the request's cache mode.
///
/// With [`CacheMode::PreferCache`] a readable cache is returned untouched and
/// nothing is fetched; an unreadable one is replaced by a fresh fetch. The cache
/// is only written when at least one series was fetched.
///
/// With [`CacheMode::AlwaysRefresh`] the cache is ignored and always
/// overwritten, even with an empty table.
///
/// Never fails: cache write errors are logged and the fetched table is still
/// returned.
pub async fn build_combined_table(
    request: &TableRequest,
    fetcher: &dyn SeriesFetcher,
    cache: &dyn TableCache,
    on_progress: &(dyn Fn() + Sync),
) -> LoadedTable {
    if request.cache_mode == CacheMode::PreferCache && cache.exists() {
        match cache.load() {
            Ok(table) => {
                info!("Loading data from cache");
                return LoadedTable {
                    table,
                    origin: TableOrigin::Cache,
                    failed: Vec::new(),
                };
            }
            Err(e) => warn!(error = %format!("{e:#}"), "Ignoring unreadable cache"),
        }
    }

    info!(
        series = request.series.len(),
        start_year = request.start_year,
        end_year = request.end_year,
        "Fetching data from BLS API"
    );
    let (table, failed) = fetch_all(request, fetcher, on_progress).await;

    let should_save = match request.cache_mode {
        CacheMode::PreferCache => !table.columns().is_empty(),
        CacheMode::AlwaysRefresh => true,
    };
    if should_save {
        match cache.save(&table) {
            Ok(()) => info!(rows = table.row_count(), "Saved data to cache"),
            Err(e) => warn!(error = %format!("{e:#}"), "Failed to save cache"),
        }
    } else {
        warn!("Failed to fetch any series, cache left untouched");
    }

    LoadedTable {
        table,
        origin: TableOrigin::Fetched,
        failed,
    }
}
