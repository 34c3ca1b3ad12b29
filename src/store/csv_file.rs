use crate::core::cache::TableCache;
use crate::core::table::CombinedTable;
use anyhow::{Context, Result, anyhow};
use chrono::NaiveDate;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

const DATE_COLUMN: &str = "date";
const DATE_FORMAT: &str = "%Y-%m-%d";

/// Stores a [`CombinedTable`] as a CSV file.
///
/// The first column holds the date and the header names the series. Missing
/// cells are written as empty fields.
pub struct CsvFileCache {
    path: PathBuf,
}

impl CsvFileCache {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn parse_cell(field: &str, date: NaiveDate) -> Result<Option<f64>> {
    let field = field.trim();
    if field.is_empty() {
        return Ok(None);
    }
    field
        .parse::<f64>()
        .map(Some)
        .with_context(|| format!("Invalid value '{field}' on {date}"))
}

impl TableCache for CsvFileCache {
    fn exists(&self) -> bool {
        self.path.is_file()
    }

    fn load(&self) -> Result<CombinedTable> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .from_path(&self.path)
            .with_context(|| format!("Failed to open cache file: {}", self.path.display()))?;

        // The first header field is the date label, which may be blank
        let headers = reader
            .headers()
            .with_context(|| format!("Failed to read cache header: {}", self.path.display()))?
            .clone();
        let columns: Vec<String> = headers.iter().skip(1).map(str::to_string).collect();

        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record
                .with_context(|| format!("Malformed cache file: {}", self.path.display()))?;
            let raw_date = record
                .get(0)
                .ok_or_else(|| anyhow!("Empty row in cache file: {}", self.path.display()))?;
            let date = NaiveDate::parse_from_str(raw_date.trim(), DATE_FORMAT)
                .with_context(|| format!("Invalid date '{raw_date}' in cache file"))?;
            let cells = record
                .iter()
                .skip(1)
                .map(|field| parse_cell(field, date))
                .collect::<Result<Vec<_>>>()?;
            rows.push((date, cells));
        }

        let table = CombinedTable::from_rows(columns, rows)
            .with_context(|| format!("Inconsistent cache file: {}", self.path.display()))?;
        debug!(
            path = %self.path.display(),
            rows = table.row_count(),
            columns = table.columns().len(),
            "Loaded cached table"
        );
        Ok(table)
    }

    fn save(&self, table: &CombinedTable) -> Result<()> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }

        let mut writer = csv::Writer::from_path(&self.path)
            .with_context(|| format!("Failed to create cache file: {}", self.path.display()))?;

        let mut header = vec![DATE_COLUMN.to_string()];
        header.extend(table.columns().iter().cloned());
        writer.write_record(&header)?;

        for (date, cells) in table.rows() {
            let mut record = Vec::with_capacity(cells.len() + 1);
            record.push(date.format(DATE_FORMAT).to_string());
            record.extend(
                cells
                    .iter()
                    .map(|cell| cell.map_or_else(String::new, |v| v.to_string())),
            );
            writer.write_record(&record)?;
        }
        writer
            .flush()
            .with_context(|| format!("Failed to write cache file: {}", self.path.display()))?;

        debug!(path = %self.path.display(), rows = table.row_count(), "Saved table to cache");
        Ok(())
    }
}
