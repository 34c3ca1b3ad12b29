//! Date-indexed tables produced by normalization and combination

use chrono::NaiveDate;
use std::collections::BTreeMap;

/// A single date-indexed numeric series. `None` marks an unparseable value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ObservationTable {
    rows: BTreeMap<NaiveDate, Option<f64>>,
}

impl ObservationTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a row unless the date is already present. Returns whether the
    /// row was inserted.
    pub fn insert(&mut self, date: NaiveDate, value: Option<f64>) -> bool {
        if self.rows.contains_key(&date) {
            return false;
        }
        self.rows.insert(date, value);
        true
    }

    pub fn get(&self, date: &NaiveDate) -> Option<Option<f64>> {
        self.rows.get(date).copied()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn dates(&self) -> impl Iterator<Item = &NaiveDate> {
        self.rows.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&NaiveDate, &Option<f64>)> {
        self.rows.iter()
    }
}

impl FromIterator<(NaiveDate, Option<f64>)> for ObservationTable {
    fn from_iter<I: IntoIterator<Item = (NaiveDate, Option<f64>)>>(iter: I) -> Self {
        let mut table = Self::new();
        for (date, value) in iter {
            table.insert(date, value);
        }
        table
    }
}

/// A wide table: one column per series, rows keyed by date in ascending order.
///
/// Every row holds exactly one cell per column. A table with no columns and no
/// rows is valid and is how "no data" is represented.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CombinedTable {
    columns: Vec<String>,
    rows: BTreeMap<NaiveDate, Vec<Option<f64>>>,
}

impl CombinedTable {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Outer-joins named series on date. Column order follows the input order.
    pub fn combine<'a, I>(series: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a ObservationTable)>,
    {
        let series: Vec<_> = series.into_iter().collect();
        let columns: Vec<String> = series.iter().map(|(name, _)| name.to_string()).collect();

        let mut rows: BTreeMap<NaiveDate, Vec<Option<f64>>> = BTreeMap::new();
        for (index, (_, table)) in series.iter().enumerate() {
            for (date, value) in table.iter() {
                rows.entry(*date).or_insert_with(|| vec![None; columns.len()])[index] = *value;
            }
        }

        Self { columns, rows }
    }

    /// Builds a table from already-shaped rows, as read back from the cache.
    pub fn from_rows(
        columns: Vec<String>,
        rows: impl IntoIterator<Item = (NaiveDate, Vec<Option<f64>>)>,
    ) -> anyhow::Result<Self> {
        let mut table = Self {
            columns,
            rows: BTreeMap::new(),
        };
        for (date, cells) in rows {
            if cells.len() != table.columns.len() {
                anyhow::bail!(
                    "Row {} has {} cells, expected {}",
                    date,
                    cells.len(),
                    table.columns.len()
                );
            }
            if table.rows.insert(date, cells).is_some() {
                anyhow::bail!("Duplicate row for date {}", date);
            }
        }
        Ok(table)
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn rows(&self) -> impl Iterator<Item = (&NaiveDate, &[Option<f64>])> {
        self.rows.iter().map(|(date, cells)| (date, cells.as_slice()))
    }

    pub fn value(&self, date: &NaiveDate, column: &str) -> Option<f64> {
        let index = self.columns.iter().position(|c| c == column)?;
        self.rows.get(date).and_then(|cells| cells[index])
    }

    /// All `(date, value)` pairs of one column, skipping missing cells.
    pub fn column_values(&self, column: &str) -> Vec<(NaiveDate, f64)> {
        let Some(index) = self.columns.iter().position(|c| c == column) else {
            return Vec::new();
        };
        self.rows
            .iter()
            .filter_map(|(date, cells)| cells[index].map(|v| (*date, v)))
            .collect()
    }
}
