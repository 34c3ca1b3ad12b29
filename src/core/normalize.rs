//! Conversion of raw provider observations into an [`ObservationTable`]

use super::series::RawObservation;
use super::table::ObservationTable;
use chrono::NaiveDate;
use tracing::debug;

/// Parses an observation value. Anything that isn't a finite number is missing.
fn parse_value(value: &str) -> Option<f64> {
    value
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
}

/// Builds the first-of-month date for a year and a provider period code.
///
/// The leading period-type character is dropped ("M01" -> month 1). Periods
/// that don't name a calendar month, like the annual average "M13", yield
/// `None`.
fn parse_date(year: &str, period: &str) -> Option<NaiveDate> {
    let year: i32 = year.trim().parse().ok()?;
    let mut chars = period.trim().chars();
    chars.next()?;
    let month: u32 = chars.as_str().parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, 1)
}

/// Normalizes raw observations into a date-ordered single-column table.
///
/// Rows whose date can't be built are excluded. When two rows land on the
/// same month, the first one wins.
pub fn normalize(observations: &[RawObservation]) -> ObservationTable {
    let mut table = ObservationTable::new();
    let mut excluded = 0usize;
    let mut duplicates = 0usize;

    for observation in observations {
        let Some(date) = parse_date(&observation.year, &observation.period) else {
            excluded += 1;
            continue;
        };
        if !table.insert(date, parse_value(&observation.value)) {
            duplicates += 1;
        }
    }

    if excluded > 0 || duplicates > 0 {
        debug!(
            excluded,
            duplicates,
            kept = table.len(),
            "Dropped observations without a unique calendar month"
        );
    }
    table
}
