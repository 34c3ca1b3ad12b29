use super::ui;
use crate::core::config::{ChartColor, SeriesDescriptor};
use crate::core::{CombinedTable, LoadedTable, TableOrigin};
use chrono::NaiveDate;
use comfy_table::Cell;

const NO_DATA: &str = "No data available to display.";

/// Colours used for series that don't configure one, in column order.
const DEFAULT_COLORS: [ChartColor; 4] = [
    ChartColor::Blue,
    ChartColor::Green,
    ChartColor::Magenta,
    ChartColor::Yellow,
];

struct ChartSummary {
    first: (NaiveDate, f64),
    last: (NaiveDate, f64),
    min: f64,
    max: f64,
    points: Vec<f64>,
}

fn summarize(values: &[(NaiveDate, f64)]) -> Option<ChartSummary> {
    let first = *values.first()?;
    let last = *values.last()?;
    let points: Vec<f64> = values.iter().map(|(_, v)| *v).collect();
    let min = points.iter().copied().fold(f64::INFINITY, f64::min);
    let max = points.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    Some(ChartSummary {
        first,
        last,
        min,
        max,
        points,
    })
}

fn format_value(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{value:.0}")
    } else {
        format!("{value:.2}")
    }
}

/// Renders one chart block for a column of the table.
fn render_chart(
    table: &CombinedTable,
    column: &str,
    index: usize,
    descriptor: Option<&SeriesDescriptor>,
) -> String {
    let mut output = format!("{}\n", ui::style_text(column, ui::StyleType::Title));
    if let Some(units) = descriptor.and_then(|d| d.units.as_deref()) {
        output.push_str(&format!("{}\n", ui::style_text(units, ui::StyleType::Subtle)));
    }

    let Some(summary) = summarize(&table.column_values(column)) else {
        output.push_str(&ui::style_text("No observations", ui::StyleType::Error));
        return output;
    };

    let color = descriptor
        .and_then(|d| d.color)
        .unwrap_or(DEFAULT_COLORS[index % DEFAULT_COLORS.len()]);
    output.push_str(&format!(
        "{} {} {}\n",
        ui::style_text(
            &summary.first.0.format("%Y-%m").to_string(),
            ui::StyleType::Subtle
        ),
        ui::style_chart(&ui::sparkline(&summary.points), color),
        ui::style_text(
            &summary.last.0.format("%Y-%m").to_string(),
            ui::StyleType::Subtle
        ),
    ));

    let change = summary.last.1 - summary.first.1;
    output.push_str(&format!(
        "{} {}  {} {}  {} {}  {} {:+.2}",
        ui::style_text("Latest:", ui::StyleType::Label),
        ui::style_text(&format_value(summary.last.1), ui::StyleType::Value),
        ui::style_text("Min:", ui::StyleType::Label),
        format_value(summary.min),
        ui::style_text("Max:", ui::StyleType::Label),
        format_value(summary.max),
        ui::style_text("Change:", ui::StyleType::Label),
        change,
    ));
    output
}

/// Renders the raw table view: one row per date, one column per series.
pub fn render_raw_table(table: &CombinedTable) -> String {
    let mut raw = ui::new_styled_table();
    let mut header = vec![ui::header_cell("Date")];
    header.extend(table.columns().iter().map(|c| ui::header_cell(c)));
    raw.set_header(header);

    for (date, cells) in table.rows() {
        let mut row = vec![Cell::new(date.format("%Y-%m-%d"))];
        row.extend(
            cells
                .iter()
                .map(|cell| ui::format_optional_cell(*cell, format_value)),
        );
        raw.add_row(row);
    }
    raw.to_string()
}

/// Renders the dashboard: one chart per column, optionally followed by the raw
/// table. An empty table renders a single "no data" message.
pub fn render(loaded: &LoadedTable, descriptors: &[SeriesDescriptor], show_raw: bool) -> String {
    let table = &loaded.table;
    if table.is_empty() {
        return ui::style_text(NO_DATA, ui::StyleType::Error);
    }

    let source = match loaded.origin {
        TableOrigin::Cache => "cached data",
        TableOrigin::Fetched => "fresh data",
    };
    let mut sections = vec![format!(
        "{}\n{}",
        ui::style_text("Labor Statistics Dashboard", ui::StyleType::Title),
        ui::style_text(
            &format!(
                "{} series, {} months, {}",
                table.columns().len(),
                table.row_count(),
                source
            ),
            ui::StyleType::Subtle
        ),
    )];

    for (index, column) in table.columns().iter().enumerate() {
        let descriptor = descriptors.iter().find(|d| &d.name == column);
        sections.push(render_chart(table, column, index, descriptor));
    }

    if !loaded.failed.is_empty() {
        sections.push(ui::style_text(
            &format!("Unavailable: {}", loaded.failed.join(", ")),
            ui::StyleType::Error,
        ));
    }

    if show_raw {
        sections.push(render_raw_table(table));
    }

    sections.join("\n\n")
}
