//! Export star schema and KPI tables to CSV

use crate::core::kpi::{KpiSummary, NamedSummary};
use crate::core::models::RawTable;
use crate::core::pipeline::AnalysisView;
use crate::core::star::facts_to_table;
use csv::Writer;
use std::error::Error;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

/// Trait for writing an analysis view somewhere
pub trait TableExporter {
    /// Export every table of a view into `output_dir`
    ///
    /// # Errors
    /// Returns an error if export fails
    fn export(&self, view: &AnalysisView, output_dir: &Path) -> Result<ExportSummary, Box<dyn Error>>;
}

/// What an export wrote
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExportSummary {
    /// Files written, in write order
    pub files: Vec<PathBuf>,
    /// Data rows written across all files
    pub rows: usize,
}

/// Column header of KPI summary tables
pub const SUMMARY_COLUMNS: [&str; 17] = [
    "name",
    "records",
    "quantity",
    "scrap",
    "good_units",
    "scrap_rate_pct",
    "mean_scrap_rate_pct",
    "productivity_rate_pct",
    "mean_productivity_rate_pct",
    "energy_kwh",
    "energy_per_unit_kwh",
    "mean_energy_per_unit_kwh",
    "downtime_min",
    "material_cost",
    "availability_pct",
    "availability_basis",
    "end_of_line_pass_rate_pct",
];

fn summary_cells(name: &str, s: &KpiSummary) -> Vec<String> {
    let num = |v: f64| format!("{v:.4}");
    vec![
        name.to_string(),
        s.records.to_string(),
        s.total_quantity.to_string(),
        s.total_scrap.to_string(),
        s.good_units.to_string(),
        num(s.scrap_rate),
        num(s.mean_scrap_rate),
        num(s.productivity_rate),
        num(s.mean_productivity_rate),
        num(s.total_energy_kwh),
        num(s.energy_per_unit),
        num(s.mean_energy_per_unit),
        num(s.total_downtime_minutes),
        num(s.total_material_cost),
        num(s.availability.percent),
        s.availability.basis.to_string(),
        s.end_of_line_pass_rate.map(num).unwrap_or_default(),
    ]
}

/// Render named summaries as a table, one row per group
#[must_use]
pub fn summaries_to_table(summaries: &[NamedSummary]) -> RawTable {
    let mut table = RawTable::new(SUMMARY_COLUMNS.iter().map(ToString::to_string).collect());
    for item in summaries {
        table.push_row(summary_cells(&item.name, &item.summary));
    }
    table
}

/// Write a table as CSV with its header
///
/// # Errors
/// Returns an error if the file cannot be created or written
pub fn write_table_csv(table: &RawTable, path: &Path) -> Result<(), Box<dyn Error>> {
    let mut writer = Writer::from_path(path)?;
    writer.write_record(table.columns())?;
    for row in table.rows() {
        writer.write_record(row)?;
    }
    writer.flush()?;
    Ok(())
}

/// Named tables of a view, in export order
#[must_use]
pub fn view_tables(view: &AnalysisView) -> Vec<(&'static str, RawTable)> {
    let star = &view.star;
    let mut overall = summaries_to_table(&[]);
    overall.push_row(summary_cells("overall", &view.overall));

    vec![
        (star.dates.name(), star.dates.to_table()),
        (star.companies.name(), star.companies.to_table()),
        (star.products.name(), star.products.to_table()),
        (star.lines.name(), star.lines.to_table()),
        (star.shifts.name(), star.shifts.to_table()),
        (star.software.name(), star.software.to_table()),
        (star.statuses.name(), star.statuses.to_table()),
        ("fact_production", facts_to_table(&star.facts)),
        ("kpi_overall", overall),
        ("kpi_by_line", summaries_to_table(&view.by_line)),
        ("kpi_by_shift", summaries_to_table(&view.by_shift)),
        ("kpi_by_product", summaries_to_table(&view.by_product)),
        ("kpi_by_month", summaries_to_table(&view.by_month)),
        ("kpi_by_year", summaries_to_table(&view.by_year)),
    ]
}

/// CSV exporter writing one file per table
pub struct CsvTableExporter;

impl TableExporter for CsvTableExporter {
    fn export(&self, view: &AnalysisView, output_dir: &Path) -> Result<ExportSummary, Box<dyn Error>> {
        fs::create_dir_all(output_dir)?;

        let mut summary = ExportSummary::default();
        for (name, table) in view_tables(view) {
            let path = output_dir.join(format!("{name}.csv"));
            write_table_csv(&table, &path)?;
            summary.rows += table.len();
            summary.files.push(path);
        }

        info!(
            dir = %output_dir.display(),
            files = summary.files.len(),
            rows = summary.rows,
            "exported analysis tables"
        );
        Ok(summary)
    }
}
