//! Export command handler

use super::analyze::report_failure;
use production_analytics::config::Config;
use production_analytics::core::error::Outcome;
use production_analytics::core::filter::FilterSpec;
use production_analytics::core::metrics_export::{CsvTableExporter, TableExporter};
use production_analytics::core::pipeline::Pipeline;
use production_analytics::core::session::Session;
use std::path::Path;
use tracing::error;

/// Export dimension, fact and KPI tables of one dataset to `output_dir`.
pub fn run(path: &Path, output_dir: &Path, filter: &FilterSpec, config: &Config) {
    let mut session = Session::new(Pipeline::new(config.kpi_settings()));
    let run = match session.analyze_file(path, filter) {
        Ok(run) => run,
        Err(err) => {
            report_failure(path, &err);
            std::process::exit(1);
        }
    };

    let Outcome::Ready(view) = run.view else {
        println!("✗ No data for the selected filters, nothing exported");
        return;
    };

    match CsvTableExporter.export(&view, output_dir) {
        Ok(summary) => {
            println!(
                "✓ Exported {} tables ({} rows) to: {}",
                summary.files.len(),
                summary.rows,
                output_dir.display()
            );
        }
        Err(e) => {
            error!(dir = %output_dir.display(), "export failed: {e}");
            eprintln!("✗ Failed to export to {}: {e}", output_dir.display());
            std::process::exit(1);
        }
    }
}
