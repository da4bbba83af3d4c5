//! Analyze command handler

use production_analytics::config::Config;
use production_analytics::core::analyzer::{
    project_improvements, Analyzer, ImprovementTargets, SortOrder,
};
use production_analytics::core::error::{Outcome, PipelineError, SessionError};
use production_analytics::core::filter::FilterSpec;
use production_analytics::core::kpi::{KpiSummary, Metric, NamedSummary};
use production_analytics::core::pipeline::{AnalysisView, Pipeline, PipelineRun};
use production_analytics::core::session::Session;
use std::path::Path;
use tracing::{error, info};

/// Run the analysis for one dataset and print the KPI report.
///
/// Exits with status 1 if the dataset cannot be loaded or fails validation.
/// A filter that matches nothing is not an error.
pub fn run(path: &Path, filter: &FilterSpec, config: &Config, verbose: bool) {
    let mut session = Session::new(Pipeline::new(config.kpi_settings()));
    let run = match session.analyze_file(path, filter) {
        Ok(run) => run,
        Err(err) => {
            report_failure(path, &err);
            std::process::exit(1);
        }
    };
    info!(path = %path.display(), rows = run.filtered_rows, "analysis finished");

    if verbose {
        print_normalization(&run);
    }

    match &run.view {
        Outcome::Ready(view) => print_view(view, config, verbose),
        Outcome::NoData => {
            println!("✗ No data for the selected filters");
            print_options(&run);
        }
    }
}

/// Print a load or validation failure; shared with the export command
pub fn report_failure(path: &Path, err: &SessionError) {
    error!(path = %path.display(), "analysis failed: {err}");
    match err {
        SessionError::Pipeline(PipelineError::Schema(schema)) => {
            eprintln!("✗ {} is not a production dataset: {schema}", path.display());
        }
        SessionError::Pipeline(PipelineError::Integrity(integrity)) => {
            eprintln!("✗ Internal consistency check failed: {integrity}");
        }
        SessionError::Load(load) => {
            eprintln!("✗ Failed to load {}: {load}", path.display());
        }
    }
}

fn print_normalization(run: &PipelineRun) {
    let report = &run.normalization;
    println!("✓ Rows read: {}, kept: {}", report.rows_in, report.rows_out);
    if report.dropped() > 0 {
        println!(
            "  dropped: {} invalid date, {} missing key, {} invalid measure, {} scrap above quantity",
            report.invalid_date, report.missing_key, report.invalid_measure, report.inconsistent_scrap
        );
    }
    println!("✓ Rows after filter: {}", run.filtered_rows);
}

fn print_options(run: &PipelineRun) {
    let options = &run.options;
    if let (Some(min), Some(max)) = (options.min_date, options.max_date) {
        println!("  available dates: {min} .. {max}");
    }
    println!("  available lines: {}", options.lines.join(", "));
    println!("  available shifts: {}", options.shifts.join(", "));
}

fn print_view(view: &AnalysisView, config: &Config, verbose: bool) {
    println!("\n=== Overall ===");
    print_summary(&view.overall);

    print_table("Production lines", &view.by_line);
    print_table("Shifts", &view.by_shift);
    if verbose {
        print_table("Months", &view.by_month);
    }
    print_table("Years", &view.by_year);

    let lines = Analyzer::new(&view.by_line);
    println!("\n=== Line comparison ===");
    for metric in [Metric::ScrapRate, Metric::ProductivityRate, Metric::Availability] {
        if let Outcome::Ready(spread) = lines.spread(metric) {
            println!(
                "{metric:<24} best {} ({:.2}), worst {} ({:.2}), gap {:.2}",
                spread.best, spread.best_value, spread.worst, spread.worst_value, spread.gap
            );
        }
    }

    let alerts = lines.alerts(&config.alert_thresholds());
    if alerts.is_empty() {
        println!("✓ All lines within thresholds");
    }
    for alert in &alerts {
        println!(
            "{:<8} {}: {} = {:.2} (threshold {:.2})",
            alert.severity, alert.name, alert.metric, alert.value, alert.threshold
        );
    }

    let years = Analyzer::new(&view.by_year);
    let deltas = years.year_over_year(Metric::ScrapRate);
    if !deltas.is_empty() {
        println!("\n=== Year over year ({}) ===", Metric::ScrapRate);
        for delta in deltas {
            println!(
                "{} -> {}: {:.2} -> {:.2} ({:+.2})",
                delta.from, delta.to, delta.previous, delta.current, delta.delta
            );
        }
    }

    let products = Analyzer::new(&view.by_product);
    println!("\n=== Top products by quantity ===");
    let top = products.top(Metric::Quantity, config.kpi.top_products);
    for entry in top.into_ready().unwrap_or_default() {
        println!("{:>3}. {:<32} {:>12.0}", entry.rank, entry.name, entry.value);
    }
    if verbose {
        println!("\n=== Products by scrap rate ===");
        let ranked = products.rank_by(Metric::ScrapRate, SortOrder::Descending);
        for entry in ranked.into_ready().unwrap_or_default() {
            println!("{:>3}. {:<32} {:>8.2}", entry.rank, entry.name, entry.value);
        }
    }

    let projection = project_improvements(&view.overall, &ImprovementTargets::default());
    println!("\n=== Improvement potential ===");
    println!("Scrap units avoided:  {:.0}", projection.scrap_units_saved);
    println!("Additional output:    {:.0}", projection.additional_output);
    println!("Energy saved (kWh):   {:.1}", projection.energy_saved_kwh);
}

fn print_summary(s: &KpiSummary) {
    println!("Records:            {}", s.records);
    println!("Quantity:           {}", s.total_quantity);
    println!("Scrap:              {}", s.total_scrap);
    println!(
        "Scrap rate:         {:.2} % (mean of records {:.2} %)",
        s.scrap_rate, s.mean_scrap_rate
    );
    println!("Productivity rate:  {:.2} %", s.productivity_rate);
    println!("Energy per unit:    {:.3} kWh", s.energy_per_unit);
    println!("Downtime:           {:.0} min", s.total_downtime_minutes);
    println!(
        "Availability:       {:.2} % ({}, {}/{} records measured)",
        s.availability.percent, s.availability.basis, s.availability.measured_records, s.records
    );
    if let Some(rate) = s.end_of_line_pass_rate {
        println!("End-of-line passed: {rate:.2} %");
    }
}

fn print_table(title: &str, rows: &[NamedSummary]) {
    println!("\n=== {title} ===");
    println!(
        "{:<24} {:>10} {:>8} {:>8} {:>8} {:>10}",
        "name", "quantity", "scrap%", "prod%", "avail%", "kWh/unit"
    );
    for row in rows {
        let s = &row.summary;
        println!(
            "{:<24} {:>10} {:>8.2} {:>8.2} {:>8.2} {:>10.3}",
            row.name,
            s.total_quantity,
            s.scrap_rate,
            s.productivity_rate,
            s.availability.percent,
            s.energy_per_unit
        );
    }
}
