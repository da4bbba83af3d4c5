//! End-to-end tests: raw table or CSV file in, star schema and KPIs out

use chrono::NaiveDate;
use production_analytics::core::analyzer::{AlertThresholds, Analyzer, Extreme, Severity};
use production_analytics::core::error::{Outcome, PipelineError, SchemaError, SessionError};
use production_analytics::core::filter::FilterSpec;
use production_analytics::core::kpi::{AvailabilityBasis, KpiSettings, Metric};
use production_analytics::core::loader::load_production_csv;
use production_analytics::core::models::RawTable;
use production_analytics::core::pipeline::{AnalysisView, Pipeline};
use production_analytics::core::schema::{columns, SchemaSpec};
use production_analytics::core::session::Session;
use production_analytics::logging;
use std::fs;
use std::path::PathBuf;

fn sample_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("samples/production_sample.csv")
}

fn header() -> Vec<String> {
    SchemaSpec::production()
        .columns()
        .iter()
        .map(|c| c.name.to_string())
        .collect()
}

/// A full-width row with the given key cells; other cells get plausible values
fn row(date: &str, line: &str, shift: &str, quantity: &str, scrap: &str) -> Vec<String> {
    header()
        .iter()
        .map(|column| {
            match column.as_str() {
                columns::DATE => date,
                columns::LINE => line,
                columns::SHIFT => shift,
                columns::QUANTITY => quantity,
                columns::SCRAP => scrap,
                columns::COMPANY => "Acme",
                columns::PRODUCT => "Pump",
                columns::MODIFICATION => "P1",
                columns::STATUS => "OK",
                columns::DOWNTIME_MINUTES => "0",
                columns::ENERGY_KWH => "10",
                columns::SOFTWARE_VERSION => "1.0",
                columns::FIRMWARE_VERSION => "fw",
                _ => "",
            }
            .to_string()
        })
        .collect()
}

fn analyze(rows: &[Vec<String>], filter: &FilterSpec) -> Outcome<AnalysisView> {
    let table = RawTable::from_rows(&header(), rows);
    Pipeline::default().run(&table, filter).unwrap().view
}

#[test]
fn single_row_yields_expected_rates() {
    let view = analyze(&[row("2025-01-01", "A", "Day", "100", "5")], &FilterSpec::all())
        .into_ready()
        .unwrap();

    assert!((view.overall.scrap_rate - 5.0).abs() < 1e-9);
    assert!((view.overall.productivity_rate - 95.0).abs() < 1e-9);
    assert_eq!(view.by_line.len(), 1);
    assert_eq!(view.by_line[0].name, "A");
}

#[test]
fn missing_quantity_column_is_reported_by_name() {
    let names: Vec<String> = header()
        .into_iter()
        .filter(|c| c != columns::QUANTITY)
        .collect();
    let table = RawTable::new(names);

    let err = Pipeline::default()
        .run(&table, &FilterSpec::all())
        .unwrap_err();
    assert_eq!(
        err,
        PipelineError::Schema(SchemaError::MissingColumns(vec!["Quantity".to_string()]))
    );
}

#[test]
fn lowest_scrap_line_is_found() {
    let view = analyze(
        &[
            row("2025-01-01", "A", "Day", "100", "10"),
            row("2025-01-01", "B", "Day", "100", "2"),
        ],
        &FilterSpec::all(),
    )
    .into_ready()
    .unwrap();

    let analyzer = Analyzer::new(&view.by_line);
    let best = analyzer.extremum(Metric::ScrapRate, Extreme::Min);
    assert_eq!(best.ready().map(|l| l.name.as_str()), Some("B"));
}

#[test]
fn date_range_outside_data_is_no_data() {
    let from = NaiveDate::from_ymd_opt(2030, 1, 1);
    let filter = FilterSpec::all().with_dates(from, None);
    let view = analyze(&[row("2025-01-01", "A", "Day", "100", "5")], &filter);

    assert!(view.is_no_data());
}

#[test]
fn repeated_runs_are_identical() {
    let rows = [
        row("2025-01-02", "B", "Night", "80", "4"),
        row("2025-01-01", "A", "Day", "100", "5"),
        row("2025-02-01", "A", "Night", "40", "0"),
    ];
    let first = analyze(&rows, &FilterSpec::all());
    let second = analyze(&rows, &FilterSpec::all());
    assert_eq!(first, second);
}

#[test]
fn sample_file_loads_with_german_headers() {
    let table = load_production_csv(sample_path()).unwrap();

    assert_eq!(table.len(), 50);
    assert!(table.column_index(columns::QUANTITY).is_some());
    assert!(table.column_index(columns::LINE).is_some());
    assert!(SchemaSpec::production().validate(&table).is_ok());
}

#[test]
fn sample_file_end_to_end() {
    logging::init_test();
    let mut session = Session::default();
    let run = session
        .analyze_file(sample_path(), &FilterSpec::all())
        .unwrap();

    assert_eq!(run.normalization.rows_in, 50);
    assert_eq!(run.normalization.rows_out, 48);
    assert_eq!(run.normalization.invalid_date, 1);
    assert_eq!(run.normalization.inconsistent_scrap, 1);
    assert_eq!(run.options.lines, ["Linie 1", "Linie 2", "Linie 3"]);

    let view = run.view.into_ready().unwrap();
    assert_eq!(view.star.len(), 48);
    assert!(view.star.verify_integrity().is_ok());
    assert_eq!(view.overall.total_quantity, 28_961);
    assert_eq!(view.overall.total_scrap, 973);
    // 9 of the 48 valid rows leave Betriebsstunden empty
    assert_eq!(view.overall.availability.basis, AvailabilityBasis::Mixed);
    assert_eq!(view.overall.availability.measured_records, 39);

    let years: Vec<&str> = view.by_year.iter().map(|y| y.name.as_str()).collect();
    assert_eq!(years, ["2023", "2024"]);
    assert_eq!(view.by_month.len(), 8);
    assert_eq!(view.by_product.len(), 4);

    let lines = Analyzer::new(&view.by_line);
    let worst = lines.worst(Metric::ScrapRate);
    assert_eq!(worst.ready().map(|l| l.name.as_str()), Some("Linie 3"));

    let scrap_alerts: Vec<_> = lines
        .alerts(&AlertThresholds::default())
        .into_iter()
        .filter(|a| a.metric == Metric::ScrapRate.label())
        .collect();
    assert_eq!(scrap_alerts.len(), 1);
    assert_eq!(scrap_alerts[0].name, "Linie 3");
    assert_eq!(scrap_alerts[0].severity, Severity::Critical);
}

#[test]
fn session_reuses_snapshot_across_filter_changes() {
    let mut session = Session::default();

    let all = session.analyze_file(sample_path(), &FilterSpec::all()).unwrap();
    let line_one = session
        .analyze_file(sample_path(), &FilterSpec::all().with_lines(["Linie 1"]))
        .unwrap();

    assert_eq!(session.cache().load_count(), 1);
    assert!(line_one.filtered_rows < all.filtered_rows);
    let view = line_one.view.into_ready().unwrap();
    assert_eq!(view.by_line.len(), 1);
    assert_eq!(view.overall.total_quantity, 10_071);
}

#[test]
fn session_reloads_when_file_changes() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("prod.csv");
    let contents = fs::read_to_string(sample_path()).unwrap();
    fs::write(&path, &contents).unwrap();

    let mut session = Session::default();
    session.analyze_file(&path, &FilterSpec::all()).unwrap();

    // Drop the two invalid rows at the end; a different length guarantees a new marker
    let trimmed: Vec<&str> = contents.lines().take(49).collect();
    fs::write(&path, trimmed.join("\n")).unwrap();

    let run = session.analyze_file(&path, &FilterSpec::all()).unwrap();
    assert_eq!(session.cache().load_count(), 2);
    assert_eq!(run.normalization.rows_in, 48);
    assert_eq!(run.normalization.dropped(), 0);
}

#[test]
fn missing_file_is_a_load_error() {
    let mut session = Session::default();
    let err = session
        .analyze_file("/definitely/not/here.csv", &FilterSpec::all())
        .unwrap_err();
    assert!(matches!(err, SessionError::Load(_)));
}

#[test]
fn huge_quantities_do_not_overflow_totals() {
    let view = analyze(
        &[
            row("2025-01-01", "A", "Day", "18446744073709551615", "0"),
            row("2025-01-02", "A", "Day", "1", "0"),
        ],
        &FilterSpec::all(),
    )
    .into_ready()
    .unwrap();

    assert_eq!(view.overall.total_quantity, u64::MAX);
    assert_eq!(view.by_line[0].summary.total_quantity, u64::MAX);
    assert_eq!(view.overall.scrap_rate, 0.0);
}

#[test]
fn estimated_availability_uses_configured_shift_length() {
    let table = RawTable::from_rows(&header(), &[row("2025-01-01", "A", "Day", "100", "5")]);
    let mut rows = table.rows().to_vec();
    let downtime = table.column_index(columns::DOWNTIME_MINUTES).unwrap();
    rows[0][downtime] = "60".to_string();
    let table = RawTable::from_rows(&header(), &rows);

    let eight = Pipeline::default().run(&table, &FilterSpec::all()).unwrap();
    let twelve = Pipeline::new(KpiSettings {
        nominal_shift_hours: 12.0,
    })
    .run(&table, &FilterSpec::all())
    .unwrap();

    let a8 = eight.view.into_ready().unwrap().overall.availability;
    let a12 = twelve.view.into_ready().unwrap().overall.availability;
    assert_eq!(a8.basis, AvailabilityBasis::Estimated);
    assert!((a8.percent - 87.5).abs() < 1e-9);
    assert!((a12.percent - 100.0 * 11.0 / 12.0).abs() < 1e-9);
}
