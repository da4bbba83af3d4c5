//! Integration tests for dimension and fact building

use production_analytics::core::filter::FilterSpec;
use production_analytics::core::loader::load_production_csv;
use production_analytics::core::metrics_export::{CsvTableExporter, TableExporter};
use production_analytics::core::models::NormalizedRecord;
use production_analytics::core::normalize::normalize;
use production_analytics::core::pipeline::Pipeline;
use production_analytics::core::star::StarSchema;
use std::collections::BTreeSet;
use std::path::PathBuf;

fn sample_records() -> Vec<NormalizedRecord> {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("samples/production_sample.csv");
    let table = load_production_csv(path).expect("sample loads");
    normalize(&table).records
}

#[test]
fn one_fact_per_normalized_record() {
    let records = sample_records();
    let star = StarSchema::build(&records).unwrap();

    assert_eq!(star.facts.len(), records.len());
    let ids: Vec<u32> = star.facts.iter().map(|f| f.fact_id).collect();
    let expected: Vec<u32> = (1..=u32::try_from(records.len()).unwrap()).collect();
    assert_eq!(ids, expected);
}

#[test]
fn dimension_sizes_match_distinct_natural_keys() {
    let records = sample_records();
    let star = StarSchema::build(&records).unwrap();

    let distinct_dates: BTreeSet<_> = records.iter().map(|r| r.date).collect();
    let distinct_status: BTreeSet<_> = records
        .iter()
        .map(|r| (r.status.clone(), r.error_code.clone()))
        .collect();

    assert_eq!(star.dates.len(), distinct_dates.len());
    assert_eq!(star.statuses.len(), distinct_status.len());
    assert_eq!(star.companies.len(), 1);
    assert_eq!(star.lines.len(), 3);
    assert_eq!(star.shifts.len(), 3);
    assert_eq!(star.products.len(), 4);
    assert_eq!(star.software.len(), 2);
}

#[test]
fn surrogate_ids_follow_sorted_natural_keys() {
    let star = StarSchema::build(&sample_records()).unwrap();

    let shifts: Vec<(u32, &str)> = star.shifts.iter().map(|(id, k)| (id, k.as_str())).collect();
    assert_eq!(shifts, [(1, "Früh"), (2, "Nacht"), (3, "Spät")]);
    assert!(star.dates.has_dense_ids());
    assert!(star.products.has_dense_ids());
}

#[test]
fn every_fact_resolves_back_to_its_record() {
    let records = sample_records();
    let star = StarSchema::build(&records).unwrap();

    for (fact, record) in star.facts.iter().zip(&records) {
        assert_eq!(star.line_of(fact), Some(record.line.as_str()));
        assert_eq!(star.shift_of(fact), Some(record.shift.as_str()));
        assert_eq!(star.date_of(fact), Some(record.date));
        assert_eq!(
            star.product_of(fact),
            Some(&(record.product.clone(), record.modification.clone()))
        );
        assert_eq!(fact.measures, record.measures);
    }
    assert!(star.verify_integrity().is_ok());
}

#[test]
fn empty_error_codes_form_their_own_key() {
    let star = StarSchema::build(&sample_records()).unwrap();
    assert!(star
        .statuses
        .iter()
        .any(|(_, (status, code))| status == "OK" && code == "none"));
}

#[test]
fn build_is_reproducible_regardless_of_record_order() {
    let records = sample_records();
    let mut reversed = records.clone();
    reversed.reverse();

    let forward = StarSchema::build(&records).unwrap();
    let backward = StarSchema::build(&reversed).unwrap();

    assert_eq!(forward.lines, backward.lines);
    assert_eq!(forward.dates, backward.dates);
    assert_eq!(forward.statuses, backward.statuses);
}

#[test]
fn export_writes_every_table() {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("samples/production_sample.csv");
    let table = load_production_csv(path).unwrap();
    let view = Pipeline::default()
        .run(&table, &FilterSpec::all())
        .unwrap()
        .view
        .into_ready()
        .unwrap();

    let dir = tempfile::tempdir().unwrap();
    let summary = CsvTableExporter.export(&view, dir.path()).unwrap();

    assert_eq!(summary.files.len(), 14);
    for file in &summary.files {
        assert!(file.exists(), "{} missing", file.display());
    }

    let facts = std::fs::read_to_string(dir.path().join("fact_production.csv")).unwrap();
    assert_eq!(facts.lines().count(), 49);
    assert!(facts.starts_with("fact_id,date_id,company_id"));

    let lines = std::fs::read_to_string(dir.path().join("dim_line.csv")).unwrap();
    assert_eq!(lines.lines().next(), Some("line_id,ProductionLine"));
    assert_eq!(lines.lines().nth(1), Some("1,Linie 1"));
}
