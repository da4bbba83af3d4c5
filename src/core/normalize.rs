//! Record normalizer: coerces raw string cells into typed production records
//!
//! Unparsable values become a null marker instead of an error. Rows that lose
//! their date, a required categorical key or a required measure are dropped,
//! and every drop is counted in the [`NormalizationReport`].

use crate::core::models::{Measures, NormalizedRecord, RawTable};
use crate::core::schema::{columns, SchemaSpec, SemanticType};
use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;
use tracing::{debug, warn};

/// Error-code value used when the source leaves the code empty
pub const NO_ERROR_CODE: &str = "none";

/// Accepted date layouts, tried in order
const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%Y/%m/%d", "%d.%m.%Y"];

/// Accepted date-time layouts; the time part is discarded
const DATETIME_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];

/// Row counts before and after normalization, with drops per reason.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct NormalizationReport {
    /// Rows read from the raw table
    pub rows_in: usize,
    /// Rows that survived normalization
    pub rows_out: usize,
    /// Rows dropped because the date was missing or unparsable
    pub invalid_date: usize,
    /// Rows dropped because a required categorical key was empty
    pub missing_key: usize,
    /// Rows dropped because a required measure was missing or unparsable
    pub invalid_measure: usize,
    /// Rows dropped because scrap exceeded the produced quantity
    pub inconsistent_scrap: usize,
}

impl NormalizationReport {
    /// Total number of dropped rows
    #[must_use]
    pub const fn dropped(&self) -> usize {
        self.rows_in - self.rows_out
    }
}

/// Output of [`normalize`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Normalized {
    /// Surviving rows, in source order
    pub records: Vec<NormalizedRecord>,
    /// Data-quality counters
    pub report: NormalizationReport,
}

/// Why a row was rejected
enum Rejection {
    Date,
    Key,
    Measure,
    Scrap,
}

/// Column positions resolved once per table
struct ColumnIndex {
    names: Vec<&'static str>,
    positions: Vec<Option<usize>>,
    /// Categorical columns a row must fill; an empty error code is allowed
    required_keys: Vec<&'static str>,
}

impl ColumnIndex {
    fn resolve(table: &RawTable) -> Self {
        let schema = SchemaSpec::production();
        let names: Vec<&'static str> = schema.columns().iter().map(|c| c.name).collect();
        Self {
            positions: names.iter().map(|n| table.column_index(n)).collect(),
            names,
            required_keys: schema
                .names_of_kind(SemanticType::Category)
                .filter(|name| *name != columns::ERROR_CODE)
                .collect(),
        }
    }

    fn get<'r>(&self, row: &'r [String], name: &str) -> &'r str {
        self.names
            .iter()
            .position(|n| *n == name)
            .and_then(|slot| self.positions[slot])
            .and_then(|idx| row.get(idx))
            .map_or("", |cell| cell.trim())
    }
}

/// Normalize every row of a validated table.
///
/// The input is not modified; surviving rows keep their source order.
#[must_use]
pub fn normalize(table: &RawTable) -> Normalized {
    let index = ColumnIndex::resolve(table);
    let mut report = NormalizationReport {
        rows_in: table.len(),
        ..NormalizationReport::default()
    };
    let mut records = Vec::with_capacity(table.len());

    for row in table.rows() {
        match normalize_row(&index, row) {
            Ok(record) => records.push(record),
            Err(Rejection::Date) => report.invalid_date += 1,
            Err(Rejection::Key) => report.missing_key += 1,
            Err(Rejection::Measure) => report.invalid_measure += 1,
            Err(Rejection::Scrap) => report.inconsistent_scrap += 1,
        }
    }

    report.rows_out = records.len();
    if report.dropped() > 0 {
        warn!(
            dropped = report.dropped(),
            invalid_date = report.invalid_date,
            missing_key = report.missing_key,
            invalid_measure = report.invalid_measure,
            inconsistent_scrap = report.inconsistent_scrap,
            "rows dropped during normalization"
        );
    }
    debug!(rows_in = report.rows_in, rows_out = report.rows_out, "normalized table");

    Normalized { records, report }
}

fn normalize_row(index: &ColumnIndex, row: &[String]) -> Result<NormalizedRecord, Rejection> {
    let date = parse_date(index.get(row, columns::DATE)).ok_or(Rejection::Date)?;

    if index
        .required_keys
        .iter()
        .any(|name| index.get(row, name).is_empty())
    {
        return Err(Rejection::Key);
    }
    let key = |name: &str| index.get(row, name).to_string();
    let company = key(columns::COMPANY);
    let product = key(columns::PRODUCT);
    let modification = key(columns::MODIFICATION);
    let line = key(columns::LINE);
    let shift = key(columns::SHIFT);
    let status = key(columns::STATUS);
    let software_version = key(columns::SOFTWARE_VERSION);
    let firmware_version = key(columns::FIRMWARE_VERSION);

    let error_code = match index.get(row, columns::ERROR_CODE) {
        "" => NO_ERROR_CODE.to_string(),
        code => code.to_string(),
    };
    let order_number = Some(index.get(row, columns::ORDER_NUMBER))
        .filter(|v| !v.is_empty())
        .map(str::to_string);

    let quantity = parse_count(index.get(row, columns::QUANTITY)).ok_or(Rejection::Measure)?;
    let scrap = parse_count(index.get(row, columns::SCRAP)).ok_or(Rejection::Measure)?;
    let downtime_minutes = parse_non_negative(index.get(row, columns::DOWNTIME_MINUTES))
        .ok_or(Rejection::Measure)?;
    let energy_kwh =
        parse_non_negative(index.get(row, columns::ENERGY_KWH)).ok_or(Rejection::Measure)?;

    if scrap > quantity {
        return Err(Rejection::Scrap);
    }

    let measures = Measures {
        quantity,
        scrap,
        operating_hours: parse_non_negative(index.get(row, columns::OPERATING_HOURS)),
        downtime_minutes,
        material_cost: parse_non_negative(index.get(row, columns::MATERIAL_COST)),
        energy_kwh,
        headcount: parse_count(index.get(row, columns::HEADCOUNT))
            .and_then(|n| u32::try_from(n).ok()),
        max_temperature: parse_float(index.get(row, columns::MAX_TEMPERATURE)),
        avg_temperature: parse_float(index.get(row, columns::AVG_TEMPERATURE)),
        end_of_line_passed: parse_bool(index.get(row, columns::END_OF_LINE_TEST)),
    };

    Ok(NormalizedRecord {
        date,
        company,
        product,
        modification,
        line,
        shift,
        order_number,
        status,
        error_code,
        software_version,
        firmware_version,
        measures,
    })
}

/// Parse a calendar date; a time-of-day suffix is accepted and dropped.
#[must_use]
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(value, fmt).ok())
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
                .map(|dt| dt.date())
        })
}

/// Parse a finite float, accepting a decimal comma when no point is present.
#[must_use]
pub fn parse_float(value: &str) -> Option<f64> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    let parsed = if value.contains(',') && !value.contains('.') {
        value.replace(',', ".").parse::<f64>().ok()
    } else {
        value.parse::<f64>().ok()
    };
    parsed.filter(|v| v.is_finite())
}

/// Parse a finite float that must not be negative.
#[must_use]
pub fn parse_non_negative(value: &str) -> Option<f64> {
    parse_float(value).filter(|v| *v >= 0.0)
}

/// Parse a non-negative whole number; integral floats such as `12.0` are accepted.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn parse_count(value: &str) -> Option<u64> {
    let value = value.trim();
    if let Ok(n) = value.parse::<u64>() {
        return Some(n);
    }
    parse_non_negative(value)
        .filter(|v| v.fract() == 0.0 && *v <= 9_007_199_254_740_992.0)
        .map(|v| v as u64)
}

/// Parse a boolean flag in the spellings the source data uses.
#[must_use]
pub fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "y" | "ja" | "ok" | "pass" | "passed" | "bestanden" => Some(true),
        "false" | "0" | "no" | "n" | "nein" | "nok" | "fail" | "failed" | "nicht bestanden" => {
            Some(false)
        }
        _ => None,
    }
}
