//! Group fact rows by dimension value and summarize each group

use super::summary::{summarize, KpiSummary, NamedSummary, ProductionGroup};
use super::{KpiSettings, ProductionRecord};
use crate::core::error::Outcome;
use crate::core::star::{FactRow, StarSchema};
use chrono::Datelike;
use std::collections::BTreeMap;
use std::fmt;

/// Calendar month used as a trend bucket; orders chronologically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MonthKey {
    /// Year
    pub year: i32,
    /// Month, 1-12
    pub month: u32,
}

impl fmt::Display for MonthKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

/// Partition facts by a key, keeping fact order inside each group
fn partition<K, F>(star: &StarSchema, key: F) -> BTreeMap<K, Vec<ProductionRecord>>
where
    K: Ord,
    F: Fn(&StarSchema, &FactRow) -> Option<K>,
{
    let mut groups: BTreeMap<K, Vec<ProductionRecord>> = BTreeMap::new();
    for fact in &star.facts {
        if let Some(k) = key(star, fact) {
            groups
                .entry(k)
                .or_default()
                .push(ProductionRecord::from(&fact.measures));
        }
    }
    groups
}

fn summarize_groups<K: fmt::Display>(
    groups: BTreeMap<K, Vec<ProductionRecord>>,
    settings: &KpiSettings,
) -> Vec<NamedSummary> {
    groups
        .into_iter()
        .filter_map(|(key, records)| {
            ProductionGroup::with_records(key.to_string(), records)
                .summary(settings)
                .into_ready()
        })
        .collect()
}

/// Record groups per production line, ordered by line name
#[must_use]
pub fn line_groups(star: &StarSchema) -> Vec<ProductionGroup> {
    partition(star, |s, f| s.line_of(f).map(str::to_string))
        .into_iter()
        .map(|(name, records)| ProductionGroup::with_records(name, records))
        .collect()
}

/// KPIs per production line, ordered by line name
#[must_use]
pub fn by_line(star: &StarSchema, settings: &KpiSettings) -> Vec<NamedSummary> {
    summarize_groups(partition(star, |s, f| s.line_of(f).map(str::to_string)), settings)
}

/// KPIs per shift, ordered by shift name
#[must_use]
pub fn by_shift(star: &StarSchema, settings: &KpiSettings) -> Vec<NamedSummary> {
    summarize_groups(partition(star, |s, f| s.shift_of(f).map(str::to_string)), settings)
}

/// KPIs per product × modification, named `product (modification)`
#[must_use]
pub fn by_product(star: &StarSchema, settings: &KpiSettings) -> Vec<NamedSummary> {
    let groups = partition(star, |s, f| {
        s.product_of(f)
            .map(|(product, modification)| format!("{product} ({modification})"))
    });
    summarize_groups(groups, settings)
}

/// KPIs per calendar month in chronological order, named `YYYY-MM`
#[must_use]
pub fn by_month(star: &StarSchema, settings: &KpiSettings) -> Vec<NamedSummary> {
    let groups = partition(star, |s, f| {
        s.date_of(f).map(|d| MonthKey {
            year: d.year(),
            month: d.month(),
        })
    });
    summarize_groups(groups, settings)
}

/// KPIs per calendar year in chronological order
#[must_use]
pub fn by_year(star: &StarSchema, settings: &KpiSettings) -> Vec<NamedSummary> {
    summarize_groups(partition(star, |s, f| s.date_of(f).map(|d| d.year())), settings)
}

/// KPIs over every fact of the view
#[must_use]
pub fn overall(star: &StarSchema, settings: &KpiSettings) -> Outcome<KpiSummary> {
    let records: Vec<ProductionRecord> = star
        .facts
        .iter()
        .map(|f| ProductionRecord::from(&f.measures))
        .collect();
    summarize(&records, settings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::{Measures, NormalizedRecord};
    use chrono::NaiveDate;

    fn record(
        date: (i32, u32, u32),
        line: &str,
        shift: &str,
        quantity: u64,
        scrap: u64,
    ) -> NormalizedRecord {
        NormalizedRecord {
            date: NaiveDate::from_ymd_opt(date.0, date.1, date.2).unwrap(),
            company: "Acme".into(),
            product: "Pump".into(),
            modification: if line == "A" { "Std".into() } else { "Pro".into() },
            line: line.into(),
            shift: shift.into(),
            order_number: None,
            status: "OK".into(),
            error_code: "none".into(),
            software_version: "1.0".into(),
            firmware_version: "fw1".into(),
            measures: Measures::new(quantity, scrap, 0.0, 10.0),
        }
    }

    fn star() -> StarSchema {
        StarSchema::build(&[
            record((2025, 2, 3), "B", "Night", 100, 2),
            record((2024, 12, 30), "A", "Day", 100, 10),
            record((2025, 1, 9), "A", "Night", 50, 5),
        ])
        .unwrap()
    }

    #[test]
    fn line_groups_sum_members() {
        let lines = by_line(&star(), &KpiSettings::default());
        let names: Vec<&str> = lines.iter().map(|l| l.name.as_str()).collect();
        assert_eq!(names, ["A", "B"]);
        assert_eq!(lines[0].summary.total_quantity, 150);
        assert_eq!(lines[0].summary.total_scrap, 15);
        assert_eq!(lines[1].summary.records, 1);
    }

    #[test]
    fn months_are_chronological() {
        let months = by_month(&star(), &KpiSettings::default());
        let names: Vec<&str> = months.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, ["2024-12", "2025-01", "2025-02"]);

        let years = by_year(&star(), &KpiSettings::default());
        assert_eq!(years.len(), 2);
        assert_eq!(years[1].summary.total_quantity, 150);
    }

    #[test]
    fn products_and_shifts_are_named() {
        let products = by_product(&star(), &KpiSettings::default());
        assert_eq!(products[0].name, "Pump (Pro)");
        assert_eq!(products[1].name, "Pump (Std)");

        let shifts = by_shift(&star(), &KpiSettings::default());
        assert_eq!(shifts[1].name, "Night");
        assert_eq!(shifts[1].summary.total_quantity, 150);
    }

    #[test]
    fn overall_of_empty_view_has_no_data() {
        let empty = StarSchema::build(&[]).unwrap();
        assert!(overall(&empty, &KpiSettings::default()).is_no_data());
        assert!(by_line(&empty, &KpiSettings::default()).is_empty());
        assert!(overall(&star(), &KpiSettings::default()).ready().is_some());
    }
}
