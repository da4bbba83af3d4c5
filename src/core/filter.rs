//! Filter predicates applied to normalized records before the star schema is built

use crate::core::models::NormalizedRecord;
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::BTreeSet;

/// Caller-selected view of the data.
///
/// Date bounds are inclusive. An empty set selects every value of that attribute.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterSpec {
    /// Earliest date to include
    pub date_from: Option<NaiveDate>,
    /// Latest date to include
    pub date_to: Option<NaiveDate>,
    /// Production lines to include
    pub lines: BTreeSet<String>,
    /// Shifts to include
    pub shifts: BTreeSet<String>,
    /// Products to include
    pub products: BTreeSet<String>,
}

impl FilterSpec {
    /// Filter that keeps everything
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    /// Restrict to an inclusive date range
    #[must_use]
    pub const fn with_dates(mut self, from: Option<NaiveDate>, to: Option<NaiveDate>) -> Self {
        self.date_from = from;
        self.date_to = to;
        self
    }

    /// Restrict to the given production lines
    #[must_use]
    pub fn with_lines<I, S>(mut self, lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.lines = lines.into_iter().map(Into::into).collect();
        self
    }

    /// Restrict to the given shifts
    #[must_use]
    pub fn with_shifts<I, S>(mut self, shifts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.shifts = shifts.into_iter().map(Into::into).collect();
        self
    }

    /// Restrict to the given products
    #[must_use]
    pub fn with_products<I, S>(mut self, products: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.products = products.into_iter().map(Into::into).collect();
        self
    }

    /// Whether the filter selects everything
    #[must_use]
    pub fn is_unrestricted(&self) -> bool {
        self.date_from.is_none()
            && self.date_to.is_none()
            && self.lines.is_empty()
            && self.shifts.is_empty()
            && self.products.is_empty()
    }

    /// Whether a single record passes every predicate
    #[must_use]
    pub fn matches(&self, record: &NormalizedRecord) -> bool {
        self.date_from.map_or(true, |from| record.date >= from)
            && self.date_to.map_or(true, |to| record.date <= to)
            && (self.lines.is_empty() || self.lines.contains(&record.line))
            && (self.shifts.is_empty() || self.shifts.contains(&record.shift))
            && (self.products.is_empty() || self.products.contains(&record.product))
    }

    /// Records that pass the filter, in input order
    #[must_use]
    pub fn apply(&self, records: &[NormalizedRecord]) -> Vec<NormalizedRecord> {
        records.iter().filter(|r| self.matches(r)).cloned().collect()
    }
}

/// Values available for filter widgets, derived from normalized data.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FilterOptions {
    /// Earliest date present
    pub min_date: Option<NaiveDate>,
    /// Latest date present
    pub max_date: Option<NaiveDate>,
    /// Distinct production lines, sorted
    pub lines: Vec<String>,
    /// Distinct shifts, sorted
    pub shifts: Vec<String>,
    /// Distinct products, sorted
    pub products: Vec<String>,
}

impl FilterOptions {
    /// Collect distinct filter values from records
    #[must_use]
    pub fn from_records(records: &[NormalizedRecord]) -> Self {
        let distinct = |pick: fn(&NormalizedRecord) -> &String| -> Vec<String> {
            records
                .iter()
                .map(pick)
                .collect::<BTreeSet<_>>()
                .into_iter()
                .cloned()
                .collect()
        };

        Self {
            min_date: records.iter().map(|r| r.date).min(),
            max_date: records.iter().map(|r| r.date).max(),
            lines: distinct(|r| &r.line),
            shifts: distinct(|r| &r.shift),
            products: distinct(|r| &r.product),
        }
    }
}
