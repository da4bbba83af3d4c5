//! Aggregate KPIs over a collection of records

use super::{energy_per_unit, productivity_rate, ratio, scrap_rate};
use super::{KpiSettings, ProductionRecord};
use crate::core::error::Outcome;
use serde::Serialize;
use std::fmt;

/// Whether an availability figure was measured or estimated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum AvailabilityBasis {
    /// Every member recorded operating hours
    Measured,
    /// Some members recorded operating hours; the rest were estimated
    Mixed,
    /// Planned time approximated as `records × nominal_shift_hours`
    Estimated,
}

impl fmt::Display for AvailabilityBasis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Measured => write!(f, "measured"),
            Self::Mixed => write!(f, "mixed"),
            Self::Estimated => write!(f, "estimated"),
        }
    }
}

/// Availability in percent together with how it was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AvailabilityEstimate {
    /// Availability in percent
    pub percent: f64,
    /// Measured, estimated or a mix of both
    pub basis: AvailabilityBasis,
    /// Members whose operating hours were recorded
    pub measured_records: usize,
}

impl AvailabilityEstimate {
    /// Availability over `records`.
    ///
    /// A record with operating hours plans `hours + downtime` and runs `hours`.
    /// A record without plans `nominal_shift_hours` and runs that minus its
    /// downtime, floored at zero. The result is running over planned time.
    #[must_use]
    pub fn over(records: &[ProductionRecord], settings: &KpiSettings) -> Self {
        let mut running = 0.0;
        let mut planned = 0.0;
        let mut measured_records = 0;
        for record in records {
            let downtime_hours = record.downtime_minutes / 60.0;
            match record.operating_hours {
                Some(hours) => {
                    measured_records += 1;
                    running += hours;
                    planned += hours + downtime_hours;
                }
                None => {
                    running += (settings.nominal_shift_hours - downtime_hours).max(0.0);
                    planned += settings.nominal_shift_hours;
                }
            }
        }

        let basis = if measured_records == records.len() {
            AvailabilityBasis::Measured
        } else if measured_records == 0 {
            AvailabilityBasis::Estimated
        } else {
            AvailabilityBasis::Mixed
        };
        Self {
            percent: (ratio(running, planned) * 100.0).clamp(0.0, 100.0),
            basis,
            measured_records,
        }
    }
}

/// Aggregate KPIs of a non-empty set of records.
///
/// `scrap_rate`, `productivity_rate` and `energy_per_unit` are totals-based
/// (weighted by volume) and are the headline figures. The `mean_*` fields are
/// the unweighted averages of each record's own ratio.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KpiSummary {
    /// Number of records aggregated
    pub records: usize,
    /// Units produced
    pub total_quantity: u64,
    /// Units scrapped
    pub total_scrap: u64,
    /// Units produced minus units scrapped
    pub good_units: u64,
    /// Energy in kWh
    pub total_energy_kwh: f64,
    /// Downtime in minutes
    pub total_downtime_minutes: f64,
    /// Sum of recorded material cost
    pub total_material_cost: f64,
    /// `sum(scrap) / sum(quantity) * 100`
    pub scrap_rate: f64,
    /// `sum(good) / sum(quantity) * 100`
    pub productivity_rate: f64,
    /// `sum(energy) / sum(quantity)`
    pub energy_per_unit: f64,
    /// Mean of per-record scrap rates
    pub mean_scrap_rate: f64,
    /// Mean of per-record productivity rates
    pub mean_productivity_rate: f64,
    /// Mean of per-record energy per unit
    pub mean_energy_per_unit: f64,
    /// Availability and its basis
    pub availability: AvailabilityEstimate,
    /// Share of passed end-of-line tests among records that report one
    pub end_of_line_pass_rate: Option<f64>,
}

/// Aggregate records into a [`KpiSummary`]; [`Outcome::NoData`] when empty.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn summarize(records: &[ProductionRecord], settings: &KpiSettings) -> Outcome<KpiSummary> {
    if records.is_empty() {
        return Outcome::NoData;
    }
    let count = records.len() as f64;

    let total_quantity = saturating_total(records.iter().map(|r| r.quantity));
    let total_scrap = saturating_total(records.iter().map(|r| r.scrap));
    let total_energy_kwh: f64 = records.iter().map(|r| r.energy_kwh).sum();
    let total_downtime_minutes: f64 = records.iter().map(|r| r.downtime_minutes).sum();
    let total_material_cost: f64 = records.iter().filter_map(|r| r.material_cost).sum();

    let mean = |f: fn(&ProductionRecord) -> f64| ratio(records.iter().map(f).sum(), count);

    let tested: Vec<bool> = records.iter().filter_map(|r| r.end_of_line_passed).collect();
    let end_of_line_pass_rate = (!tested.is_empty()).then(|| {
        let passed = tested.iter().filter(|p| **p).count();
        ratio(passed as f64, tested.len() as f64) * 100.0
    });

    Outcome::Ready(KpiSummary {
        records: records.len(),
        total_quantity,
        total_scrap,
        good_units: total_quantity.saturating_sub(total_scrap),
        total_energy_kwh,
        total_downtime_minutes,
        total_material_cost,
        scrap_rate: scrap_rate(total_quantity, total_scrap),
        productivity_rate: productivity_rate(total_quantity, total_scrap),
        energy_per_unit: energy_per_unit(total_quantity, total_energy_kwh),
        mean_scrap_rate: mean(ProductionRecord::scrap_rate),
        mean_productivity_rate: mean(ProductionRecord::productivity_rate),
        mean_energy_per_unit: mean(ProductionRecord::energy_per_unit),
        availability: AvailabilityEstimate::over(records, settings),
        end_of_line_pass_rate,
    })
}

/// Sum of unit counts, pinned at `u64::MAX` instead of overflowing
fn saturating_total(counts: impl Iterator<Item = u64>) -> u64 {
    counts.fold(0, u64::saturating_add)
}

/// A named collection of records: one production line, shift, product or period.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductionGroup {
    /// Group name
    pub name: String,
    /// Member records
    pub records: Vec<ProductionRecord>,
}

/// Per-line aggregate
pub type ProductionLine = ProductionGroup;

impl ProductionGroup {
    /// Empty group
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            records: Vec::new(),
        }
    }

    /// Group with records
    #[must_use]
    pub fn with_records(name: impl Into<String>, records: Vec<ProductionRecord>) -> Self {
        Self {
            name: name.into(),
            records,
        }
    }

    /// Add a record
    pub fn push(&mut self, record: ProductionRecord) {
        self.records.push(record);
    }

    /// Units produced
    #[must_use]
    pub fn total_quantity(&self) -> u64 {
        saturating_total(self.records.iter().map(|r| r.quantity))
    }

    /// Units scrapped
    #[must_use]
    pub fn total_scrap(&self) -> u64 {
        saturating_total(self.records.iter().map(|r| r.scrap))
    }

    /// Mean of per-record scrap rates
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn avg_scrap_rate(&self) -> f64 {
        let sum = self.records.iter().map(ProductionRecord::scrap_rate).sum();
        ratio(sum, self.records.len() as f64)
    }

    /// Totals-based scrap rate
    #[must_use]
    pub fn weighted_scrap_rate(&self) -> f64 {
        scrap_rate(self.total_quantity(), self.total_scrap())
    }

    /// Aggregate KPIs, [`Outcome::NoData`] for an empty group
    #[must_use]
    pub fn summary(&self, settings: &KpiSettings) -> Outcome<NamedSummary> {
        summarize(&self.records, settings).map(|summary| NamedSummary {
            name: self.name.clone(),
            summary,
        })
    }
}

/// A summary labelled with the group it describes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NamedSummary {
    /// Group name
    pub name: String,
    /// Aggregate KPIs
    pub summary: KpiSummary,
}

/// Metrics a summary can be ranked or compared by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Metric {
    /// Weighted scrap rate
    ScrapRate,
    /// Mean of per-record scrap rates
    MeanScrapRate,
    /// Weighted productivity rate
    ProductivityRate,
    /// Mean of per-record productivity rates
    MeanProductivityRate,
    /// Weighted energy per unit
    EnergyPerUnit,
    /// Availability
    Availability,
    /// Units produced
    Quantity,
    /// Units scrapped
    Scrap,
    /// Downtime minutes
    Downtime,
}

impl Metric {
    /// Read the metric from a summary
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn value(self, summary: &KpiSummary) -> f64 {
        match self {
            Self::ScrapRate => summary.scrap_rate,
            Self::MeanScrapRate => summary.mean_scrap_rate,
            Self::ProductivityRate => summary.productivity_rate,
            Self::MeanProductivityRate => summary.mean_productivity_rate,
            Self::EnergyPerUnit => summary.energy_per_unit,
            Self::Availability => summary.availability.percent,
            Self::Quantity => summary.total_quantity as f64,
            Self::Scrap => summary.total_scrap as f64,
            Self::Downtime => summary.total_downtime_minutes,
        }
    }

    /// Whether larger values are better
    #[must_use]
    pub const fn higher_is_better(self) -> bool {
        matches!(
            self,
            Self::ProductivityRate | Self::MeanProductivityRate | Self::Availability | Self::Quantity
        )
    }

    /// Column label
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::ScrapRate => "scrap_rate_pct",
            Self::MeanScrapRate => "mean_scrap_rate_pct",
            Self::ProductivityRate => "productivity_rate_pct",
            Self::MeanProductivityRate => "mean_productivity_rate_pct",
            Self::EnergyPerUnit => "energy_per_unit_kwh",
            Self::Availability => "availability_pct",
            Self::Quantity => "quantity",
            Self::Scrap => "scrap",
            Self::Downtime => "downtime_min",
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    fn records(rows: &[(u64, u64)]) -> Vec<ProductionRecord> {
        rows.iter()
            .map(|&(q, s)| ProductionRecord::new(q, s, 10.0, 30.0))
            .collect()
    }

    #[test]
    fn empty_collection_has_no_data() {
        assert!(summarize(&[], &KpiSettings::default()).is_no_data());
        assert!(ProductionGroup::new("A")
            .summary(&KpiSettings::default())
            .is_no_data());
    }

    #[test]
    fn weighted_and_mean_rates_diverge_on_skewed_volume() {
        let rows = records(&[(10, 1), (1000, 100), (100, 1)]);
        let summary = summarize(&rows, &KpiSettings::default()).into_ready().unwrap();

        assert!(approx(summary.scrap_rate, 102.0 / 1110.0 * 100.0));
        assert!(approx(summary.mean_scrap_rate, (10.0 + 10.0 + 1.0) / 3.0));
        assert!((summary.scrap_rate - summary.mean_scrap_rate).abs() > 1.0);
        assert_eq!(summary.good_units, 1008);
    }

    #[test]
    fn availability_is_estimated_without_operating_hours() {
        let rows = records(&[(10, 0), (10, 0)]);
        let summary = summarize(&rows, &KpiSettings::default()).into_ready().unwrap();

        assert_eq!(summary.availability.basis, AvailabilityBasis::Estimated);
        // 16 planned hours, 1 hour down
        assert!(approx(summary.availability.percent, 15.0 / 16.0 * 100.0));
    }

    #[test]
    fn availability_is_measured_when_every_record_has_hours() {
        let mut rows = records(&[(10, 0), (10, 0)]);
        for r in &mut rows {
            r.operating_hours = Some(3.5);
        }
        let summary = summarize(&rows, &KpiSettings::default()).into_ready().unwrap();

        assert_eq!(summary.availability.basis, AvailabilityBasis::Measured);
        assert_eq!(summary.availability.measured_records, 2);
        assert!(approx(summary.availability.percent, 7.0 / 8.0 * 100.0));
    }

    #[test]
    fn one_missing_hours_cell_keeps_measured_members() {
        let mut rows: Vec<ProductionRecord> = (0..100)
            .map(|_| ProductionRecord::new(10, 0, 1.0, 6.0))
            .collect();
        for r in rows.iter_mut().take(99) {
            r.operating_hours = Some(1.0);
        }
        let availability = summarize(&rows, &KpiSettings::default())
            .into_ready()
            .unwrap()
            .availability;

        assert_eq!(availability.basis, AvailabilityBasis::Mixed);
        assert_eq!(availability.measured_records, 99);
        // 99 h measured plus 7.9 h estimated over 108.9 h plus 8 h planned
        assert!(approx(availability.percent, 106.9 / 116.9 * 100.0));
        assert!(availability.percent < 92.0);
    }

    #[test]
    fn totals_saturate_instead_of_overflowing() {
        let rows = [
            ProductionRecord::new(u64::MAX, u64::MAX - 1, 1.0, 0.0),
            ProductionRecord::new(1, 1, 1.0, 0.0),
        ];
        let summary = summarize(&rows, &KpiSettings::default()).into_ready().unwrap();

        assert_eq!(summary.total_quantity, u64::MAX);
        assert_eq!(summary.total_scrap, u64::MAX);
        assert_eq!(summary.good_units, 0);
        assert!((0.0..=100.0).contains(&summary.scrap_rate));

        let group = ProductionGroup::with_records("big", rows.to_vec());
        assert_eq!(group.total_quantity(), u64::MAX);
    }

    #[test]
    fn pass_rate_only_counts_reported_tests() {
        let mut rows = records(&[(1, 0), (1, 0), (1, 0)]);
        rows[0].end_of_line_passed = Some(true);
        rows[1].end_of_line_passed = Some(false);
        let summary = summarize(&rows, &KpiSettings::default()).into_ready().unwrap();
        assert_eq!(summary.end_of_line_pass_rate, Some(50.0));
    }

    #[test]
    fn group_accessors_match_summary() {
        let group = ProductionGroup::with_records("A", records(&[(100, 10), (50, 0)]));
        let named = group.summary(&KpiSettings::default()).into_ready().unwrap();

        assert_eq!(named.name, "A");
        assert_eq!(group.total_quantity(), 150);
        assert!(approx(group.weighted_scrap_rate(), named.summary.scrap_rate));
        assert!(approx(group.avg_scrap_rate(), named.summary.mean_scrap_rate));
    }
}
