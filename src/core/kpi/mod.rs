//! KPI engine
//!
//! Record-level formulas are free functions over plain numbers so each one can
//! be tested on its own. [`ProductionRecord`] bundles the inputs of one event,
//! [`summary`] aggregates records and [`grouping`] slices a star schema by
//! dimension before aggregating.
//!
//! Every ratio goes through [`ratio`]: a zero or non-finite denominator yields
//! `0.0`, so no NaN or infinity ever reaches an aggregate or a comparison.

pub mod grouping;
pub mod summary;

pub use grouping::{
    by_line, by_month, by_product, by_shift, by_year, line_groups, overall, MonthKey,
};
pub use summary::{
    summarize, AvailabilityBasis, AvailabilityEstimate, KpiSummary, Metric, NamedSummary,
    ProductionGroup, ProductionLine,
};

use crate::core::models::Measures;
use serde::{Deserialize, Serialize};

/// Tunables of the KPI engine
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct KpiSettings {
    /// Planned hours per record, used when operating hours are not recorded
    pub nominal_shift_hours: f64,
}

impl Default for KpiSettings {
    fn default() -> Self {
        Self {
            nominal_shift_hours: 8.0,
        }
    }
}

/// Guarded division: `0.0` for a zero or non-finite denominator or result
#[must_use]
pub fn ratio(numerator: f64, denominator: f64) -> f64 {
    if denominator == 0.0 || !denominator.is_finite() || !numerator.is_finite() {
        return 0.0;
    }
    let value = numerator / denominator;
    if value.is_finite() {
        value
    } else {
        0.0
    }
}

/// Scrapped share of produced units, in percent
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn scrap_rate(quantity: u64, scrap: u64) -> f64 {
    ratio(scrap as f64, quantity as f64) * 100.0
}

/// Accepted share of produced units, in percent
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn productivity_rate(quantity: u64, scrap: u64) -> f64 {
    ratio(quantity.saturating_sub(scrap) as f64, quantity as f64) * 100.0
}

/// Energy per produced unit in kWh
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn energy_per_unit(quantity: u64, energy_kwh: f64) -> f64 {
    ratio(energy_kwh, quantity as f64)
}

/// Operating share of operating plus downtime, in percent
#[must_use]
pub fn availability(operating_hours: f64, downtime_minutes: f64) -> f64 {
    ratio(operating_hours, operating_hours + downtime_minutes / 60.0) * 100.0
}

/// KPI inputs of a single production event.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ProductionRecord {
    /// Units produced
    pub quantity: u64,
    /// Units scrapped
    pub scrap: u64,
    /// Energy consumption in kWh
    pub energy_kwh: f64,
    /// Downtime in minutes
    pub downtime_minutes: f64,
    /// Operating hours, when recorded
    pub operating_hours: Option<f64>,
    /// Material cost, when recorded
    pub material_cost: Option<f64>,
    /// End-of-line test result, when recorded
    pub end_of_line_passed: Option<bool>,
}

impl ProductionRecord {
    /// Record with only the required inputs
    #[must_use]
    pub const fn new(quantity: u64, scrap: u64, energy_kwh: f64, downtime_minutes: f64) -> Self {
        Self {
            quantity,
            scrap,
            energy_kwh,
            downtime_minutes,
            operating_hours: None,
            material_cost: None,
            end_of_line_passed: None,
        }
    }

    /// Scrap rate in percent
    #[must_use]
    pub fn scrap_rate(&self) -> f64 {
        scrap_rate(self.quantity, self.scrap)
    }

    /// Productivity rate in percent
    #[must_use]
    pub fn productivity_rate(&self) -> f64 {
        productivity_rate(self.quantity, self.scrap)
    }

    /// Energy per unit in kWh
    #[must_use]
    pub fn energy_per_unit(&self) -> f64 {
        energy_per_unit(self.quantity, self.energy_kwh)
    }

    /// Measured availability in percent, when operating hours exist
    #[must_use]
    pub fn availability(&self) -> Option<f64> {
        self.operating_hours
            .map(|hours| availability(hours, self.downtime_minutes))
    }

    /// Good units
    #[must_use]
    pub const fn good_units(&self) -> u64 {
        self.quantity.saturating_sub(self.scrap)
    }
}

impl From<&Measures> for ProductionRecord {
    fn from(m: &Measures) -> Self {
        Self {
            quantity: m.quantity,
            scrap: m.scrap,
            energy_kwh: m.energy_kwh,
            downtime_minutes: m.downtime_minutes,
            operating_hours: m.operating_hours,
            material_cost: m.material_cost,
            end_of_line_passed: m.end_of_line_passed,
        }
    }
}
