//! Typed production rows produced by the normalizer

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Numeric measures of one production event.
///
/// Carried unchanged from the normalized row into the fact table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Measures {
    /// Units produced
    pub quantity: u64,
    /// Units scrapped (never more than `quantity`)
    pub scrap: u64,
    /// Operating hours, when recorded
    pub operating_hours: Option<f64>,
    /// Downtime in minutes
    pub downtime_minutes: f64,
    /// Material cost, when recorded
    pub material_cost: Option<f64>,
    /// Energy consumption in kWh
    pub energy_kwh: f64,
    /// Production headcount, when recorded
    pub headcount: Option<u32>,
    /// Maximum temperature, when recorded
    pub max_temperature: Option<f64>,
    /// Average temperature, when recorded
    pub avg_temperature: Option<f64>,
    /// End-of-line test result, when recorded
    pub end_of_line_passed: Option<bool>,
}

impl Measures {
    /// Measures with only the required values set
    #[must_use]
    pub const fn new(quantity: u64, scrap: u64, downtime_minutes: f64, energy_kwh: f64) -> Self {
        Self {
            quantity,
            scrap,
            operating_hours: None,
            downtime_minutes,
            material_cost: None,
            energy_kwh,
            headcount: None,
            max_temperature: None,
            avg_temperature: None,
            end_of_line_passed: None,
        }
    }
}

/// One validated, well-typed production event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedRecord {
    /// Production date
    pub date: NaiveDate,
    /// Company
    pub company: String,
    /// Product name
    pub product: String,
    /// Product modification
    pub modification: String,
    /// Production line
    pub line: String,
    /// Shift
    pub shift: String,
    /// Order number, when present
    pub order_number: Option<String>,
    /// Run status
    pub status: String,
    /// Error code (`none` when the source cell was empty)
    pub error_code: String,
    /// Software version
    pub software_version: String,
    /// Firmware version
    pub firmware_version: String,
    /// Numeric measures
    pub measures: Measures,
}
