//! Fact table rows

use crate::core::models::{Measures, RawTable};
use serde::Serialize;

/// One production event rewritten as foreign keys plus measures.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FactRow {
    /// Primary key, `1..=N` in normalized row order
    pub fact_id: u32,
    /// Date dimension ID
    pub date_id: u32,
    /// Company dimension ID
    pub company_id: u32,
    /// Product × modification dimension ID
    pub product_id: u32,
    /// Production line dimension ID
    pub line_id: u32,
    /// Shift dimension ID
    pub shift_id: u32,
    /// Software × firmware dimension ID
    pub software_id: u32,
    /// Status × error code dimension ID
    pub status_id: u32,
    /// Order number, carried as a fact attribute
    pub order_number: Option<String>,
    /// Measures, unchanged from the source row
    pub measures: Measures,
}

impl FactRow {
    /// Column names used by [`facts_to_table`]
    pub const COLUMNS: [&'static str; 20] = [
        "fact_id",
        "date_id",
        "company_id",
        "product_id",
        "line_id",
        "shift_id",
        "software_id",
        "status_id",
        "OrderNumber",
        "Quantity",
        "ScrapCount",
        "OperatingHours",
        "DowntimeMinutes",
        "MaterialCost",
        "EnergyKwh",
        "Headcount",
        "MaxTemperature",
        "AvgTemperature",
        "EndOfLineTestPassed",
        "GoodUnits",
    ];

    fn cells(&self) -> Vec<String> {
        fn opt<T: ToString>(value: Option<T>) -> String {
            value.map(|v| v.to_string()).unwrap_or_default()
        }
        let m = &self.measures;
        vec![
            self.fact_id.to_string(),
            self.date_id.to_string(),
            self.company_id.to_string(),
            self.product_id.to_string(),
            self.line_id.to_string(),
            self.shift_id.to_string(),
            self.software_id.to_string(),
            self.status_id.to_string(),
            self.order_number.clone().unwrap_or_default(),
            m.quantity.to_string(),
            m.scrap.to_string(),
            opt(m.operating_hours),
            m.downtime_minutes.to_string(),
            opt(m.material_cost),
            m.energy_kwh.to_string(),
            opt(m.headcount),
            opt(m.max_temperature),
            opt(m.avg_temperature),
            opt(m.end_of_line_passed),
            m.quantity.saturating_sub(m.scrap).to_string(),
        ]
    }
}

/// Render fact rows as a table; absent measures become empty cells
#[must_use]
pub fn facts_to_table(facts: &[FactRow]) -> RawTable {
    let mut table = RawTable::new(FactRow::COLUMNS.iter().map(ToString::to_string).collect());
    for fact in facts {
        table.push_row(fact.cells());
    }
    table
}
