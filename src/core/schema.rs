//! Schema validation for production event tables

use crate::core::error::SchemaError;
use crate::core::models::RawTable;
use std::collections::HashSet;
use tracing::debug;

/// Canonical column names of the production dataset
pub mod columns {
    /// Calendar date of the production event
    pub const DATE: &str = "Date";
    /// Producing company
    pub const COMPANY: &str = "Company";
    /// Product name
    pub const PRODUCT: &str = "Product";
    /// Product modification / variant
    pub const MODIFICATION: &str = "Modification";
    /// Production line name
    pub const LINE: &str = "ProductionLine";
    /// Shift name
    pub const SHIFT: &str = "Shift";
    /// Order number
    pub const ORDER_NUMBER: &str = "OrderNumber";
    /// Order / run status
    pub const STATUS: &str = "Status";
    /// Error code attached to the status
    pub const ERROR_CODE: &str = "ErrorCode";
    /// Units produced
    pub const QUANTITY: &str = "Quantity";
    /// Units scrapped
    pub const SCRAP: &str = "ScrapCount";
    /// Operating hours
    pub const OPERATING_HOURS: &str = "OperatingHours";
    /// Downtime in minutes
    pub const DOWNTIME_MINUTES: &str = "DowntimeMinutes";
    /// Material cost
    pub const MATERIAL_COST: &str = "MaterialCost";
    /// Energy consumption in kWh
    pub const ENERGY_KWH: &str = "EnergyKwh";
    /// Production headcount
    pub const HEADCOUNT: &str = "Headcount";
    /// Software version
    pub const SOFTWARE_VERSION: &str = "SoftwareVersion";
    /// Firmware version
    pub const FIRMWARE_VERSION: &str = "FirmwareVersion";
    /// Maximum temperature
    pub const MAX_TEMPERATURE: &str = "MaxTemperature";
    /// Average temperature
    pub const AVG_TEMPERATURE: &str = "AvgTemperature";
    /// End-of-line test result
    pub const END_OF_LINE_TEST: &str = "EndOfLineTestPassed";
}

/// Semantic type a column is expected to hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SemanticType {
    /// Calendar date
    Date,
    /// Non-negative integer
    Integer,
    /// Floating point number
    Float,
    /// Categorical value (dimension key)
    Category,
    /// Free text
    Text,
    /// Boolean flag
    Boolean,
}

/// A required column and its semantic type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnSpec {
    /// Column name
    pub name: &'static str,
    /// Expected semantic type
    pub kind: SemanticType,
}

impl ColumnSpec {
    const fn new(name: &'static str, kind: SemanticType) -> Self {
        Self { name, kind }
    }
}

/// The set of columns a table must provide.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaSpec {
    columns: Vec<ColumnSpec>,
}

impl SchemaSpec {
    /// Build a schema from column specs
    #[must_use]
    pub const fn new(columns: Vec<ColumnSpec>) -> Self {
        Self { columns }
    }

    /// The production-event schema
    #[must_use]
    pub fn production() -> Self {
        use columns as c;
        use SemanticType::{Boolean, Category, Date, Float, Integer, Text};

        Self::new(vec![
            ColumnSpec::new(c::DATE, Date),
            ColumnSpec::new(c::COMPANY, Category),
            ColumnSpec::new(c::PRODUCT, Category),
            ColumnSpec::new(c::MODIFICATION, Category),
            ColumnSpec::new(c::LINE, Category),
            ColumnSpec::new(c::SHIFT, Category),
            ColumnSpec::new(c::ORDER_NUMBER, Text),
            ColumnSpec::new(c::STATUS, Category),
            ColumnSpec::new(c::ERROR_CODE, Category),
            ColumnSpec::new(c::QUANTITY, Integer),
            ColumnSpec::new(c::SCRAP, Integer),
            ColumnSpec::new(c::OPERATING_HOURS, Float),
            ColumnSpec::new(c::DOWNTIME_MINUTES, Float),
            ColumnSpec::new(c::MATERIAL_COST, Float),
            ColumnSpec::new(c::ENERGY_KWH, Float),
            ColumnSpec::new(c::HEADCOUNT, Integer),
            ColumnSpec::new(c::SOFTWARE_VERSION, Category),
            ColumnSpec::new(c::FIRMWARE_VERSION, Category),
            ColumnSpec::new(c::MAX_TEMPERATURE, Float),
            ColumnSpec::new(c::AVG_TEMPERATURE, Float),
            ColumnSpec::new(c::END_OF_LINE_TEST, Boolean),
        ])
    }

    /// Column specs in declaration order
    #[must_use]
    pub fn columns(&self) -> &[ColumnSpec] {
        &self.columns
    }

    /// Names of the columns declared with `kind`
    pub fn names_of_kind(&self, kind: SemanticType) -> impl Iterator<Item = &'static str> + '_ {
        self.columns
            .iter()
            .filter(move |c| c.kind == kind)
            .map(|c| c.name)
    }

    /// Check that `table` provides every required column exactly once.
    ///
    /// Returns the table unchanged on success. Missing columns are reported in
    /// the order they are declared in this schema.
    ///
    /// # Errors
    /// Returns [`SchemaError::DuplicateColumns`] if a header name repeats, or
    /// [`SchemaError::MissingColumns`] listing every absent column.
    pub fn validate<'t>(&self, table: &'t RawTable) -> Result<&'t RawTable, SchemaError> {
        let mut seen = HashSet::new();
        let mut duplicates: Vec<String> = Vec::new();
        for column in table.columns() {
            if !seen.insert(column.as_str()) && !duplicates.contains(column) {
                duplicates.push(column.clone());
            }
        }
        if !duplicates.is_empty() {
            return Err(SchemaError::DuplicateColumns(duplicates));
        }

        let missing: Vec<String> = self
            .columns
            .iter()
            .filter(|spec| !seen.contains(spec.name))
            .map(|spec| spec.name.to_string())
            .collect();

        if missing.is_empty() {
            debug!(columns = self.columns.len(), "schema validated");
            Ok(table)
        } else {
            Err(SchemaError::MissingColumns(missing))
        }
    }
}

impl Default for SchemaSpec {
    fn default() -> Self {
        Self::production()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header_without(skip: &str) -> Vec<&'static str> {
        SchemaSpec::production()
            .columns()
            .iter()
            .map(|c| c.name)
            .filter(|name| *name != skip)
            .collect()
    }

    #[test]
    fn accepts_complete_header() {
        let table = RawTable::from_rows(&header_without(""), &[]);
        assert!(SchemaSpec::production().validate(&table).is_ok());
    }

    #[test]
    fn reports_exact_missing_column() {
        let table = RawTable::from_rows(&header_without(columns::QUANTITY), &[]);
        let err = SchemaSpec::production().validate(&table).unwrap_err();
        assert_eq!(err, SchemaError::MissingColumns(vec!["Quantity".to_string()]));
    }

    #[test]
    fn reports_missing_columns_in_declaration_order() {
        let table = RawTable::from_rows(&["Shift", "Date"], &[]);
        let err = SchemaSpec::production().validate(&table).unwrap_err();
        let missing = err.missing_columns();
        assert_eq!(missing.len(), 19);
        assert_eq!(missing[0], "Company");
        assert_eq!(missing[18], "EndOfLineTestPassed");
    }

    #[test]
    fn rejects_duplicate_header() {
        let mut header = header_without("");
        header.push(columns::SHIFT);
        let table = RawTable::from_rows(&header, &[]);
        let err = SchemaSpec::production().validate(&table).unwrap_err();
        assert_eq!(err, SchemaError::DuplicateColumns(vec!["Shift".to_string()]));
    }

    #[test]
    fn reports_each_duplicate_once_in_first_repeat_order() {
        let mut header = header_without("");
        header.extend([columns::SHIFT, columns::DATE, columns::SHIFT, columns::DATE, columns::SHIFT]);
        let table = RawTable::from_rows(&header, &[]);
        let err = SchemaSpec::production().validate(&table).unwrap_err();
        assert_eq!(
            err,
            SchemaError::DuplicateColumns(vec!["Shift".to_string(), "Date".to_string()])
        );
    }

    #[test]
    fn categorical_columns_are_the_dimension_keys() {
        let keys: Vec<&str> = SchemaSpec::production()
            .names_of_kind(SemanticType::Category)
            .collect();
        assert_eq!(keys.len(), 9);
        assert_eq!(keys[0], columns::COMPANY);
        assert!(keys.contains(&columns::ERROR_CODE));
        assert!(!keys.contains(&columns::ORDER_NUMBER));
    }
}
