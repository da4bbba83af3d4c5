//! Star schema: dimension tables plus one fact table
//!
//! Built fresh from the filtered records of each view. Dimensions only hold
//! values present in that view.

pub mod dimensions;
pub mod facts;

pub use dimensions::{DimensionTable, NaturalKey};
pub use facts::{facts_to_table, FactRow};

use crate::core::error::IntegrityError;
use crate::core::models::NormalizedRecord;
use chrono::NaiveDate;
use tracing::debug;

/// Natural key of the product dimension: product × modification
pub type ProductKey = (String, String);
/// Natural key of the software dimension: software × firmware version
pub type SoftwareKey = (String, String);
/// Natural key of the status dimension: status × error code
pub type StatusKey = (String, String);

/// All dimension tables and the fact table of one view.
#[derive(Debug, Clone, PartialEq)]
pub struct StarSchema {
    /// Calendar dates with year, month and day
    pub dates: DimensionTable<NaiveDate>,
    /// Companies
    pub companies: DimensionTable<String>,
    /// Product × modification pairs
    pub products: DimensionTable<ProductKey>,
    /// Production lines
    pub lines: DimensionTable<String>,
    /// Shifts
    pub shifts: DimensionTable<String>,
    /// Software × firmware pairs
    pub software: DimensionTable<SoftwareKey>,
    /// Status × error code pairs
    pub statuses: DimensionTable<StatusKey>,
    /// One row per normalized record, in record order
    pub facts: Vec<FactRow>,
}

fn resolve<K: NaturalKey>(dim: &DimensionTable<K>, key: &K) -> Result<u32, IntegrityError> {
    dim.id_of(key).ok_or_else(|| IntegrityError::UnresolvedKey {
        dimension: dim.name(),
        key: format!("{key:?}"),
    })
}

impl StarSchema {
    /// Build dimensions and facts from normalized records.
    ///
    /// # Errors
    /// Returns [`IntegrityError`] if a record's natural key cannot be resolved
    /// or the finished schema fails [`StarSchema::verify_integrity`].
    pub fn build(records: &[NormalizedRecord]) -> Result<Self, IntegrityError> {
        let dates = DimensionTable::build(
            "dim_date",
            &["Date", "Year", "Month", "Day"],
            records.iter().map(|r| r.date),
        );
        let companies = DimensionTable::build(
            "dim_company",
            &["Company"],
            records.iter().map(|r| r.company.clone()),
        );
        let products = DimensionTable::build(
            "dim_product",
            &["Product", "Modification"],
            records.iter().map(product_key),
        );
        let lines = DimensionTable::build(
            "dim_line",
            &["ProductionLine"],
            records.iter().map(|r| r.line.clone()),
        );
        let shifts = DimensionTable::build(
            "dim_shift",
            &["Shift"],
            records.iter().map(|r| r.shift.clone()),
        );
        let software = DimensionTable::build(
            "dim_software",
            &["SoftwareVersion", "FirmwareVersion"],
            records.iter().map(software_key),
        );
        let statuses = DimensionTable::build(
            "dim_status",
            &["Status", "ErrorCode"],
            records.iter().map(status_key),
        );

        let mut facts = Vec::with_capacity(records.len());
        for (fact_id, record) in (1u32..).zip(records) {
            facts.push(FactRow {
                fact_id,
                date_id: resolve(&dates, &record.date)?,
                company_id: resolve(&companies, &record.company)?,
                product_id: resolve(&products, &product_key(record))?,
                line_id: resolve(&lines, &record.line)?,
                shift_id: resolve(&shifts, &record.shift)?,
                software_id: resolve(&software, &software_key(record))?,
                status_id: resolve(&statuses, &status_key(record))?,
                order_number: record.order_number.clone(),
                measures: record.measures.clone(),
            });
        }

        let star = Self {
            dates,
            companies,
            products,
            lines,
            shifts,
            software,
            statuses,
            facts,
        };
        star.verify_integrity()?;
        debug!(
            facts = star.facts.len(),
            dates = star.dates.len(),
            lines = star.lines.len(),
            products = star.products.len(),
            "star schema built"
        );
        Ok(star)
    }

    /// Check dense IDs in every dimension and that every fact key resolves.
    ///
    /// # Errors
    /// Returns the first [`IntegrityError`] found.
    pub fn verify_integrity(&self) -> Result<(), IntegrityError> {
        let sparse_dim = sparse(&self.dates)
            .or_else(|| sparse(&self.companies))
            .or_else(|| sparse(&self.products))
            .or_else(|| sparse(&self.lines))
            .or_else(|| sparse(&self.shifts))
            .or_else(|| sparse(&self.software))
            .or_else(|| sparse(&self.statuses));
        if let Some(name) = sparse_dim {
            return Err(IntegrityError::SparseIds(name));
        }

        for fact in &self.facts {
            let unresolved = dangling(&self.dates, fact.date_id)
                .or_else(|| dangling(&self.companies, fact.company_id))
                .or_else(|| dangling(&self.products, fact.product_id))
                .or_else(|| dangling(&self.lines, fact.line_id))
                .or_else(|| dangling(&self.shifts, fact.shift_id))
                .or_else(|| dangling(&self.software, fact.software_id))
                .or_else(|| dangling(&self.statuses, fact.status_id));
            if let Some((dimension, id)) = unresolved {
                return Err(IntegrityError::DanglingForeignKey {
                    fact_id: fact.fact_id,
                    dimension,
                    id,
                });
            }
        }
        Ok(())
    }

    /// Number of fact rows
    #[must_use]
    pub fn len(&self) -> usize {
        self.facts.len()
    }

    /// Whether the fact table is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.facts.is_empty()
    }

    /// Production line name of a fact
    #[must_use]
    pub fn line_of(&self, fact: &FactRow) -> Option<&str> {
        self.lines.key_of(fact.line_id).map(String::as_str)
    }

    /// Shift name of a fact
    #[must_use]
    pub fn shift_of(&self, fact: &FactRow) -> Option<&str> {
        self.shifts.key_of(fact.shift_id).map(String::as_str)
    }

    /// Product × modification of a fact
    #[must_use]
    pub fn product_of(&self, fact: &FactRow) -> Option<&ProductKey> {
        self.products.key_of(fact.product_id)
    }

    /// Date of a fact
    #[must_use]
    pub fn date_of(&self, fact: &FactRow) -> Option<NaiveDate> {
        self.dates.key_of(fact.date_id).copied()
    }
}

fn sparse<K: NaturalKey>(dim: &DimensionTable<K>) -> Option<&'static str> {
    (!dim.has_dense_ids()).then_some(dim.name())
}

fn dangling<K: NaturalKey>(dim: &DimensionTable<K>, id: u32) -> Option<(&'static str, u32)> {
    dim.key_of(id).is_none().then_some((dim.name(), id))
}

fn product_key(record: &NormalizedRecord) -> ProductKey {
    (record.product.clone(), record.modification.clone())
}

fn software_key(record: &NormalizedRecord) -> SoftwareKey {
    (record.software_version.clone(), record.firmware_version.clone())
}

fn status_key(record: &NormalizedRecord) -> StatusKey {
    (record.status.clone(), record.error_code.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::Measures;

    fn record(day: u32, line: &str, product: &str, quantity: u64) -> NormalizedRecord {
        NormalizedRecord {
            date: NaiveDate::from_ymd_opt(2025, 1, day).unwrap(),
            company: "Acme".into(),
            product: product.into(),
            modification: "Std".into(),
            line: line.into(),
            shift: "Day".into(),
            order_number: Some(format!("ORD-{day}")),
            status: "OK".into(),
            error_code: "none".into(),
            software_version: "1.0".into(),
            firmware_version: "fw1".into(),
            measures: Measures::new(quantity, 1, 5.0, 20.0),
        }
    }

    #[test]
    fn one_fact_per_record_with_resolving_keys() {
        let records = vec![
            record(3, "B", "Valve", 50),
            record(1, "A", "Pump", 100),
            record(3, "A", "Pump", 70),
        ];
        let star = StarSchema::build(&records).unwrap();

        assert_eq!(star.len(), records.len());
        assert_eq!(star.dates.len(), 2);
        assert_eq!(star.lines.len(), 2);
        assert!(star.verify_integrity().is_ok());

        let ids: Vec<u32> = star.facts.iter().map(|f| f.fact_id).collect();
        assert_eq!(ids, [1, 2, 3]);

        let first = &star.facts[0];
        assert_eq!(star.line_of(first), Some("B"));
        assert_eq!(first.line_id, 2);
        assert_eq!(first.date_id, 2);
        assert_eq!(first.measures, records[0].measures);
        assert_eq!(first.order_number.as_deref(), Some("ORD-3"));
    }

    #[test]
    fn empty_input_builds_empty_schema() {
        let star = StarSchema::build(&[]).unwrap();
        assert!(star.is_empty());
        assert!(star.lines.is_empty());
    }

    #[test]
    fn detects_dangling_foreign_key() {
        let mut star = StarSchema::build(&[record(1, "A", "Pump", 10)]).unwrap();
        star.facts[0].line_id = 7;
        let err = star.verify_integrity().unwrap_err();
        assert_eq!(
            err,
            IntegrityError::DanglingForeignKey {
                fact_id: 1,
                dimension: "dim_line",
                id: 7
            }
        );
    }
}
