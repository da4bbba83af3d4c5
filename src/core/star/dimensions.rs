//! Dimension tables with dense surrogate IDs

use crate::core::models::RawTable;
use chrono::{Datelike, NaiveDate};
use std::collections::BTreeSet;
use std::fmt::Debug;

/// A natural key that can be rendered as dimension columns.
pub trait NaturalKey: Ord + Clone + Debug {
    /// Cell values in the order of the dimension's key columns
    fn cells(&self) -> Vec<String>;
}

impl NaturalKey for String {
    fn cells(&self) -> Vec<String> {
        vec![self.clone()]
    }
}

impl NaturalKey for (String, String) {
    fn cells(&self) -> Vec<String> {
        vec![self.0.clone(), self.1.clone()]
    }
}

/// Dates carry their derived calendar parts as extra columns.
impl NaturalKey for NaiveDate {
    fn cells(&self) -> Vec<String> {
        vec![
            self.format("%Y-%m-%d").to_string(),
            self.year().to_string(),
            self.month().to_string(),
            self.day().to_string(),
        ]
    }
}

/// Distinct natural keys of one dimension, each with a surrogate ID.
///
/// Keys are stored in ascending order and the ID of a key is its position
/// plus one, so IDs are always the dense range `1..=len` and the same input
/// always yields the same assignment regardless of row order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DimensionTable<K> {
    name: &'static str,
    key_columns: &'static [&'static str],
    keys: Vec<K>,
}

impl<K: NaturalKey> DimensionTable<K> {
    /// Collect the distinct keys and assign IDs in sorted order
    pub fn build<I>(name: &'static str, key_columns: &'static [&'static str], keys: I) -> Self
    where
        I: IntoIterator<Item = K>,
    {
        let keys: BTreeSet<K> = keys.into_iter().collect();
        Self {
            name,
            key_columns,
            keys: keys.into_iter().collect(),
        }
    }

    /// Table name
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// Names of the natural-key columns
    #[must_use]
    pub const fn key_columns(&self) -> &'static [&'static str] {
        self.key_columns
    }

    /// Number of rows
    #[must_use]
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Whether the dimension is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Surrogate ID of a natural key
    #[must_use]
    pub fn id_of(&self, key: &K) -> Option<u32> {
        self.keys
            .binary_search(key)
            .ok()
            .and_then(|idx| u32::try_from(idx + 1).ok())
    }

    /// Natural key behind a surrogate ID
    #[must_use]
    pub fn key_of(&self, id: u32) -> Option<&K> {
        let idx = usize::try_from(id).ok()?.checked_sub(1)?;
        self.keys.get(idx)
    }

    /// Rows as `(surrogate_id, natural_key)` in ID order
    pub fn iter(&self) -> impl Iterator<Item = (u32, &K)> + '_ {
        (1u32..).zip(self.keys.iter())
    }

    /// Whether the keys are strictly ascending, which makes IDs unique and dense
    #[must_use]
    pub fn has_dense_ids(&self) -> bool {
        self.keys.windows(2).all(|pair| pair[0] < pair[1])
    }

    /// Render as a table: `{name}_id` followed by the key columns
    #[must_use]
    pub fn to_table(&self) -> RawTable {
        let mut header = vec![format!("{}_id", self.name.trim_start_matches("dim_"))];
        header.extend(self.key_columns.iter().map(ToString::to_string));

        let mut table = RawTable::new(header);
        for (id, key) in self.iter() {
            let mut row = vec![id.to_string()];
            row.extend(key.cells());
            table.push_row(row);
        }
        table
    }
}
