//! Error taxonomy for the analytics pipeline
//!
//! Schema problems and integrity violations are errors. Empty selections are
//! not: they are reported through [`Outcome::NoData`] so callers can tell a
//! data-shape problem apart from a filter that matched nothing.

use serde::Serialize;
use thiserror::Error;

/// Fatal problems with the shape of the input table.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    /// One or more required columns are absent, in required-column order
    #[error("missing required columns: {}", .0.join(", "))]
    MissingColumns(Vec<String>),
    /// A column name appears more than once in the header
    #[error("duplicate columns in header: {}", .0.join(", "))]
    DuplicateColumns(Vec<String>),
}

impl SchemaError {
    /// Names of the missing columns (empty for other variants)
    #[must_use]
    pub fn missing_columns(&self) -> &[String] {
        match self {
            Self::MissingColumns(cols) => cols,
            Self::DuplicateColumns(_) => &[],
        }
    }
}

/// Failures while reading a dataset from its source.
#[derive(Debug, Error)]
pub enum LoadError {
    /// The source file could not be opened or read
    #[error("failed to read {path}: {source}")]
    Io {
        /// Path that was being read
        path: String,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },
    /// The CSV content could not be parsed
    #[error("CSV parse failed: {0}")]
    Csv(#[from] csv::Error),
    /// The source has no header row
    #[error("dataset has no header row")]
    EmptySource,
}

/// Referential-integrity violations inside the star schema.
///
/// Dimensions are derived from the same rows the fact table is built from, so
/// any of these indicates a bug rather than bad input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IntegrityError {
    /// A natural key had no row in its dimension table
    #[error("natural key {key} not found in dimension {dimension}")]
    UnresolvedKey {
        /// Dimension name
        dimension: &'static str,
        /// Debug rendering of the natural key
        key: String,
    },
    /// A fact row references a surrogate ID that does not exist
    #[error("fact {fact_id} references missing {dimension} id {id}")]
    DanglingForeignKey {
        /// Fact primary key
        fact_id: u32,
        /// Dimension name
        dimension: &'static str,
        /// The unresolved surrogate ID
        id: u32,
    },
    /// Surrogate IDs of a dimension are not the dense range 1..=K
    #[error("dimension {0} does not have dense surrogate ids")]
    SparseIds(&'static str),
}

/// Errors that stop the pipeline for the current view.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PipelineError {
    /// Input table does not have the required shape
    #[error("schema error: {0}")]
    Schema(#[from] SchemaError),
    /// Star schema failed its integrity checks
    #[error("integrity error: {0}")]
    Integrity(#[from] IntegrityError),
}

/// Errors of a load-then-analyze session step.
#[derive(Debug, Error)]
pub enum SessionError {
    /// The dataset could not be loaded
    #[error(transparent)]
    Load(#[from] LoadError),
    /// The pipeline rejected the dataset
    #[error(transparent)]
    Pipeline(#[from] PipelineError),
}

/// Explicit result for computations that may have nothing to report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Outcome<T> {
    /// A computed value
    Ready(T),
    /// No rows (or no members) were available to compute from
    NoData,
}

impl<T> Outcome<T> {
    /// Whether this is the empty-state value
    #[must_use]
    pub const fn is_no_data(&self) -> bool {
        matches!(self, Self::NoData)
    }

    /// Borrow the computed value, if any
    #[must_use]
    pub const fn ready(&self) -> Option<&T> {
        match self {
            Self::Ready(value) => Some(value),
            Self::NoData => None,
        }
    }

    /// Consume into an `Option`
    #[must_use]
    pub fn into_ready(self) -> Option<T> {
        match self {
            Self::Ready(value) => Some(value),
            Self::NoData => None,
        }
    }

    /// Map the computed value
    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> Outcome<U> {
        match self {
            Self::Ready(value) => Outcome::Ready(f(value)),
            Self::NoData => Outcome::NoData,
        }
    }
}

impl<T> From<Option<T>> for Outcome<T> {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::NoData, Self::Ready)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_columns_message_lists_names() {
        let err = SchemaError::MissingColumns(vec!["Quantity".into(), "Shift".into()]);
        assert_eq!(err.to_string(), "missing required columns: Quantity, Shift");
        assert_eq!(err.missing_columns(), ["Quantity", "Shift"]);
    }

    #[test]
    fn outcome_converts_from_option() {
        let ready: Outcome<u8> = Some(3).into();
        let empty: Outcome<u8> = None.into();
        assert_eq!(ready.ready(), Some(&3));
        assert!(empty.is_no_data());
        assert_eq!(ready.map(|v| v * 2), Outcome::Ready(6));
    }
}
