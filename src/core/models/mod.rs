//! Data models for production analytics

pub mod record;
pub mod table;

pub use record::{Measures, NormalizedRecord};
pub use table::RawTable;
