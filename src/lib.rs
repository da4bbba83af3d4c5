//! Library for `ProdAnalytics`
//! Turns flat production event tables into a star schema and production KPIs

pub mod core;
pub mod logging;

pub use crate::core::config;
pub use crate::core::get_version;
