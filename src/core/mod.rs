//! Core analytics: validation, normalization, star schema, KPIs and comparison

pub mod analyzer;
pub mod cache;
pub mod config;
pub mod error;
pub mod filter;
pub mod kpi;
pub mod loader;
pub mod metrics_export;
pub mod models;
pub mod normalize;
pub mod pipeline;
pub mod schema;
pub mod session;
pub mod star;

/// Returns the current version of the `ProdAnalytics` crate
#[must_use]
pub const fn get_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
