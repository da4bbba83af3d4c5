//! CLI command handlers for `ProdAnalytics`.
//!
//! Each subcommand is implemented in its own submodule.

pub mod analyze;
pub mod config;
pub mod export;
