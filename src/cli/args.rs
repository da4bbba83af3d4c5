//! CLI argument definitions for `ProdAnalytics`

use chrono::NaiveDate;
use clap::{builder::BoolishValueParser, Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use production_analytics::config::ConfigOverrides;
use production_analytics::core::filter::FilterSpec;

/// CLI log level argument
///
/// Converts to a lowercase level name for config storage and for the
/// `tracing` filter.
#[derive(Copy, Clone, Debug, ValueEnum, PartialEq, Eq)]
pub enum LogLevelArg {
    /// Error-level logging
    Error,
    /// Warning-level logging
    Warn,
    /// Info-level logging
    Info,
    /// Debug-level logging
    Debug,
    /// Trace-level logging
    Trace,
}

impl std::fmt::Display for LogLevelArg {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let as_str = match self {
            Self::Error => "error",
            Self::Warn => "warn",
            Self::Info => "info",
            Self::Debug => "debug",
            Self::Trace => "trace",
        };
        write!(f, "{as_str}")
    }
}

#[derive(Debug, Subcommand)]
pub enum ConfigSubcommand {
    /// Display configuration values.
    ///
    /// If a KEY is provided, displays only that configuration value.
    /// If no KEY is provided, displays all configuration values.
    Get {
        /// Optional configuration key (e.g., `level`, `data_file`, `scrap_warning_percent`)
        #[arg(value_name = "KEY")]
        key: Option<String>,
    },
    /// Set a configuration value.
    Set {
        /// Configuration key to set
        #[arg(value_name = "KEY")]
        key: String,
        /// Value to set
        #[arg(value_name = "VALUE")]
        value: String,
    },
    /// Unset a configuration value.
    Unset {
        /// Configuration key to unset
        #[arg(value_name = "KEY")]
        key: String,
    },
    /// Reset configuration to defaults (requires confirmation).
    Reset,
}

fn parse_date_arg(value: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|_| format!("expected a date as YYYY-MM-DD, got '{value}'"))
}

/// Row filters shared by the analysis commands
#[derive(Debug, Clone, Default, Args)]
pub struct FilterArgs {
    /// First day to include (YYYY-MM-DD)
    #[arg(long, value_name = "DATE", value_parser = parse_date_arg)]
    pub from: Option<NaiveDate>,

    /// Last day to include (YYYY-MM-DD)
    #[arg(long, value_name = "DATE", value_parser = parse_date_arg)]
    pub to: Option<NaiveDate>,

    /// Restrict to production lines (repeatable)
    #[arg(long = "line", value_name = "LINE")]
    pub lines: Vec<String>,

    /// Restrict to shifts (repeatable)
    #[arg(long = "shift", value_name = "SHIFT")]
    pub shifts: Vec<String>,

    /// Restrict to products (repeatable)
    #[arg(long = "product", value_name = "PRODUCT")]
    pub products: Vec<String>,
}

impl FilterArgs {
    /// Build the filter for the pipeline; empty lists mean "all"
    pub fn to_filter(&self) -> FilterSpec {
        FilterSpec::all()
            .with_dates(self.from, self.to)
            .with_lines(&self.lines)
            .with_shifts(&self.shifts)
            .with_products(&self.products)
    }
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Manage configuration.
    ///
    /// If no subcommand is provided, displays all configuration values.
    Config {
        #[command(subcommand)]
        subcommand: Option<ConfigSubcommand>,
    },
    /// Analyze a production dataset.
    ///
    /// Prints KPIs overall and per line, shift, product and period, plus
    /// line comparison, alerts and improvement potential.
    Analyze {
        /// Production CSV file (defaults to config `data_file`)
        #[arg(value_name = "FILE")]
        file: Option<PathBuf>,

        #[command(flatten)]
        filters: FilterArgs,
    },
    /// Export the star schema and KPI tables as CSV files.
    Export {
        /// Production CSV file (defaults to config `data_file`)
        #[arg(value_name = "FILE")]
        file: Option<PathBuf>,

        /// Output directory (defaults to config `exports_dir`)
        #[arg(short, long, value_name = "DIR")]
        output: Option<PathBuf>,

        #[command(flatten)]
        filters: FilterArgs,
    },
}

#[derive(Parser, Debug)]
#[command(
    name = "prodanalytics",
    about = "Production analytics command-line interface",
    version = env!("CARGO_PKG_VERSION")
)]
pub struct Cli {
    /// Set the runtime log level. Falls back to config if omitted.
    #[arg(long, value_enum)]
    pub log_level: Option<LogLevelArg>,

    /// Enable verbose output (runtime only)
    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,

    /// Enable debug-level logging (shorthand)
    #[arg(long = "debug")]
    pub debug_flag: bool,

    /// Write runtime logs to a file
    #[arg(long, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    // --- Config overrides ---
    /// Override config logging level
    #[arg(long = "config-level", value_enum)]
    pub config_level: Option<LogLevelArg>,

    /// Override config log file path
    #[arg(long = "config-log-file", value_name = "PATH")]
    pub config_log_file: Option<PathBuf>,

    /// Override config verbose flag (true/false)
    #[arg(long = "config-verbose", value_parser = BoolishValueParser::new())]
    pub config_verbose: Option<bool>,

    /// Override config dataset path
    #[arg(long = "data-file", value_name = "FILE")]
    pub data_file: Option<PathBuf>,

    /// Override config export directory
    #[arg(long = "exports-dir", value_name = "DIR")]
    pub exports_dir: Option<PathBuf>,

    /// Override planned hours per record used for estimated availability
    #[arg(long = "shift-hours", value_name = "HOURS")]
    pub shift_hours: Option<f64>,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    /// Convert CLI flags into config overrides
    ///
    /// `None` means no override; the config file itself is never touched.
    pub fn to_config_overrides(&self) -> ConfigOverrides {
        let path = |p: &PathBuf| p.to_string_lossy().to_string();
        ConfigOverrides {
            level: self.config_level.map(|lvl| lvl.to_string()),
            file: self.config_log_file.as_ref().map(path),
            verbose: self.config_verbose,
            data_file: self.data_file.as_ref().map(path),
            exports_dir: self.exports_dir.as_ref().map(path),
            nominal_shift_hours: self.shift_hours.filter(|h| h.is_finite() && *h > 0.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cli(command: Command) -> Cli {
        Cli {
            log_level: None,
            verbose: false,
            debug_flag: false,
            log_file: None,
            config_level: None,
            config_log_file: None,
            config_verbose: None,
            data_file: None,
            exports_dir: None,
            shift_hours: None,
            command,
        }
    }

    #[test]
    fn test_log_level_display() {
        assert_eq!(LogLevelArg::Error.to_string(), "error");
        assert_eq!(LogLevelArg::Warn.to_string(), "warn");
        assert_eq!(LogLevelArg::Info.to_string(), "info");
        assert_eq!(LogLevelArg::Debug.to_string(), "debug");
        assert_eq!(LogLevelArg::Trace.to_string(), "trace");
    }

    #[test]
    fn test_to_config_overrides_empty() {
        let overrides = cli(Command::Config { subcommand: None }).to_config_overrides();
        assert!(overrides.level.is_none());
        assert!(overrides.file.is_none());
        assert!(overrides.verbose.is_none());
        assert!(overrides.data_file.is_none());
        assert!(overrides.exports_dir.is_none());
        assert!(overrides.nominal_shift_hours.is_none());
    }

    #[test]
    fn test_to_config_overrides_with_values() {
        let mut args = cli(Command::Config { subcommand: None });
        args.config_level = Some(LogLevelArg::Debug);
        args.config_log_file = Some(PathBuf::from("/tmp/test.log"));
        args.config_verbose = Some(true);
        args.data_file = Some(PathBuf::from("/data/prod.csv"));
        args.exports_dir = Some(PathBuf::from("/out"));
        args.shift_hours = Some(12.0);

        let overrides = args.to_config_overrides();
        assert_eq!(overrides.level.as_deref(), Some("debug"));
        assert_eq!(overrides.file.as_deref(), Some("/tmp/test.log"));
        assert_eq!(overrides.verbose, Some(true));
        assert_eq!(overrides.data_file.as_deref(), Some("/data/prod.csv"));
        assert_eq!(overrides.exports_dir.as_deref(), Some("/out"));
        assert_eq!(overrides.nominal_shift_hours, Some(12.0));
    }

    #[test]
    fn test_non_positive_shift_hours_ignored() {
        let mut args = cli(Command::Config { subcommand: None });
        args.shift_hours = Some(0.0);
        assert!(args.to_config_overrides().nominal_shift_hours.is_none());
    }

    #[test]
    fn test_parse_analyze_filters() {
        let args = Cli::try_parse_from([
            "prodanalytics",
            "analyze",
            "data.csv",
            "--from",
            "2024-01-01",
            "--line",
            "L1",
            "--line",
            "L2",
            "--shift",
            "Früh",
        ])
        .unwrap();

        let Command::Analyze { file, filters } = args.command else {
            panic!("expected analyze");
        };
        assert_eq!(file, Some(PathBuf::from("data.csv")));
        assert_eq!(filters.from, NaiveDate::from_ymd_opt(2024, 1, 1));
        assert_eq!(filters.lines, ["L1", "L2"]);

        let filter = filters.to_filter();
        assert!(!filter.is_unrestricted());
        assert_eq!(filter.lines.len(), 2);
        assert!(filter.shifts.contains("Früh"));
    }

    #[test]
    fn test_invalid_date_rejected() {
        let parsed = Cli::try_parse_from(["prodanalytics", "analyze", "--to", "31.12.2024"]);
        assert!(parsed.is_err());
    }
}
