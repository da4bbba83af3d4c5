//! Command-line interface entry point for `ProdAnalytics`

mod args;
mod commands;

use args::{Cli, Command};
use clap::Parser;
use production_analytics::config::Config;
use production_analytics::logging::{self, LogSettings};
use std::path::PathBuf;
use tracing::info;

fn main() {
    let args = Cli::parse();

    // Load configuration once at startup and apply CLI overrides to it
    let mut config = Config::load();
    let defaults = Config::from_defaults();
    config.apply_overrides(&args.to_config_overrides());

    // CLI flag overrides config; --debug wins over both
    let level = if args.debug_flag {
        "debug".to_string()
    } else {
        args.log_level
            .map_or_else(|| config.logging.level.clone(), |lvl| lvl.to_string())
    };

    let verbose = args.verbose || config.logging.verbose;

    // File logging: CLI flag wins, otherwise config logging.file if set
    let config_log_path = (!config.logging.file.is_empty())
        .then(|| PathBuf::from(&config.logging.file));
    let log_file = args.log_file.clone().or(config_log_path);

    let settings = LogSettings {
        level,
        file: log_file.clone(),
    };
    match logging::init(&settings) {
        Ok(()) => {
            if let Some(path) = &log_file {
                if verbose {
                    eprintln!("✓ File logging initialized at: {}", path.display());
                }
                info!(path = %path.display(), "file logging initialized");
            }
        }
        Err(e) => eprintln!("✗ Failed to initialize logging: {e}"),
    }

    match args.command {
        Command::Config { subcommand } => {
            commands::config::run(subcommand, &mut config, &defaults);
        }
        Command::Analyze { file, filters } => {
            let path = resolve_data_file(file, &config);
            commands::analyze::run(&path, &filters.to_filter(), &config, verbose);
        }
        Command::Export {
            file,
            output,
            filters,
        } => {
            let path = resolve_data_file(file, &config);
            let output_dir = output.unwrap_or_else(|| PathBuf::from(&config.paths.exports_dir));
            commands::export::run(&path, &output_dir, &filters.to_filter(), &config);
        }
    }
}

fn resolve_data_file(file: Option<PathBuf>, config: &Config) -> PathBuf {
    file.unwrap_or_else(|| PathBuf::from(&config.paths.data_file))
}
