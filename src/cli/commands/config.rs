//! Config command handler

use crate::args::ConfigSubcommand;
use production_analytics::config::Config;
use production_analytics::logging::level_directive;
use std::io::{self, Write};

/// Keys accepted by `config get/set/unset`
const KEYS: [&str; 11] = [
    "level",
    "file",
    "verbose",
    "data_file",
    "exports_dir",
    "nominal_shift_hours",
    "scrap_warning_percent",
    "scrap_critical_percent",
    "availability_target_percent",
    "availability_critical_percent",
    "top_products",
];

/// Dispatch config subcommands
pub fn run(subcommand: Option<ConfigSubcommand>, config: &mut Config, defaults: &Config) {
    match subcommand {
        None => show_config(config, None),
        Some(ConfigSubcommand::Get { key }) => show_config(config, key.as_deref()),
        Some(ConfigSubcommand::Set { key, value }) => set_value(config, &key, &value),
        Some(ConfigSubcommand::Unset { key }) => unset_value(config, defaults, &key),
        Some(ConfigSubcommand::Reset) => reset_config(),
    }
}

fn show_config(config: &Config, key: Option<&str>) {
    let Some(key) = key else {
        println!("\n=== Configuration ===");
        println!("# {}\n", Config::get_config_file_path().display());
        print!("{config}");
        return;
    };

    match config.get(key) {
        Some(value) => println!("{value}"),
        None => {
            eprintln!("Unknown config key: '{key}'");
            eprintln!("Known keys: {}", KEYS.join(", "));
        }
    }
}

fn set_value(config: &mut Config, key: &str, value: &str) {
    // Store the canonical level name so the logging filter can read it back
    let value = if key == "level" {
        level_directive(value)
    } else {
        value
    };

    if let Err(e) = config.set(key, value) {
        eprintln!("✗ {e}");
        std::process::exit(1);
    }
    persist(config);
    println!("✓ Set {key} = {value}");
}

fn unset_value(config: &mut Config, defaults: &Config, key: &str) {
    if let Err(e) = config.unset(key, defaults) {
        eprintln!("✗ {e}");
        std::process::exit(1);
    }
    persist(config);
    println!(
        "✓ Reset {key} to default ({})",
        config.get(key).unwrap_or_default()
    );
}

fn persist(config: &Config) {
    if let Err(e) = config.save() {
        eprintln!("✗ Failed to save config: {e}");
        std::process::exit(1);
    }
}

fn reset_config() {
    if !Config::get_config_file_path().exists() {
        println!("✓ Config is already at defaults");
        return;
    }

    print!("Reset configuration to defaults? (y/n): ");
    io::stdout().flush().ok();

    let mut response = String::new();
    io::stdin().read_line(&mut response).ok();

    if matches!(response.trim().to_ascii_lowercase().as_str(), "y" | "yes") {
        if let Err(e) = Config::reset() {
            eprintln!("✗ Failed to remove config file: {e}");
            std::process::exit(1);
        }
        println!("✓ Config reset to defaults");
    } else {
        println!("✗ Reset cancelled");
    }
}
