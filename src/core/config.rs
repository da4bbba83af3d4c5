//! Configuration module for `ProdAnalytics`

use crate::core::analyzer::AlertThresholds;
use crate::core::kpi::KpiSettings;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::PathBuf;

/// Default CLI configuration loaded based on build profile.
/// Uses release defaults in release mode, debug defaults in debug mode.
#[cfg(not(debug_assertions))]
const CONFIG_DEFAULTS: &str = include_str!("../assets/DefaultCLIConfigRelease.toml");

#[cfg(debug_assertions)]
const CONFIG_DEFAULTS: &str = include_str!("../assets/DefaultCLIConfigDebug.toml");

#[cfg(not(debug_assertions))]
const CONFIG_FILE_NAME: &str = "config.toml";

#[cfg(debug_assertions)]
const CONFIG_FILE_NAME: &str = "dconfig.toml";

/// Variable expanded to the config directory inside path values
const DIR_VARIABLE: &str = "$PROD_ANALYTICS";

/// Logging configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace)
    #[serde(default)]
    pub level: String,
    /// Log file path
    #[serde(default)]
    pub file: String,
    /// Enable verbose output
    #[serde(default)]
    pub verbose: bool,
}

/// Paths configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PathsConfig {
    /// Dataset analyzed when no file is given on the command line
    #[serde(default)]
    pub data_file: String,
    /// Directory for exported CSV tables
    #[serde(default)]
    pub exports_dir: String,
}

/// KPI configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KpiConfig {
    /// Planned hours per record when operating hours are missing
    pub nominal_shift_hours: f64,
    /// Scrap rate (%) above which a warning is raised
    pub scrap_warning_percent: f64,
    /// Scrap rate (%) above which an alert is critical
    pub scrap_critical_percent: f64,
    /// Availability (%) below which a warning is raised
    pub availability_target_percent: f64,
    /// Availability (%) below which an alert is critical
    pub availability_critical_percent: f64,
    /// Number of products in the top ranking
    pub top_products: usize,
}

impl Default for KpiConfig {
    fn default() -> Self {
        let thresholds = AlertThresholds::default();
        Self {
            nominal_shift_hours: KpiSettings::default().nominal_shift_hours,
            scrap_warning_percent: thresholds.scrap_warning_percent,
            scrap_critical_percent: thresholds.scrap_critical_percent,
            availability_target_percent: thresholds.availability_target_percent,
            availability_critical_percent: thresholds.availability_critical_percent,
            top_products: 15,
        }
    }
}

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Logging settings
    pub logging: LoggingConfig,
    /// Path settings
    #[serde(default)]
    pub paths: PathsConfig,
    /// KPI settings
    #[serde(default)]
    pub kpi: KpiConfig,
}

/// Optional CLI overrides for configuration values
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    /// Override logging level
    pub level: Option<String>,
    /// Override log file path
    pub file: Option<String>,
    /// Override verbose flag
    pub verbose: Option<bool>,
    /// Override dataset path
    pub data_file: Option<String>,
    /// Override export directory
    pub exports_dir: Option<String>,
    /// Override nominal shift length
    pub nominal_shift_hours: Option<f64>,
}

impl Config {
    /// Get the `$PROD_ANALYTICS` directory path
    ///
    /// Returns:
    /// - Linux: `~/.config/prodanalytics`
    /// - macOS: `~/Library/Application Support/prodanalytics`
    /// - Windows: `%APPDATA%\prodanalytics`
    #[must_use]
    pub fn get_prodanalytics_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("prodanalytics")
    }

    /// Merge missing fields from defaults into this config
    ///
    /// Only string fields that are empty here and non-empty in `defaults` are
    /// filled; numeric KPI fields are already defaulted by serde.
    ///
    /// # Returns
    ///
    /// `true` if any fields were added/changed, `false` otherwise
    pub fn merge_defaults(&mut self, defaults: &Self) -> bool {
        let fields = [
            (&mut self.logging.level, &defaults.logging.level),
            (&mut self.logging.file, &defaults.logging.file),
            (&mut self.paths.data_file, &defaults.paths.data_file),
            (&mut self.paths.exports_dir, &defaults.paths.exports_dir),
        ];

        let mut changed = false;
        for (value, default) in fields {
            if value.is_empty() && !default.is_empty() {
                value.clone_from(default);
                changed = true;
            }
        }
        changed
    }

    /// Apply CLI-provided overrides onto the loaded configuration
    ///
    /// Only non-`None` values replace config values; the config file is not touched.
    pub fn apply_overrides(&mut self, overrides: &ConfigOverrides) {
        if let Some(level) = &overrides.level {
            self.logging.level.clone_from(level);
        }
        if let Some(file) = &overrides.file {
            self.logging.file.clone_from(file);
        }
        if let Some(verbose) = overrides.verbose {
            self.logging.verbose = verbose;
        }
        if let Some(data_file) = &overrides.data_file {
            self.paths.data_file.clone_from(data_file);
        }
        if let Some(exports_dir) = &overrides.exports_dir {
            self.paths.exports_dir.clone_from(exports_dir);
        }
        if let Some(hours) = overrides.nominal_shift_hours {
            self.kpi.nominal_shift_hours = hours;
        }
    }

    /// Get the user config file path
    ///
    /// `config.toml` for release builds, `dconfig.toml` for debug builds, inside
    /// [`get_prodanalytics_dir`](Self::get_prodanalytics_dir).
    #[must_use]
    pub fn get_config_file_path() -> PathBuf {
        Self::get_prodanalytics_dir().join(CONFIG_FILE_NAME)
    }

    /// Expand `$PROD_ANALYTICS` in a string to the config directory
    #[must_use]
    fn expand_variables(value: &str) -> String {
        if value.contains(DIR_VARIABLE) {
            let dir = Self::get_prodanalytics_dir();
            value.replace(DIR_VARIABLE, dir.to_str().unwrap_or("."))
        } else {
            value.to_string()
        }
    }

    /// Initialize config from a TOML string
    ///
    /// Expands `$PROD_ANALYTICS` in path values. Missing fields use their serde
    /// defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML cannot be parsed or doesn't match the expected schema
    pub fn from_toml(toml_str: &str) -> Result<Self, toml::de::Error> {
        let mut config: Self = toml::from_str(toml_str)?;

        config.logging.file = Self::expand_variables(&config.logging.file);
        config.paths.data_file = Self::expand_variables(&config.paths.data_file);
        config.paths.exports_dir = Self::expand_variables(&config.paths.exports_dir);

        Ok(config)
    }

    /// Load configuration from embedded defaults
    ///
    /// Debug builds use `DefaultCLIConfigDebug.toml`, release builds
    /// `DefaultCLIConfigRelease.toml`.
    #[must_use]
    pub fn from_defaults() -> Self {
        Self::from_toml(CONFIG_DEFAULTS).unwrap_or_default()
    }

    /// Load configuration from file, or create from defaults if not found
    ///
    /// - If the config file exists: loads it, merges missing fields from defaults
    ///   and saves the result when something was added
    /// - On first run: creates the config directory and writes the defaults
    ///
    /// Falls back to defaults if the file cannot be read or parsed.
    #[must_use]
    pub fn load() -> Self {
        let config_file = Self::get_config_file_path();
        let defaults = Self::from_defaults();

        if config_file.exists() {
            if let Ok(content) = fs::read_to_string(&config_file) {
                if let Ok(mut config) = Self::from_toml(&content) {
                    if config.merge_defaults(&defaults) {
                        let _ = config.save();
                    }
                    return config;
                }
            }
        } else {
            if let Some(parent) = config_file.parent() {
                let _ = fs::create_dir_all(parent);
            }
            let _ = defaults.save();
            return defaults;
        }

        defaults
    }

    /// Save configuration to file
    ///
    /// # Errors
    /// Returns an error if the config directory cannot be created or the file
    /// cannot be written
    pub fn save(&self) -> Result<(), Box<dyn std::error::Error>> {
        let config_file = Self::get_config_file_path();
        if let Some(parent) = config_file.parent() {
            fs::create_dir_all(parent)?;
        }
        let toml_str = toml::to_string_pretty(self)?;
        fs::write(&config_file, toml_str)?;
        Ok(())
    }

    /// Get a configuration value by key
    ///
    /// Supported keys: `level`, `file`, `verbose`, `data_file`, `exports_dir`,
    /// `nominal_shift_hours`, `scrap_warning_percent`, `scrap_critical_percent`,
    /// `availability_target_percent`, `availability_critical_percent`,
    /// `top_products`. Dashes may be used instead of underscores.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<String> {
        let value = match key.replace('-', "_").as_str() {
            "level" => self.logging.level.clone(),
            "file" => self.logging.file.clone(),
            "verbose" => self.logging.verbose.to_string(),
            "data_file" => self.paths.data_file.clone(),
            "exports_dir" => self.paths.exports_dir.clone(),
            "nominal_shift_hours" => self.kpi.nominal_shift_hours.to_string(),
            "scrap_warning_percent" => self.kpi.scrap_warning_percent.to_string(),
            "scrap_critical_percent" => self.kpi.scrap_critical_percent.to_string(),
            "availability_target_percent" => self.kpi.availability_target_percent.to_string(),
            "availability_critical_percent" => self.kpi.availability_critical_percent.to_string(),
            "top_products" => self.kpi.top_products.to_string(),
            _ => return None,
        };
        Some(value)
    }

    /// Set a configuration value by key
    ///
    /// Numeric KPI values must parse and be non-negative. Call
    /// [`save()`](Config::save) to persist changes.
    ///
    /// # Errors
    /// Returns an error if the key is not recognized or the value cannot be parsed
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), String> {
        fn percent(key: &str, value: &str) -> Result<f64, String> {
            value
                .parse::<f64>()
                .ok()
                .filter(|v| v.is_finite() && *v >= 0.0)
                .ok_or_else(|| format!("Invalid number for '{key}': '{value}'"))
        }

        match key.replace('-', "_").as_str() {
            "level" => self.logging.level = value.to_string(),
            "file" => self.logging.file = value.to_string(),
            "verbose" => {
                self.logging.verbose = value
                    .parse::<bool>()
                    .map_err(|_| format!("Invalid boolean value for 'verbose': '{value}'"))?;
            }
            "data_file" => self.paths.data_file = value.to_string(),
            "exports_dir" => self.paths.exports_dir = value.to_string(),
            "nominal_shift_hours" => self.kpi.nominal_shift_hours = percent(key, value)?,
            "scrap_warning_percent" => self.kpi.scrap_warning_percent = percent(key, value)?,
            "scrap_critical_percent" => self.kpi.scrap_critical_percent = percent(key, value)?,
            "availability_target_percent" => {
                self.kpi.availability_target_percent = percent(key, value)?;
            }
            "availability_critical_percent" => {
                self.kpi.availability_critical_percent = percent(key, value)?;
            }
            "top_products" => {
                self.kpi.top_products = value
                    .parse::<usize>()
                    .map_err(|_| format!("Invalid count for 'top_products': '{value}'"))?;
            }
            _ => return Err(format!("Unknown config key: '{key}'")),
        }
        Ok(())
    }

    /// Unset a configuration value by key (reset to its default)
    ///
    /// # Errors
    /// Returns an error if the key is not recognized.
    pub fn unset(&mut self, key: &str, defaults: &Self) -> Result<(), String> {
        let default = defaults
            .get(key)
            .ok_or_else(|| format!("Unknown config key: '{key}'"))?;
        self.set(key, &default)
    }

    /// Reset all configuration to defaults
    ///
    /// Deletes the configuration file so the next [`load()`](Config::load)
    /// recreates it. Succeeds if the file does not exist.
    ///
    /// # Errors
    /// Returns an error if the config file exists but cannot be deleted
    pub fn reset() -> Result<(), std::io::Error> {
        let config_file = Self::get_config_file_path();
        if config_file.exists() {
            fs::remove_file(config_file)?;
        }
        Ok(())
    }

    /// KPI engine settings from the `[kpi]` section
    #[must_use]
    pub const fn kpi_settings(&self) -> KpiSettings {
        KpiSettings {
            nominal_shift_hours: self.kpi.nominal_shift_hours,
        }
    }

    /// Alert thresholds from the `[kpi]` section
    #[must_use]
    pub const fn alert_thresholds(&self) -> AlertThresholds {
        AlertThresholds {
            scrap_warning_percent: self.kpi.scrap_warning_percent,
            scrap_critical_percent: self.kpi.scrap_critical_percent,
            availability_target_percent: self.kpi.availability_target_percent,
            availability_critical_percent: self.kpi.availability_critical_percent,
        }
    }
}

impl fmt::Display for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "[logging]")?;
        writeln!(f, "  level = \"{}\"", self.logging.level)?;
        writeln!(f, "  file = \"{}\"", self.logging.file)?;
        writeln!(f, "  verbose = {}", self.logging.verbose)?;

        writeln!(f, "\n[paths]")?;
        writeln!(f, "  data_file = \"{}\"", self.paths.data_file)?;
        writeln!(f, "  exports_dir = \"{}\"", self.paths.exports_dir)?;

        writeln!(f, "\n[kpi]")?;
        writeln!(f, "  nominal_shift_hours = {}", self.kpi.nominal_shift_hours)?;
        writeln!(f, "  scrap_warning_percent = {}", self.kpi.scrap_warning_percent)?;
        writeln!(f, "  scrap_critical_percent = {}", self.kpi.scrap_critical_percent)?;
        writeln!(
            f,
            "  availability_target_percent = {}",
            self.kpi.availability_target_percent
        )?;
        writeln!(
            f,
            "  availability_critical_percent = {}",
            self.kpi.availability_critical_percent
        )?;
        writeln!(f, "  top_products = {}", self.kpi.top_products)?;

        Ok(())
    }
}
