//! Configuration of the classifier and compiler.
//!
//! Settings are read from `~/.config/airsync/config.toml` (or
//! `$XDG_CONFIG_HOME/airsync/config.toml`); the `AIRSYNC_CONFIG` environment
//! variable overrides the path. A missing file yields the defaults.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::Weekday;
use directories::BaseDirs;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Current config file version. Increment when making breaking changes to schema.
const CONFIG_VERSION: u32 = 1;

/// Environment variable overriding the config file path.
pub const CONFIG_ENV: &str = "AIRSYNC_CONFIG";

/// Default limit on filter group nesting.
pub const DEFAULT_MAX_DEPTH: usize = 32;

/// Commented config file, equivalent to the defaults.
pub const DEFAULT_CONFIG: &str = r#"# airsync filter configuration

# Config schema version (do not modify)
version = 1

[compiler]
# max_depth = 32            # Maximum nesting of filter groups
# week_starts_on = "Mon"    # First day of "calendarWeek" date filters

[classifier]
# name_suffix = "Name"      # Label of user sub-properties, as in "Owner (Name)"
# value_suffix = "Value"    # Label of barcode sub-properties, as in "SKU (Value)"
"#;

/// Errors that can occur while loading the configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// No home directory to look for the config in.
    #[error("could not determine config directory")]
    NoConfigDir,

    /// The config file exists but could not be read.
    #[error("failed to read config {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The config file is not valid TOML for [`FilterConfig`].
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Result type for configuration loading.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Configuration file structure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterConfig {
    /// Config schema version for migrations.
    #[serde(default = "default_version")]
    pub version: u32,

    #[serde(default)]
    pub compiler: CompilerConfig,

    #[serde(default)]
    pub classifier: ClassifierConfig,
}

fn default_version() -> u32 {
    CONFIG_VERSION
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            compiler: CompilerConfig::default(),
            classifier: ClassifierConfig::default(),
        }
    }
}

impl FilterConfig {
    /// Parses a config from TOML.
    pub fn from_toml_str(content: &str) -> ConfigResult<Self> {
        let config: FilterConfig = toml::from_str(content)?;
        Ok(migrate_config(config))
    }
}

/// Formula compiler settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompilerConfig {
    /// Maximum nesting of filter groups, expanded multi-value operators included.
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,

    /// First day of the week for `calendarWeek` filters.
    #[serde(default = "default_week_start")]
    pub week_starts_on: Weekday,
}

fn default_max_depth() -> usize {
    DEFAULT_MAX_DEPTH
}

fn default_week_start() -> Weekday {
    Weekday::Mon
}

impl Default for CompilerConfig {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            week_starts_on: Weekday::Mon,
        }
    }
}

/// Field classifier settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassifierConfig {
    /// Suffix label of user sub-property fields.
    #[serde(default = "default_name_suffix")]
    pub name_suffix: String,

    /// Suffix label of barcode sub-property fields.
    #[serde(default = "default_value_suffix")]
    pub value_suffix: String,
}

fn default_name_suffix() -> String {
    "Name".to_string()
}

fn default_value_suffix() -> String {
    "Value".to_string()
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            name_suffix: default_name_suffix(),
            value_suffix: default_value_suffix(),
        }
    }
}

/// Gets the config file path.
pub fn config_path() -> ConfigResult<PathBuf> {
    if let Ok(path) = env::var(CONFIG_ENV) {
        return Ok(PathBuf::from(path));
    }

    if let Ok(xdg_config) = env::var("XDG_CONFIG_HOME") {
        return Ok(PathBuf::from(xdg_config).join("airsync").join("config.toml"));
    }

    BaseDirs::new()
        .map(|dirs| dirs.home_dir().join(".config").join("airsync").join("config.toml"))
        .ok_or(ConfigError::NoConfigDir)
}

/// Loads the configuration from the default location.
pub fn load_config() -> ConfigResult<FilterConfig> {
    load_config_from(&config_path()?)
}

/// Loads the configuration from `path`; a missing file yields the defaults.
pub fn load_config_from(path: &Path) -> ConfigResult<FilterConfig> {
    if !path.exists() {
        return Ok(FilterConfig::default());
    }

    let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    FilterConfig::from_toml_str(&content)
}

/// Migrates config to current version if needed.
fn migrate_config(mut config: FilterConfig) -> FilterConfig {
    // Version 1 is the initial schema; later versions migrate here.
    config.version = CONFIG_VERSION;
    config
}
