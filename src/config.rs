// Configuration management for the market simulator

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::Level;

use crate::profiles::{default_profiles, validate_profiles, CountryProfile, ProfileError};

/// Upper bound on `lookback_days` and on the span covered by the periods
pub const MAX_SCHEDULE_DAYS: i64 = 365_000;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationConfig {
    #[serde(default = "default_periods")]
    pub periods: u32,
    #[serde(default = "default_period_days")]
    pub period_days: i64,
    #[serde(default = "default_lookback_days")]
    pub lookback_days: i64, // First period is dated this many days before as-of
    #[serde(default)]
    pub seed: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NoiseConfig {
    #[serde(default = "default_demand_std")]
    pub demand_std: f64, // Month-to-month user base fluctuation
    #[serde(default = "default_share_std")]
    pub share_std: f64, // Brand share drift
    #[serde(default = "default_usage_std")]
    pub usage_std: f64, // Daily usage variation
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Csv,
    Json,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default = "default_output_path")]
    pub path: String,
    #[serde(default = "default_format")]
    pub format: OutputFormat,
    #[serde(default = "default_preview_rows")]
    pub preview_rows: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_true")]
    pub log_generation_summary: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimConfig {
    #[serde(default)]
    pub generation: GenerationConfig,
    #[serde(default)]
    pub noise: NoiseConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default = "default_profiles")]
    pub profiles: Vec<CountryProfile>,
}

// Default value functions
fn default_periods() -> u32 { 13 }
fn default_period_days() -> i64 { 30 }
fn default_lookback_days() -> i64 { 365 }
fn default_demand_std() -> f64 { 0.02 }
fn default_share_std() -> f64 { 0.05 }
fn default_usage_std() -> f64 { 0.1 }
fn default_output_path() -> String { "sample_mobile_data.csv".to_string() }
fn default_format() -> OutputFormat { OutputFormat::Csv }
fn default_preview_rows() -> usize { 10 }
fn default_log_level() -> String { "info".to_string() }
fn default_true() -> bool { true }

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            periods: default_periods(),
            period_days: default_period_days(),
            lookback_days: default_lookback_days(),
            seed: None,
        }
    }
}

impl Default for NoiseConfig {
    fn default() -> Self {
        Self {
            demand_std: default_demand_std(),
            share_std: default_share_std(),
            usage_std: default_usage_std(),
        }
    }
}

impl GenerationConfig {
    /// Days between the first and the last period date
    pub fn span_days(&self) -> Option<i64> {
        self.period_days.checked_mul(i64::from(self.periods.saturating_sub(1)))
    }
}

impl NoiseConfig {
    pub fn std_devs(&self) -> [(&'static str, f64); 3] {
        [
            ("demand_std", self.demand_std),
            ("share_std", self.share_std),
            ("usage_std", self.usage_std),
        ]
    }
}

impl LoggingConfig {
    /// Parsed `level`; None when it is not a tracing level name
    pub fn max_level(&self) -> Option<Level> {
        self.level.parse().ok()
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            path: default_output_path(),
            format: default_format(),
            preview_rows: default_preview_rows(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            log_generation_summary: true,
        }
    }
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            generation: GenerationConfig::default(),
            noise: NoiseConfig::default(),
            output: OutputConfig::default(),
            logging: LoggingConfig::default(),
            profiles: default_profiles(),
        }
    }
}

impl SimConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)
            .map_err(|e| ConfigError::FileRead(e.to_string()))?;

        let config: SimConfig = toml::from_str(&content)
            .map_err(|e| ConfigError::Parse(e.to_string()))?;

        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a TOML file
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| ConfigError::Serialize(e.to_string()))?;

        fs::write(path, content)
            .map_err(|e| ConfigError::FileWrite(e.to_string()))?;

        Ok(())
    }

    /// Load configuration from file, or fall back to defaults if the file doesn't exist
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        if path.as_ref().exists() {
            Self::from_file(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load configuration or return a not-found error
    pub fn load_or_error<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path_ref = path.as_ref();
        if !path_ref.exists() {
            return Err(ConfigError::FileNotFound(path_ref.display().to_string()));
        }
        Self::from_file(path_ref)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.generation.periods == 0 {
            return Err(ConfigError::Validation("periods must be greater than 0".to_string()));
        }

        if self.generation.period_days <= 0 {
            return Err(ConfigError::Validation("period_days must be positive".to_string()));
        }

        if self.generation.lookback_days < 0 {
            return Err(ConfigError::Validation("lookback_days must be non-negative".to_string()));
        }

        if self.generation.lookback_days > MAX_SCHEDULE_DAYS {
            return Err(ConfigError::Validation(format!(
                "lookback_days must be at most {}",
                MAX_SCHEDULE_DAYS
            )));
        }

        match self.generation.span_days() {
            Some(span) if span <= MAX_SCHEDULE_DAYS => {}
            _ => {
                return Err(ConfigError::Validation(format!(
                    "periods × period_days must span at most {} days",
                    MAX_SCHEDULE_DAYS
                )));
            }
        }

        for (name, std) in self.noise.std_devs() {
            if !std.is_finite() || std < 0.0 {
                return Err(ConfigError::Validation(format!("{} must be a non-negative number", name)));
            }
        }

        if self.logging.max_level().is_none() {
            return Err(ConfigError::Validation(format!(
                "logging level '{}' must be one of trace, debug, info, warn, error",
                self.logging.level
            )));
        }

        if self.output.path.trim().is_empty() {
            return Err(ConfigError::Validation("output path must not be empty".to_string()));
        }

        validate_profiles(&self.profiles)?;

        Ok(())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Config file not found: {0}")]
    FileNotFound(String),

    #[error("Failed to read config file: {0}")]
    FileRead(String),

    #[error("Failed to write config file: {0}")]
    FileWrite(String),

    #[error("Failed to parse config: {0}")]
    Parse(String),

    #[error("Failed to serialize config: {0}")]
    Serialize(String),

    #[error("Configuration validation error: {0}")]
    Validation(String),

    #[error("Invalid profile table: {0}")]
    Profile(#[from] ProfileError),
}
