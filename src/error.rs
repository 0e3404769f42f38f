//! Unified error handling for the market simulator
//!
//! A single error type for the library and CLI, with context-rich messages
//! for the cases a user can actually fix.

use std::fmt;
use std::io;

use crate::config::ConfigError;
use crate::profiles::ProfileError;

/// Main error type for the market simulator
#[derive(Debug)]
pub enum SimError {
    // Configuration errors
    ConfigNotFound(String),
    ConfigParse(String),
    ConfigValidation(String),
    InvalidParameter(String, String), // (parameter_name, reason)

    // Profile table errors
    InvalidProfile(String),

    // Data errors
    DataFrame(String),
    Serialization(String),
    InvalidDate(String),
    ValidationFailed(String),

    // IO errors
    FileNotFound(String),
    FileRead(String),
    FileWrite(String),

    // General errors
    Internal(String),
}

impl SimError {
    /// Get a user-friendly error message with helpful context
    pub fn user_message(&self) -> String {
        match self {
            SimError::ConfigNotFound(path) => {
                format!(
                    "Configuration file not found: {}\n\n\
                    💡 Quick fix:\n\
                    1. Run: market-sim init\n\
                    2. Edit market-sim.toml if you need custom profiles\n\
                    3. Try again",
                    path
                )
            }
            SimError::InvalidProfile(msg) => {
                format!(
                    "Country profile table is malformed: {}\n\n\
                    💡 Check [[profiles]] in your config for:\n\
                    - Unique country names\n\
                    - Positive base_users\n\
                    - At least one brand share, each between 0 and 1",
                    msg
                )
            }
            SimError::FileNotFound(path) => {
                format!(
                    "File not found: {}\n\n\
                    💡 Run: market-sim generate\n\
                    to produce sample_mobile_data.csv",
                    path
                )
            }
            _ => self.to_string(),
        }
    }

    /// Get error category for logging
    pub fn category(&self) -> &'static str {
        match self {
            SimError::ConfigNotFound(_)
            | SimError::ConfigParse(_)
            | SimError::ConfigValidation(_)
            | SimError::InvalidParameter(_, _) => "config",

            SimError::InvalidProfile(_) => "profile",

            SimError::DataFrame(_)
            | SimError::Serialization(_)
            | SimError::InvalidDate(_)
            | SimError::ValidationFailed(_) => "data",

            SimError::FileNotFound(_) | SimError::FileRead(_) | SimError::FileWrite(_) => "io",

            SimError::Internal(_) => "internal",
        }
    }
}

impl fmt::Display for SimError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SimError::ConfigNotFound(path) => {
                write!(f, "Configuration file not found: {}", path)
            }
            SimError::ConfigParse(msg) => {
                write!(f, "Configuration parse error: {}", msg)
            }
            SimError::ConfigValidation(msg) => {
                write!(f, "Configuration validation error: {}", msg)
            }

            SimError::InvalidProfile(msg) => {
                write!(f, "Invalid country profile: {}", msg)
            }
            SimError::InvalidParameter(param, reason) => {
                write!(f, "Invalid parameter '{}': {}", param, reason)
            }

            SimError::DataFrame(msg) => {
                write!(f, "Data frame error: {}", msg)
            }
            SimError::Serialization(msg) => {
                write!(f, "Serialization error: {}", msg)
            }
            SimError::InvalidDate(msg) => {
                write!(f, "Invalid date: {}", msg)
            }
            SimError::ValidationFailed(msg) => {
                write!(f, "Validation failed: {}", msg)
            }

            SimError::FileNotFound(path) => {
                write!(f, "File not found: {}", path)
            }
            SimError::FileRead(msg) => {
                write!(f, "File read error: {}", msg)
            }
            SimError::FileWrite(msg) => {
                write!(f, "File write error: {}", msg)
            }

            SimError::Internal(msg) => {
                write!(f, "Internal error: {}", msg)
            }
        }
    }
}

impl std::error::Error for SimError {}

// Conversion implementations for common error types

impl From<io::Error> for SimError {
    fn from(err: io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::NotFound => SimError::FileNotFound(err.to_string()),
            io::ErrorKind::PermissionDenied => SimError::FileRead(err.to_string()),
            _ => SimError::Internal(format!("IO error: {}", err)),
        }
    }
}

impl From<polars::prelude::PolarsError> for SimError {
    fn from(err: polars::prelude::PolarsError) -> Self {
        SimError::DataFrame(err.to_string())
    }
}

impl From<serde_json::Error> for SimError {
    fn from(err: serde_json::Error) -> Self {
        SimError::Serialization(format!("JSON error: {}", err))
    }
}

impl From<toml::de::Error> for SimError {
    fn from(err: toml::de::Error) -> Self {
        SimError::ConfigParse(format!("TOML parse error: {}", err))
    }
}

impl From<chrono::ParseError> for SimError {
    fn from(err: chrono::ParseError) -> Self {
        SimError::InvalidDate(err.to_string())
    }
}

impl From<ConfigError> for SimError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::FileNotFound(path) => SimError::ConfigNotFound(path),
            ConfigError::FileRead(msg) => SimError::FileRead(msg),
            ConfigError::FileWrite(msg) => SimError::FileWrite(msg),
            ConfigError::Parse(msg) => SimError::ConfigParse(msg),
            ConfigError::Serialize(msg) => SimError::Serialization(msg),
            ConfigError::Validation(msg) => SimError::ConfigValidation(msg),
            ConfigError::Profile(err) => SimError::InvalidProfile(err.to_string()),
        }
    }
}

impl From<ProfileError> for SimError {
    fn from(err: ProfileError) -> Self {
        SimError::InvalidProfile(err.to_string())
    }
}

impl From<rand_distr::NormalError> for SimError {
    fn from(err: rand_distr::NormalError) -> Self {
        SimError::InvalidParameter("noise".to_string(), err.to_string())
    }
}

/// Result type alias using SimError
pub type SimResult<T> = Result<T, SimError>;
