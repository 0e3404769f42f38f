// Common types used across the application

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum OperatingSystem {
    #[serde(rename = "iOS")]
    Ios,
    Android,
    HarmonyOS,
}

impl OperatingSystem {
    pub fn label(&self) -> &'static str {
        match self {
            OperatingSystem::Ios => "iOS",
            OperatingSystem::Android => "Android",
            OperatingSystem::HarmonyOS => "HarmonyOS",
        }
    }
}

impl fmt::Display for OperatingSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.label())
    }
}

impl FromStr for OperatingSystem {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "iOS" => Ok(OperatingSystem::Ios),
            "Android" => Ok(OperatingSystem::Android),
            "HarmonyOS" => Ok(OperatingSystem::HarmonyOS),
            other => Err(format!("unknown operating system: {}", other)),
        }
    }
}

/// One country × period × brand observation.
///
/// Serialized field names match the tabular column headers so CSV and JSON
/// exports share one contract.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObservationRecord {
    #[serde(rename = "Country")]
    pub country: String,
    #[serde(rename = "Date")]
    pub date: NaiveDate,
    #[serde(rename = "Brand")]
    pub brand: String,
    #[serde(rename = "OS")]
    pub os: OperatingSystem,
    #[serde(rename = "Market_Share")]
    pub market_share_pct: f64,
    #[serde(rename = "Users_Millions")]
    pub users_millions: f64,
    #[serde(rename = "Usage_Hours")]
    pub usage_hours: f64,
}

// Column headers of the record table
pub const COLUMN_COUNTRY: &str = "Country";
pub const COLUMN_DATE: &str = "Date";
pub const COLUMN_BRAND: &str = "Brand";
pub const COLUMN_OS: &str = "OS";
pub const COLUMN_MARKET_SHARE: &str = "Market_Share";
pub const COLUMN_USERS: &str = "Users_Millions";
pub const COLUMN_USAGE: &str = "Usage_Hours";

pub const REQUIRED_COLUMNS: [&str; 7] = [
    COLUMN_COUNTRY,
    COLUMN_DATE,
    COLUMN_BRAND,
    COLUMN_OS,
    COLUMN_MARKET_SHARE,
    COLUMN_USERS,
    COLUMN_USAGE,
];

pub const DATE_FORMAT: &str = "%Y-%m-%d";
