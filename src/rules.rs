// Fixed rule tables applied during generation
//
// Adding a brand with a non-Android OS, or a new usage baseline, means adding
// a row here. The generation loop only does lookups.

use crate::types::OperatingSystem;

/// Display clamp for market share percentages
pub const SHARE_PCT_FLOOR: f64 = 0.5;
pub const SHARE_PCT_CEILING: f64 = 8.0;

/// Minimum average daily usage in hours
pub const USAGE_HOURS_FLOOR: f64 = 2.0;

pub const DEFAULT_USAGE_HOURS: f64 = 4.2;

struct OsRule {
    brand: &'static str,
    country: Option<&'static str>, // None matches every country
    os: OperatingSystem,
}

const OS_RULES: &[OsRule] = &[
    OsRule { brand: "Apple", country: None, os: OperatingSystem::Ios },
    OsRule { brand: "Huawei", country: Some("China"), os: OperatingSystem::HarmonyOS },
];

const USAGE_BASELINES: &[(&str, f64)] = &[
    ("Apple", 5.5),
    ("Samsung", 4.8),
    ("Xiaomi", 4.5),
];

/// First matching rule wins; everything else runs Android.
pub fn operating_system(brand: &str, country: &str) -> OperatingSystem {
    OS_RULES
        .iter()
        .find(|rule| rule.brand == brand && rule.country.map_or(true, |c| c == country))
        .map(|rule| rule.os)
        .unwrap_or(OperatingSystem::Android)
}

/// Baseline average daily usage for a brand, independent of country
pub fn base_usage_hours(brand: &str) -> f64 {
    USAGE_BASELINES
        .iter()
        .find(|(name, _)| *name == brand)
        .map(|&(_, hours)| hours)
        .unwrap_or(DEFAULT_USAGE_HOURS)
}

pub fn clamp_share_pct(raw_pct: f64) -> f64 {
    raw_pct.clamp(SHARE_PCT_FLOOR, SHARE_PCT_CEILING)
}

pub fn floor_usage_hours(hours: f64) -> f64 {
    hours.max(USAGE_HOURS_FLOOR)
}

pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
