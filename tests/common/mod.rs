// Common test utilities and helpers
#![allow(dead_code)]

use chrono::NaiveDate;
use mobile_market_sim::{MarketSimulator, ObservationRecord};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::path::PathBuf;
use tempfile::TempDir;

/// Fixed reference date so dates are reproducible across runs
pub fn test_as_of() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 1, 31).expect("valid date")
}

pub fn seeded_rng(seed: u64) -> StdRng {
    StdRng::seed_from_u64(seed)
}

/// One full dataset from the built-in profile table
pub fn generate_records(seed: u64) -> Vec<ObservationRecord> {
    let simulator = MarketSimulator::with_default_profiles().expect("default profiles are valid");
    simulator
        .generate_as_of(test_as_of(), &mut seeded_rng(seed))
        .expect("default schedule stays in calendar range")
}

/// Create a temporary directory and a file path inside it
pub fn create_temp_file(name: &str) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let path = temp_dir.path().join(name);
    (temp_dir, path)
}

/// Field-by-field comparison, tolerant of float text round-trips
pub fn assert_same_records(actual: &[ObservationRecord], expected: &[ObservationRecord]) {
    assert_eq!(actual.len(), expected.len());
    for (a, b) in actual.iter().zip(expected) {
        assert_eq!(a.country, b.country);
        assert_eq!(a.date, b.date);
        assert_eq!(a.brand, b.brand);
        assert_eq!(a.os, b.os);
        assert!((a.market_share_pct - b.market_share_pct).abs() < 1e-9);
        assert!((a.users_millions - b.users_millions).abs() < 1e-9);
        assert!((a.usage_hours - b.usage_hours).abs() < 1e-9);
    }
}
