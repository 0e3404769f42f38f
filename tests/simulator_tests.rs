// Statistical and structural properties of generated market data

mod common;

use chrono::{Duration, NaiveDate};
use common::{generate_records, seeded_rng, test_as_of};
use mobile_market_sim::rules::{SHARE_PCT_CEILING, SHARE_PCT_FLOOR, USAGE_HOURS_FLOOR};
use mobile_market_sim::simulator::raw_share_pct;
use mobile_market_sim::{
    default_profiles, MarketNoise, MarketSimulator, NoiseConfig, OperatingSystem,
};
use std::collections::{BTreeSet, HashMap};

#[test]
fn test_value_bounds_hold_for_every_record() {
    for seed in 0..20 {
        for record in generate_records(seed) {
            assert!(
                (SHARE_PCT_FLOOR..=SHARE_PCT_CEILING).contains(&record.market_share_pct),
                "share out of range: {:?}",
                record
            );
            assert!(record.usage_hours >= USAGE_HOURS_FLOOR, "usage below floor: {:?}", record);
            assert!(record.users_millions >= 0.0, "negative users: {:?}", record);
        }
    }
}

#[test]
fn test_each_country_has_thirteen_dates_thirty_days_apart() {
    let records = generate_records(7);
    let mut dates: HashMap<&str, BTreeSet<NaiveDate>> = HashMap::new();
    for record in &records {
        dates.entry(record.country.as_str()).or_default().insert(record.date);
    }

    assert_eq!(dates.len(), 9);
    for (country, set) in dates {
        let sorted: Vec<NaiveDate> = set.into_iter().collect();
        assert_eq!(sorted.len(), 13, "{}", country);
        assert_eq!(sorted[0], test_as_of() - Duration::days(365), "{}", country);
        assert!(
            sorted.windows(2).all(|w| w[1] - w[0] == Duration::days(30)),
            "{}: uneven spacing",
            country
        );
    }
}

#[test]
fn test_os_mapping_is_deterministic() {
    for seed in 0..5 {
        for record in generate_records(seed) {
            let expected = if record.brand == "Apple" {
                OperatingSystem::Ios
            } else if record.brand == "Huawei" && record.country == "China" {
                OperatingSystem::HarmonyOS
            } else {
                OperatingSystem::Android
            };
            assert_eq!(record.os, expected, "{:?}", record);
        }
    }
}

#[test]
fn test_china_huawei_runs_harmony_os() {
    let records = generate_records(11);
    let huawei: Vec<_> = records
        .iter()
        .filter(|r| r.country == "China" && r.brand == "Huawei")
        .collect();
    assert_eq!(huawei.len(), 13);
    assert!(huawei.iter().all(|r| r.os == OperatingSystem::HarmonyOS));
}

#[test]
fn test_share_noise_is_zero_centered() {
    // United States / Apple baseline of 0.51 → raw share around 51.0
    let noise = MarketNoise::new(&NoiseConfig::default()).unwrap();
    let mut rng = seeded_rng(2024);
    let n = 5000;

    let mean = (0..n)
        .map(|_| raw_share_pct(0.51, noise.share_factor(&mut rng)))
        .sum::<f64>()
        / n as f64;

    assert!((mean - 51.0).abs() < 0.5, "mean raw share {}", mean);
}

#[test]
fn test_us_apple_period_zero_scenario() {
    let mut usage = Vec::new();
    for seed in 0..1000 {
        let records = generate_records(seed);
        let apple = records
            .iter()
            .find(|r| r.country == "United States" && r.brand == "Apple")
            .unwrap();

        assert_eq!(apple.os, OperatingSystem::Ios);
        assert_eq!(apple.date, test_as_of() - Duration::days(365));
        // 0.51 × 100 always clamps to the ceiling
        assert_eq!(apple.market_share_pct, SHARE_PCT_CEILING);
        usage.push(apple.usage_hours);
    }

    let mean = usage.iter().sum::<f64>() / usage.len() as f64;
    assert!((mean - 5.5).abs() < 0.1, "mean usage {}", mean);

    // Within two standard deviations (2 × 10% of 5.5) for the bulk of draws
    let within = usage.iter().filter(|&&h| (h - 5.5).abs() <= 1.1).count();
    assert!(within as f64 / usage.len() as f64 > 0.9);
}

#[test]
fn test_users_track_baseline_share_and_growth() {
    // Users ignore share noise: averaged over runs, US Apple in period 0
    // should sit at 280 × 0.51
    let simulator = MarketSimulator::with_default_profiles().unwrap();
    let n = 500;
    let mut total = 0.0;
    for seed in 0..n {
        let records = simulator.generate_as_of(test_as_of(), &mut seeded_rng(seed)).unwrap();
        total += records[0].users_millions;
    }
    let mean = total / n as f64;
    assert!((mean - 142.8).abs() < 1.0, "mean users {}", mean);
}

#[test]
fn test_records_follow_profile_order() {
    let records = generate_records(3);
    let profiles = default_profiles();

    let mut expected = Vec::new();
    for profile in &profiles {
        for _ in 0..13 {
            for brand in profile.brands() {
                expected.push((profile.name.as_str(), brand));
            }
        }
    }

    let actual: Vec<(&str, &str)> = records
        .iter()
        .map(|r| (r.country.as_str(), r.brand.as_str()))
        .collect();
    assert_eq!(actual, expected);
}

#[test]
fn test_usage_hours_rounded_to_two_decimals() {
    for record in generate_records(5) {
        let scaled = record.usage_hours * 100.0;
        assert!((scaled - scaled.round()).abs() < 1e-6, "{}", record.usage_hours);
        let scaled = record.users_millions * 100.0;
        assert!((scaled - scaled.round()).abs() < 1e-6, "{}", record.users_millions);
    }
}
