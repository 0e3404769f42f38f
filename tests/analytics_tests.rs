// Aggregations over a full generated dataset

mod common;

use chrono::Duration;
use common::{generate_records, test_as_of};
use mobile_market_sim::{MarketAnalyzer, OperatingSystem, RecordField};

#[test]
fn test_country_list_matches_profiles() {
    let records = generate_records(4);
    let countries = MarketAnalyzer::new(&records).countries();
    assert_eq!(countries.len(), 9);
    assert_eq!(countries.first(), Some(&"Australia"));
    assert_eq!(countries.last(), Some(&"United States"));
}

#[test]
fn test_country_summary_spans_the_year() {
    let records = generate_records(4);
    let summary = MarketAnalyzer::new(&records).country_summary("India").unwrap();

    assert_eq!(summary.start_date, test_as_of() - Duration::days(365));
    assert_eq!(summary.end_date, summary.start_date + Duration::days(360));
    assert_eq!(summary.records, 7 * 13);
    assert!((0.5..=8.0).contains(&summary.avg_market_share));
    assert!(summary.avg_usage_hours >= 2.0);
}

#[test]
fn test_china_os_split() {
    let records = generate_records(6);
    let analyzer = MarketAnalyzer::new(&records);

    let by_os = analyzer.share_by_os("China");
    // 13 dates × {Android, HarmonyOS, iOS}
    assert_eq!(by_os.len(), 39);

    let latest = analyzer.latest_share_by_os("China");
    assert_eq!(latest.len(), 3);
    assert!(latest.contains_key(&OperatingSystem::HarmonyOS));

    let us = analyzer.latest_share_by_os("United States");
    assert!(!us.contains_key(&OperatingSystem::HarmonyOS));
}

#[test]
fn test_latest_users_grow_with_compounding() {
    let records = generate_records(12);
    let analyzer = MarketAnalyzer::new(&records);

    // India grows 8% per period; 1.08^12 ≈ 2.5, well beyond demand noise
    let first = records
        .iter()
        .find(|r| r.country == "India" && r.brand == "Xiaomi")
        .unwrap()
        .users_millions;
    let latest = analyzer.latest_users_by_brand("India")["Xiaomi"];
    assert!(latest > first * 2.0, "{} vs {}", latest, first);
}

#[test]
fn test_raw_view_defaults() {
    let records = generate_records(2);
    let analyzer = MarketAnalyzer::new(&records);

    let rows = analyzer.raw_rows("Japan", RecordField::Date, Some(20));
    assert_eq!(rows.len(), 20);
    assert!(rows.windows(2).all(|w| w[0].date >= w[1].date));
    assert_eq!(analyzer.raw_rows("Japan", RecordField::Date, None).len(), 52);

    let stats = analyzer.stats("Japan", RecordField::Users).unwrap();
    assert_eq!(stats.count, 52);
    assert!(stats.min <= stats.mean && stats.mean <= stats.max);
}
