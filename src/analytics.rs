// Market analytics - per-country grouping and descriptive statistics

use chrono::NaiveDate;
use ndarray::Array1;
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};
use std::str::FromStr;

use crate::types::{ObservationRecord, OperatingSystem};

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DescriptiveStats {
    pub count: usize,
    pub mean: f64,
    pub min: f64,
    pub max: f64,
}

impl DescriptiveStats {
    /// None for an empty sample
    pub fn from_values(values: Array1<f64>) -> Option<Self> {
        let mean = values.mean()?;
        Some(Self {
            count: values.len(),
            mean,
            min: values.fold(f64::INFINITY, |acc, &v| acc.min(v)),
            max: values.fold(f64::NEG_INFINITY, |acc, &v| acc.max(v)),
        })
    }
}

/// Headline figures for one country
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CountrySummary {
    pub country: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub avg_market_share: f64,
    pub avg_usage_hours: f64,
    pub records: usize,
}

/// Record column used for sorting and statistics
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordField {
    Date,
    Brand,
    Os,
    MarketShare,
    Users,
    Usage,
}

/// Accepts column headers (`Market_Share`) as well as short names (`share`), any case
impl FromStr for RecordField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key: String = s
            .chars()
            .filter(|c| *c != '_' && *c != '-')
            .collect::<String>()
            .to_lowercase();
        match key.as_str() {
            "date" => Ok(RecordField::Date),
            "brand" => Ok(RecordField::Brand),
            "os" => Ok(RecordField::Os),
            "marketshare" | "share" => Ok(RecordField::MarketShare),
            "usersmillions" | "users" => Ok(RecordField::Users),
            "usagehours" | "usage" => Ok(RecordField::Usage),
            _ => Err(format!(
                "unknown column '{}', expected one of: Date, Brand, OS, Market_Share, Users_Millions, Usage_Hours",
                s
            )),
        }
    }
}

impl RecordField {
    pub fn values(&self, records: &[&ObservationRecord]) -> Option<Array1<f64>> {
        let pick: fn(&ObservationRecord) -> f64 = match self {
            RecordField::MarketShare => |r| r.market_share_pct,
            RecordField::Users => |r| r.users_millions,
            RecordField::Usage => |r| r.usage_hours,
            _ => return None,
        };
        Some(records.iter().map(|r| pick(r)).collect())
    }

    fn compare(&self, a: &ObservationRecord, b: &ObservationRecord) -> Ordering {
        match self {
            RecordField::Date => a.date.cmp(&b.date),
            RecordField::Brand => a.brand.cmp(&b.brand),
            RecordField::Os => a.os.cmp(&b.os),
            RecordField::MarketShare => a.market_share_pct.total_cmp(&b.market_share_pct),
            RecordField::Users => a.users_millions.total_cmp(&b.users_millions),
            RecordField::Usage => a.usage_hours.total_cmp(&b.usage_hours),
        }
    }
}

/// Read-only view over a generated or loaded record set
pub struct MarketAnalyzer<'a> {
    records: &'a [ObservationRecord],
}

impl<'a> MarketAnalyzer<'a> {
    pub fn new(records: &'a [ObservationRecord]) -> Self {
        Self { records }
    }

    /// Sorted unique country names
    pub fn countries(&self) -> Vec<&'a str> {
        self.records
            .iter()
            .map(|r| r.country.as_str())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    pub fn country_records(&self, country: &str) -> Vec<&'a ObservationRecord> {
        self.records.iter().filter(|r| r.country == country).collect()
    }

    pub fn latest_date(&self, country: &str) -> Option<NaiveDate> {
        self.records
            .iter()
            .filter(|r| r.country == country)
            .map(|r| r.date)
            .max()
    }

    pub fn country_summary(&self, country: &str) -> Option<CountrySummary> {
        let rows = self.country_records(country);
        let share = RecordField::MarketShare.values(&rows).and_then(DescriptiveStats::from_values)?;
        let usage = RecordField::Usage.values(&rows).and_then(DescriptiveStats::from_values)?;

        Some(CountrySummary {
            country: country.to_string(),
            start_date: rows.iter().map(|r| r.date).min()?,
            end_date: rows.iter().map(|r| r.date).max()?,
            avg_market_share: share.mean,
            avg_usage_hours: usage.mean,
            records: rows.len(),
        })
    }

    pub fn stats(&self, country: &str, field: RecordField) -> Option<DescriptiveStats> {
        field
            .values(&self.country_records(country))
            .and_then(DescriptiveStats::from_values)
    }

    /// (date, brand) → summed market share, for the trend view
    pub fn share_by_brand(&self, country: &str) -> BTreeMap<(NaiveDate, String), f64> {
        let mut grouped = BTreeMap::new();
        for r in self.records.iter().filter(|r| r.country == country) {
            *grouped.entry((r.date, r.brand.clone())).or_insert(0.0) += r.market_share_pct;
        }
        grouped
    }

    /// (date, os) → summed market share
    pub fn share_by_os(&self, country: &str) -> BTreeMap<(NaiveDate, OperatingSystem), f64> {
        let mut grouped = BTreeMap::new();
        for r in self.records.iter().filter(|r| r.country == country) {
            *grouped.entry((r.date, r.os)).or_insert(0.0) += r.market_share_pct;
        }
        grouped
    }

    pub fn latest_share_by_brand(&self, country: &str) -> BTreeMap<String, f64> {
        self.sum_latest(country, |r| r.brand.clone(), |r| r.market_share_pct)
    }

    pub fn latest_share_by_os(&self, country: &str) -> BTreeMap<OperatingSystem, f64> {
        self.sum_latest(country, |r| r.os, |r| r.market_share_pct)
    }

    pub fn latest_users_by_brand(&self, country: &str) -> BTreeMap<String, f64> {
        self.sum_latest(country, |r| r.brand.clone(), |r| r.users_millions)
    }

    /// Mean usage hours per brand at the latest date
    pub fn latest_usage_by_brand(&self, country: &str) -> BTreeMap<String, f64> {
        let mut sums: BTreeMap<String, (f64, usize)> = BTreeMap::new();
        for r in self.latest_records(country) {
            let entry = sums.entry(r.brand.clone()).or_insert((0.0, 0));
            entry.0 += r.usage_hours;
            entry.1 += 1;
        }
        sums.into_iter()
            .map(|(brand, (total, n))| (brand, total / n as f64))
            .collect()
    }

    /// Country rows sorted descending by `sort`, truncated to `limit` when given
    pub fn raw_rows(&self, country: &str, sort: RecordField, limit: Option<usize>) -> Vec<ObservationRecord> {
        let mut rows: Vec<ObservationRecord> = self.country_records(country).into_iter().cloned().collect();
        rows.sort_by(|a, b| sort.compare(b, a));
        if let Some(limit) = limit {
            rows.truncate(limit);
        }
        rows
    }

    fn latest_records(&self, country: &str) -> impl Iterator<Item = &'a ObservationRecord> + '_ {
        let latest = self.latest_date(country);
        let country = country.to_string();
        self.records
            .iter()
            .filter(move |r| r.country == country && Some(r.date) == latest)
    }

    fn sum_latest<K: Ord>(
        &self,
        country: &str,
        key: impl Fn(&ObservationRecord) -> K,
        value: impl Fn(&ObservationRecord) -> f64,
    ) -> BTreeMap<K, f64> {
        let mut grouped = BTreeMap::new();
        for r in self.latest_records(country) {
            *grouped.entry(key(r)).or_insert(0.0) += value(r);
        }
        grouped
    }
}

/// Regroup a (date, key) series into one row per date, keys in ascending order
pub fn pivot_by_date<K: Clone>(series: &BTreeMap<(NaiveDate, K), f64>) -> Vec<(NaiveDate, Vec<(K, f64)>)> {
    let mut rows: Vec<(NaiveDate, Vec<(K, f64)>)> = Vec::new();
    for ((date, key), value) in series {
        match rows.last_mut() {
            Some((last, entries)) if last == date => entries.push((key.clone(), *value)),
            _ => rows.push((*date, vec![(key.clone(), *value)])),
        }
    }
    rows
}
