//! Synthetic mobile market generator
//!
//! Produces one [`ObservationRecord`] per country × period × brand from the
//! static profile table. The random stream is passed in by the caller, so a
//! seeded `StdRng` gives reproducible output and an entropy-seeded one gives
//! a fresh dataset every run.

use chrono::{Days, NaiveDate, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Normal};
use tracing::{debug, info};

use crate::config::{GenerationConfig, NoiseConfig, SimConfig, MAX_SCHEDULE_DAYS};
use crate::error::{SimError, SimResult};
use crate::profiles::{default_profiles, validate_profiles, BrandShare, CountryProfile};
use crate::rules;
use crate::types::ObservationRecord;

/// Multiplicative noise sources, each centered at 1.0
#[derive(Debug, Clone)]
pub struct MarketNoise {
    demand: Normal<f64>,
    share: Normal<f64>,
    usage: Normal<f64>,
}

impl MarketNoise {
    /// Every standard deviation must be finite and non-negative
    pub fn new(config: &NoiseConfig) -> SimResult<Self> {
        for (name, std) in config.std_devs() {
            if !std.is_finite() || std < 0.0 {
                return Err(SimError::InvalidParameter(
                    name.to_string(),
                    format!("standard deviation must be a non-negative number, got {}", std),
                ));
            }
        }

        Ok(Self {
            demand: Normal::new(1.0, config.demand_std)?,
            share: Normal::new(1.0, config.share_std)?,
            usage: Normal::new(1.0, config.usage_std)?,
        })
    }

    /// Month-to-month demand fluctuation, independent of brand mix
    pub fn demand_factor<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        self.demand.sample(rng)
    }

    /// Brand-specific share drift
    pub fn share_factor<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        self.share.sample(rng)
    }

    pub fn usage_factor<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        self.usage.sample(rng)
    }
}

/// Period dates: `periods` points, `period_days` apart, starting `lookback_days` before as-of
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PeriodSchedule {
    pub periods: u32,
    pub period_days: i64,
    pub lookback_days: i64,
}

impl PeriodSchedule {
    pub fn validate(&self) -> SimResult<()> {
        if self.periods == 0 {
            return Err(SimError::InvalidParameter("periods".to_string(), "must be greater than 0".to_string()));
        }
        if self.period_days <= 0 || self.period_days > MAX_SCHEDULE_DAYS {
            return Err(SimError::InvalidParameter(
                "period_days".to_string(),
                format!("must be between 1 and {}", MAX_SCHEDULE_DAYS),
            ));
        }
        if !(0..=MAX_SCHEDULE_DAYS).contains(&self.lookback_days) {
            return Err(SimError::InvalidParameter(
                "lookback_days".to_string(),
                format!("must be between 0 and {}", MAX_SCHEDULE_DAYS),
            ));
        }
        let span = self.period_days.checked_mul(i64::from(self.periods - 1));
        if !matches!(span, Some(days) if days <= MAX_SCHEDULE_DAYS) {
            return Err(SimError::InvalidParameter(
                "periods".to_string(),
                format!("periods × period_days must span at most {} days", MAX_SCHEDULE_DAYS),
            ));
        }
        Ok(())
    }

    pub fn start_date(&self, as_of: NaiveDate) -> SimResult<NaiveDate> {
        u64::try_from(self.lookback_days)
            .ok()
            .and_then(|days| as_of.checked_sub_days(Days::new(days)))
            .ok_or_else(|| SimError::InvalidDate(format!("{} days before {}", self.lookback_days, as_of)))
    }

    pub fn date_of(&self, as_of: NaiveDate, period: u32) -> SimResult<NaiveDate> {
        let start = self.start_date(as_of)?;
        u64::try_from(self.period_days)
            .ok()
            .and_then(|days| days.checked_mul(u64::from(period)))
            .and_then(|offset| start.checked_add_days(Days::new(offset)))
            .ok_or_else(|| SimError::InvalidDate(format!("period {} after {}", period, start)))
    }

    pub fn dates(&self, as_of: NaiveDate) -> SimResult<Vec<NaiveDate>> {
        (0..self.periods).map(|t| self.date_of(as_of, t)).collect()
    }
}

impl Default for PeriodSchedule {
    fn default() -> Self {
        Self::from(&GenerationConfig::default())
    }
}

impl From<&GenerationConfig> for PeriodSchedule {
    fn from(config: &GenerationConfig) -> Self {
        Self {
            periods: config.periods,
            period_days: config.period_days,
            lookback_days: config.lookback_days,
        }
    }
}

/// Share percentage before the display clamp
pub fn raw_share_pct(baseline: f64, factor: f64) -> f64 {
    baseline * factor * 100.0
}

/// Seeded stream when a seed is given, system entropy otherwise
pub fn rng_from_seed(seed: Option<u64>) -> StdRng {
    match seed {
        Some(s) => StdRng::seed_from_u64(s),
        None => StdRng::from_entropy(),
    }
}

#[derive(Debug, Clone)]
pub struct MarketSimulator {
    profiles: Vec<CountryProfile>,
    schedule: PeriodSchedule,
    noise: MarketNoise,
}

impl MarketSimulator {
    /// Build a simulator; a malformed profile table, schedule or noise setting is rejected here
    pub fn new(profiles: Vec<CountryProfile>, schedule: PeriodSchedule, noise: &NoiseConfig) -> SimResult<Self> {
        validate_profiles(&profiles)?;
        schedule.validate()?;

        Ok(Self {
            profiles,
            schedule,
            noise: MarketNoise::new(noise)?,
        })
    }

    pub fn from_config(config: &SimConfig) -> SimResult<Self> {
        Self::new(
            config.profiles.clone(),
            PeriodSchedule::from(&config.generation),
            &config.noise,
        )
    }

    /// Built-in nine-country table with default schedule and noise
    pub fn with_default_profiles() -> SimResult<Self> {
        Self::new(default_profiles(), PeriodSchedule::default(), &NoiseConfig::default())
    }

    pub fn profiles(&self) -> &[CountryProfile] {
        &self.profiles
    }

    pub fn schedule(&self) -> PeriodSchedule {
        self.schedule
    }

    pub fn expected_record_count(&self) -> usize {
        let brands: usize = self.profiles.iter().map(|p| p.brand_shares.len()).sum();
        brands * self.schedule.periods as usize
    }

    /// Generate the full dataset anchored at today's date (UTC)
    pub fn generate<R: Rng + ?Sized>(&self, rng: &mut R) -> SimResult<Vec<ObservationRecord>> {
        self.generate_as_of(Utc::now().date_naive(), rng)
    }

    /// Generate the full dataset anchored at `as_of`.
    ///
    /// Emission order is country, then period, then brand insertion order.
    /// Draw order per (country, period) is one demand draw followed by a
    /// share and a usage draw per brand. Fails only when a period date falls
    /// outside the calendar range.
    pub fn generate_as_of<R: Rng + ?Sized>(&self, as_of: NaiveDate, rng: &mut R) -> SimResult<Vec<ObservationRecord>> {
        let dates = self.schedule.dates(as_of)?;
        let mut records = Vec::with_capacity(self.expected_record_count());

        for profile in &self.profiles {
            for (period, &date) in (0u32..).zip(&dates) {
                let period_users = profile.users_at(period) * self.noise.demand_factor(rng);

                for entry in &profile.brand_shares {
                    records.push(self.simulate_brand(profile, entry, date, period_users, rng));
                }
            }

            debug!(
                "📱 {}: {} brands × {} periods",
                profile.name,
                profile.brand_shares.len(),
                self.schedule.periods
            );
        }

        info!(
            "✅ Generated {} records for {} countries starting {}",
            records.len(),
            self.profiles.len(),
            self.schedule.start_date(as_of)?
        );

        Ok(records)
    }

    fn simulate_brand<R: Rng + ?Sized>(
        &self,
        profile: &CountryProfile,
        entry: &BrandShare,
        date: NaiveDate,
        period_users: f64,
        rng: &mut R,
    ) -> ObservationRecord {
        let market_share_pct = rules::clamp_share_pct(raw_share_pct(entry.share, self.noise.share_factor(rng)));

        // Users follow the un-noised baseline share, not the displayed percentage
        let brand_users = period_users * entry.share;

        let usage_hours = rules::floor_usage_hours(rules::base_usage_hours(&entry.brand) * self.noise.usage_factor(rng));

        ObservationRecord {
            country: profile.name.clone(),
            date,
            brand: entry.brand.clone(),
            os: rules::operating_system(&entry.brand, &profile.name),
            market_share_pct,
            users_millions: rules::round2(brand_users),
            usage_hours: rules::round2(usage_hours),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::OperatingSystem;
    use chrono::Duration;

    fn as_of() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 30).unwrap()
    }

    #[test]
    fn test_record_count_and_order() {
        let sim = MarketSimulator::with_default_profiles().unwrap();
        let mut rng = StdRng::seed_from_u64(42);
        let records = sim.generate_as_of(as_of(), &mut rng).unwrap();

        assert_eq!(records.len(), 559);
        assert_eq!(records.len(), sim.expected_record_count());

        // United States, period 0, brands in insertion order
        let first: Vec<&str> = records[..5].iter().map(|r| r.brand.as_str()).collect();
        assert_eq!(first, vec!["Apple", "Samsung", "Google", "Motorola", "Others"]);
        assert!(records[..5].iter().all(|r| r.date == records[0].date));
        assert_eq!(records[5].brand, "Apple");
        assert!(records[5].date > records[0].date);

        assert_eq!(records.last().unwrap().country, "Australia");
    }

    #[test]
    fn test_first_date_is_lookback_before_as_of() {
        let sim = MarketSimulator::with_default_profiles().unwrap();
        let mut rng = StdRng::seed_from_u64(1);
        let records = sim.generate_as_of(as_of(), &mut rng).unwrap();

        assert_eq!(records[0].date, NaiveDate::from_ymd_opt(2023, 7, 1).unwrap());
        let last_us = records.iter().filter(|r| r.country == "United States").last().unwrap();
        assert_eq!(last_us.date, records[0].date + Duration::days(360));
    }

    #[test]
    fn test_same_seed_same_output() {
        let sim = MarketSimulator::with_default_profiles().unwrap();
        let a = sim.generate_as_of(as_of(), &mut StdRng::seed_from_u64(9)).unwrap();
        let b = sim.generate_as_of(as_of(), &mut StdRng::seed_from_u64(9)).unwrap();
        let c = sim.generate_as_of(as_of(), &mut StdRng::seed_from_u64(10)).unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_users_use_unnoised_share() {
        let profile = CountryProfile::new("Solo", 100.0, 0.0, &[("Apple", 0.5)]);
        let noise = NoiseConfig { demand_std: 0.0, share_std: 0.05, usage_std: 0.0 };
        let schedule = PeriodSchedule { periods: 3, period_days: 30, lookback_days: 60 };
        let sim = MarketSimulator::new(vec![profile], schedule, &noise).unwrap();

        let records = sim.generate_as_of(as_of(), &mut StdRng::seed_from_u64(3)).unwrap();
        assert_eq!(records.len(), 3);
        for record in &records {
            assert_eq!(record.users_millions, 50.0);
            assert_eq!(record.usage_hours, 5.5);
            assert_eq!(record.market_share_pct, 8.0);
            assert_eq!(record.os, OperatingSystem::Ios);
        }
    }

    #[test]
    fn test_rejects_malformed_profiles() {
        let empty = CountryProfile::new("Nowhere", 10.0, 0.01, &[]);
        let result = MarketSimulator::new(vec![empty], PeriodSchedule::default(), &NoiseConfig::default());
        assert!(matches!(result, Err(SimError::InvalidProfile(_))));
    }

    #[test]
    fn test_rejects_negative_noise() {
        let noise = NoiseConfig { demand_std: -1.0, ..NoiseConfig::default() };
        let result = MarketSimulator::new(default_profiles(), PeriodSchedule::default(), &noise);
        assert!(matches!(result, Err(SimError::InvalidParameter(_, _))));
    }

    #[test]
    fn test_rejects_non_finite_noise() {
        for noise in [
            NoiseConfig { share_std: f64::NAN, ..NoiseConfig::default() },
            NoiseConfig { usage_std: f64::INFINITY, ..NoiseConfig::default() },
            NoiseConfig { usage_std: -0.01, ..NoiseConfig::default() },
        ] {
            assert!(matches!(MarketNoise::new(&noise), Err(SimError::InvalidParameter(_, _))));
        }
        assert!(MarketNoise::new(&NoiseConfig { demand_std: 0.0, ..NoiseConfig::default() }).is_ok());
    }

    #[test]
    fn test_rejects_oversized_schedule() {
        let schedule = PeriodSchedule { lookback_days: 10_000_000_000, ..PeriodSchedule::default() };
        let result = MarketSimulator::new(default_profiles(), schedule, &NoiseConfig::default());
        assert!(matches!(result, Err(SimError::InvalidParameter(_, _))));

        let schedule = PeriodSchedule { period_days: 0, ..PeriodSchedule::default() };
        let result = MarketSimulator::new(default_profiles(), schedule, &NoiseConfig::default());
        assert!(matches!(result, Err(SimError::InvalidParameter(_, _))));

        let schedule = PeriodSchedule { periods: u32::MAX, ..PeriodSchedule::default() };
        assert!(matches!(schedule.validate(), Err(SimError::InvalidParameter(_, _))));
    }

    #[test]
    fn test_dates_outside_calendar_are_errors() {
        // Unvalidated schedules must not panic on date arithmetic
        let schedule = PeriodSchedule { periods: 3, period_days: i64::MAX, lookback_days: i64::MAX };
        assert!(matches!(schedule.start_date(as_of()), Err(SimError::InvalidDate(_))));

        let schedule = PeriodSchedule { periods: 3, period_days: i64::MAX, lookback_days: 0 };
        assert_eq!(schedule.date_of(as_of(), 0).unwrap(), as_of());
        assert!(matches!(schedule.dates(as_of()), Err(SimError::InvalidDate(_))));

        let sim = MarketSimulator::with_default_profiles().unwrap();
        assert!(matches!(
            sim.generate_as_of(NaiveDate::MIN, &mut StdRng::seed_from_u64(1)),
            Err(SimError::InvalidDate(_))
        ));
    }

    #[test]
    fn test_schedule_dates() {
        let schedule = PeriodSchedule::default();
        let dates = schedule.dates(as_of()).unwrap();
        assert_eq!(dates.len(), 13);
        assert!(dates.windows(2).all(|w| w[1] - w[0] == Duration::days(30)));
    }
}
