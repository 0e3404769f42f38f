// Country profiles - static baseline market characteristics per country

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// A brand's baseline market-share fraction within one country
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BrandShare {
    pub brand: String,
    pub share: f64, // Fraction in [0, 1], not normalized across brands
}

impl BrandShare {
    pub fn new(brand: impl Into<String>, share: f64) -> Self {
        Self {
            brand: brand.into(),
            share,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CountryProfile {
    pub name: String,
    pub base_users: f64,  // Millions
    pub growth_rate: f64, // Per-period compounding rate
    /// Insertion order is emission order.
    pub brand_shares: Vec<BrandShare>,
}

impl CountryProfile {
    pub fn new(name: impl Into<String>, base_users: f64, growth_rate: f64, brand_shares: &[(&str, f64)]) -> Self {
        Self {
            name: name.into(),
            base_users,
            growth_rate,
            brand_shares: brand_shares
                .iter()
                .map(|&(brand, share)| BrandShare::new(brand, share))
                .collect(),
        }
    }

    /// User base after `period` compounding steps, before demand noise
    pub fn users_at(&self, period: u32) -> f64 {
        self.base_users * (1.0 + self.growth_rate).powi(period as i32)
    }

    pub fn brands(&self) -> impl Iterator<Item = &str> {
        self.brand_shares.iter().map(|b| b.brand.as_str())
    }

    pub fn validate(&self) -> Result<(), ProfileError> {
        if self.name.trim().is_empty() {
            return Err(ProfileError::EmptyName);
        }

        if !self.base_users.is_finite() || self.base_users <= 0.0 {
            return Err(ProfileError::InvalidBaseUsers(self.name.clone(), self.base_users));
        }

        if !self.growth_rate.is_finite() {
            return Err(ProfileError::InvalidGrowthRate(self.name.clone(), self.growth_rate));
        }

        if self.brand_shares.is_empty() {
            return Err(ProfileError::NoBrands(self.name.clone()));
        }

        let mut seen = HashSet::new();
        for entry in &self.brand_shares {
            if !seen.insert(entry.brand.as_str()) {
                return Err(ProfileError::DuplicateBrand(self.name.clone(), entry.brand.clone()));
            }
            if !entry.share.is_finite() || !(0.0..=1.0).contains(&entry.share) {
                return Err(ProfileError::InvalidShare(
                    self.name.clone(),
                    entry.brand.clone(),
                    entry.share,
                ));
            }
        }

        Ok(())
    }
}

/// Validate a whole profile table: every profile individually, plus unique country names
pub fn validate_profiles(profiles: &[CountryProfile]) -> Result<(), ProfileError> {
    if profiles.is_empty() {
        return Err(ProfileError::EmptyTable);
    }

    let mut seen = HashSet::new();
    for profile in profiles {
        profile.validate()?;
        if !seen.insert(profile.name.as_str()) {
            return Err(ProfileError::DuplicateCountry(profile.name.clone()));
        }
    }

    Ok(())
}

/// The built-in nine-country table
pub fn default_profiles() -> Vec<CountryProfile> {
    vec![
        CountryProfile::new(
            "United States",
            280.0,
            0.02,
            &[("Apple", 0.51), ("Samsung", 0.24), ("Google", 0.13), ("Motorola", 0.08), ("Others", 0.04)],
        ),
        CountryProfile::new(
            "Canada",
            35.0,
            0.015,
            &[("Apple", 0.61), ("Samsung", 0.23), ("Google", 0.08), ("Others", 0.08)],
        ),
        CountryProfile::new(
            "United Kingdom",
            55.0,
            0.01,
            &[("Apple", 0.51), ("Samsung", 0.31), ("Google", 0.05), ("Others", 0.13)],
        ),
        CountryProfile::new(
            "Germany",
            65.0,
            0.005,
            &[("Samsung", 0.34), ("Apple", 0.37), ("Xiaomi", 0.12), ("Others", 0.17)],
        ),
        CountryProfile::new(
            "China",
            975.0,
            0.03,
            &[
                ("Huawei", 0.20),
                ("Oppo", 0.18),
                ("Vivo", 0.15),
                ("Xiaomi", 0.13),
                ("Apple", 0.14),
                ("Others", 0.20),
            ],
        ),
        CountryProfile::new(
            "India",
            659.0,
            0.08,
            &[
                ("Xiaomi", 0.19),
                ("Realme", 0.14),
                ("Oppo", 0.12),
                ("Samsung", 0.18),
                ("Apple", 0.04),
                ("Vivo", 0.10),
                ("Others", 0.23),
            ],
        ),
        CountryProfile::new(
            "Japan",
            97.0,
            0.01,
            &[("Apple", 0.59), ("Samsung", 0.07), ("Sharp", 0.10), ("Others", 0.24)],
        ),
        CountryProfile::new(
            "Brazil",
            143.0,
            0.05,
            &[("Samsung", 0.37), ("Motorola", 0.22), ("Xiaomi", 0.18), ("Oppo", 0.10), ("Others", 0.13)],
        ),
        CountryProfile::new(
            "Australia",
            20.0,
            0.02,
            &[("Apple", 0.57), ("Samsung", 0.26), ("Google", 0.07), ("Others", 0.10)],
        ),
    ]
}

#[derive(Debug, thiserror::Error)]
pub enum ProfileError {
    #[error("profile table is empty")]
    EmptyTable,

    #[error("profile has an empty country name")]
    EmptyName,

    #[error("duplicate country profile: {0}")]
    DuplicateCountry(String),

    #[error("{0}: base_users must be positive, got {1}")]
    InvalidBaseUsers(String, f64),

    #[error("{0}: growth_rate must be finite, got {1}")]
    InvalidGrowthRate(String, f64),

    #[error("{0}: at least one brand share is required")]
    NoBrands(String),

    #[error("{0}: duplicate brand '{1}'")]
    DuplicateBrand(String, String),

    #[error("{0}: share for '{1}' must be in [0, 1], got {2}")]
    InvalidShare(String, String, f64),
}
