// Mobile Market Simulator Library
//
// Synthetic per-country, per-brand mobile market data with schema validation and analytics

pub mod analytics;
pub mod config;
pub mod error;       // Unified error handling
pub mod export;      // CSV / JSON record tables
pub mod profiles;
pub mod rules;       // OS mapping, usage baselines, clamp bounds
pub mod simulator;
pub mod types;
pub mod validation;  // Schema validation

// Re-export core types
pub use types::{ObservationRecord, OperatingSystem, REQUIRED_COLUMNS};
pub use profiles::{BrandShare, CountryProfile, ProfileError, default_profiles};

// Re-export error types
pub use error::{SimError, SimResult};

// Re-export configuration
pub use config::{SimConfig, GenerationConfig, NoiseConfig, OutputConfig, OutputFormat, LoggingConfig, ConfigError};

// Re-export simulator
pub use simulator::{MarketSimulator, MarketNoise, PeriodSchedule, rng_from_seed};

// Re-export validation types
pub use validation::{SchemaValidator, ValidationResult, ValidationCheck, ValidationLevel, CheckKind};

// Re-export analytics
pub use analytics::{MarketAnalyzer, CountrySummary, DescriptiveStats, RecordField, pivot_by_date};
