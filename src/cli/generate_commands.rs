// Generate command implementation
use chrono::NaiveDate;
use std::collections::BTreeSet;
use std::path::Path;
use tracing::info;

use mobile_market_sim::export::{format_for_path, write_records};
use mobile_market_sim::{rng_from_seed, MarketSimulator, OutputFormat, SimConfig, SimError, SimResult};

pub struct GenerateOptions {
    pub output: Option<String>,
    pub format: Option<String>,
    pub seed: Option<u64>,
    pub as_of: Option<String>,
}

pub fn parse_format(format: &str) -> SimResult<OutputFormat> {
    match format.to_ascii_lowercase().as_str() {
        "csv" => Ok(OutputFormat::Csv),
        "json" => Ok(OutputFormat::Json),
        other => Err(SimError::InvalidParameter(
            "format".to_string(),
            format!("expected csv or json, got '{}'", other),
        )),
    }
}

pub fn parse_as_of(as_of: &str) -> SimResult<NaiveDate> {
    Ok(NaiveDate::parse_from_str(as_of, mobile_market_sim::types::DATE_FORMAT)?)
}

pub fn generate(options: GenerateOptions, config: &SimConfig) -> SimResult<()> {
    let simulator = MarketSimulator::from_config(config)?;

    let output = options.output.unwrap_or_else(|| config.output.path.clone());
    let format = match &options.format {
        Some(f) => parse_format(f)?,
        // A .json path wins over the configured default
        None if path_is_json(&output) => OutputFormat::Json,
        None => config.output.format,
    };
    let seed = options.seed.or(config.generation.seed);

    info!("🎲 Generating market data{}", seed.map(|s| format!(" (seed {})", s)).unwrap_or_default());
    let mut rng = rng_from_seed(seed);
    let records = match options.as_of {
        Some(date) => simulator.generate_as_of(parse_as_of(&date)?, &mut rng)?,
        None => simulator.generate(&mut rng)?,
    };

    write_records(&output, format, &records)?;

    if config.logging.log_generation_summary {
        let unique = |f: fn(&mobile_market_sim::ObservationRecord) -> String| {
            records.iter().map(f).collect::<BTreeSet<_>>().len()
        };

        info!("✅ Sample data generated successfully!");
        info!("📁 File: {}", output);
        info!("📊 Records: {}", records.len());
        info!("🌍 Countries: {}", unique(|r| r.country.clone()));
        info!("📱 Brands: {}", unique(|r| r.brand.clone()));
        info!("🔧 Operating Systems: {}", unique(|r| r.os.to_string()));
        info!("");
        info!("Data Preview:");
        for r in records.iter().take(config.output.preview_rows) {
            info!(
                "   {:15} {} {:10} {:10} {:6.2} {:10.2} {:5.2}",
                r.country, r.date, r.brand, r.os, r.market_share_pct, r.users_millions, r.usage_hours
            );
        }
    }

    Ok(())
}

fn path_is_json(path: &str) -> bool {
    format_for_path(Path::new(path)) == OutputFormat::Json
}
