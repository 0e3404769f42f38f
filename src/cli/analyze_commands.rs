// Validate and summary command implementations
use chrono::NaiveDate;
use std::fmt::Display;
use std::path::Path;
use tracing::{info, warn};

use mobile_market_sim::export::{country_export_path, read_records, write_csv};
use mobile_market_sim::validation::{find_default_file, DEFAULT_CANDIDATES};
use mobile_market_sim::{
    pivot_by_date, rng_from_seed, MarketAnalyzer, MarketSimulator, RecordField, SchemaValidator, SimConfig,
    SimError, SimResult,
};

const RAW_VIEW_ROWS: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidateOutcome {
    Passed,
    Failed,
    NoInput, // No file given and none of the default names present
}

impl ValidateOutcome {
    pub fn exit_code(self) -> i32 {
        match self {
            ValidateOutcome::Passed => 0,
            ValidateOutcome::Failed | ValidateOutcome::NoInput => 1,
        }
    }
}

pub fn validate(file: Option<String>) -> ValidateOutcome {
    validate_in(Path::new("."), file)
}

/// Validate `file`, or the first default name found in `dir`
pub fn validate_in(dir: &Path, file: Option<String>) -> ValidateOutcome {
    let path = match file {
        Some(file) => dir.join(file),
        None => match find_default_file(dir) {
            Some(path) => path,
            None => {
                warn!("📝 Usage: market-sim validate <file>");
                warn!("");
                warn!("Example: market-sim validate sample_mobile_data.csv");
                warn!("");
                warn!("Or place your file in the current directory with one of these names:");
                for name in DEFAULT_CANDIDATES {
                    warn!("   - {}", name);
                }
                return ValidateOutcome::NoInput;
            }
        },
    };

    let result = SchemaValidator::new().validate_file(&path);
    result.display();

    if result.passed {
        info!("Your file is ready to use with the analytics commands");
        info!("Run: market-sim summary --input {} --country <name>", path.display());
        ValidateOutcome::Passed
    } else {
        ValidateOutcome::Failed
    }
}

pub struct SummaryOptions {
    pub country: String,
    pub input: Option<String>,
    pub seed: Option<u64>,
    pub sort_by: Option<String>,
    pub show_all: bool,
    pub export: bool,
}

pub fn parse_sort_field(column: Option<&str>) -> SimResult<RecordField> {
    match column {
        Some(column) => column
            .parse()
            .map_err(|reason| SimError::InvalidParameter("sort-by".to_string(), reason)),
        None => Ok(RecordField::Date),
    }
}

pub fn summary(options: SummaryOptions, config: &SimConfig) -> SimResult<()> {
    let country = options.country.as_str();
    let sort = parse_sort_field(options.sort_by.as_deref())?;

    let records = match options.input {
        Some(path) => {
            info!("📂 Loading records from {}", path);
            read_records(&path)?
        }
        None => {
            info!("🎲 No input given, generating data in memory");
            let simulator = MarketSimulator::from_config(config)?;
            simulator.generate(&mut rng_from_seed(options.seed.or(config.generation.seed)))?
        }
    };

    let analyzer = MarketAnalyzer::new(&records);
    let summary = match analyzer.country_summary(country) {
        Some(summary) => summary,
        None => {
            warn!("⚠️  No data found for {}", country);
            info!("Available countries: {}", analyzer.countries().join(", "));
            return Err(SimError::InvalidParameter(
                "country".to_string(),
                format!("no records for '{}'", country),
            ));
        }
    };

    info!("📊 Market Analysis - {}", summary.country);
    info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    info!("Start Date:                  {}", summary.start_date);
    info!("End Date:                    {}", summary.end_date);
    info!("Average Market Share:        {:.2}", summary.avg_market_share);
    info!("Average Daily Usage (hours): {:.2}", summary.avg_usage_hours);
    info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    info!("📈 Market share trends by brand");
    print_trend(&pivot_by_date(&analyzer.share_by_brand(country)));

    info!("📈 Market share trends by OS");
    print_trend(&pivot_by_date(&analyzer.share_by_os(country)));

    info!("🏢 Brand distribution (latest period)");
    for (brand, share) in analyzer.latest_share_by_brand(country) {
        info!("   {:12} {:6.2}", brand, share);
    }

    info!("📱 OS distribution (latest period)");
    for (os, share) in analyzer.latest_share_by_os(country) {
        info!("   {:12} {:6.2}", os, share);
    }

    info!("📊 Usage patterns (latest period)");
    let users = analyzer.latest_users_by_brand(country);
    for (brand, hours) in analyzer.latest_usage_by_brand(country) {
        info!(
            "   {:12} {:5.2} h/day  {:10.2} M users",
            brand,
            hours,
            users.get(&brand).copied().unwrap_or_default()
        );
    }

    let limit = if options.show_all { None } else { Some(RAW_VIEW_ROWS) };
    let rows = analyzer.raw_rows(country, sort, limit);
    info!("📄 Raw data ({} of {} rows, sorted by {:?} descending)", rows.len(), summary.records, sort);
    for r in &rows {
        info!(
            "   {} {:10} {:10} {:6.2} {:10.2} {:5.2}",
            r.date, r.brand, r.os, r.market_share_pct, r.users_millions, r.usage_hours
        );
    }

    if options.export {
        let path = country_export_path(Path::new("."), country);
        write_csv(&path, &rows)?;
        info!("💾 Filtered data written to {}", path.display());
    }

    Ok(())
}

fn print_trend<K: Display>(rows: &[(NaiveDate, Vec<(K, f64)>)]) {
    for (date, entries) in rows {
        let line: Vec<String> = entries.iter().map(|(key, share)| format!("{} {:.2}", key, share)).collect();
        info!("   {}  {}", date, line.join("  "));
    }
}
