// Mobile Market Simulator - CLI
// Single entry point for generation, validation and per-country summaries

use clap::{Parser, Subcommand};
use tracing::{error, info, warn, Level};
use mobile_market_sim::{SimConfig, SimError};

// Load command modules from cli directory
#[path = "../cli/generate_commands.rs"]
mod generate_commands;
#[path = "../cli/analyze_commands.rs"]
mod analyze_commands;

#[derive(Parser)]
#[command(name = "market-sim")]
#[command(version = "0.1.0")]
#[command(about = "Synthetic mobile phone market data generator", long_about = None)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Configuration file path
    #[arg(short, long, global = true, default_value = "market-sim.toml")]
    config: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a full synthetic dataset
    Generate {
        /// Output file (defaults to the configured path)
        #[arg(short, long)]
        output: Option<String>,

        /// Output format: csv or json
        #[arg(short, long)]
        format: Option<String>,

        /// Seed for a reproducible dataset
        #[arg(short, long)]
        seed: Option<u64>,

        /// Reference date (YYYY-MM-DD), defaults to today
        #[arg(long)]
        as_of: Option<String>,
    },

    /// Validate a record table against the required schema
    Validate {
        /// CSV file to check (searches conventional names when omitted)
        file: Option<String>,
    },

    /// Show KPIs and latest-period breakdowns for one country
    Summary {
        /// Country to analyze
        #[arg(long)]
        country: String,

        /// Read records from a CSV or JSON file instead of generating them
        #[arg(short, long)]
        input: Option<String>,

        /// Seed used when generating in memory
        #[arg(short, long)]
        seed: Option<u64>,

        /// Column to sort the raw data view by (descending), defaults to Date
        #[arg(long)]
        sort_by: Option<String>,

        /// Show all rows in the raw data view
        #[arg(short, long)]
        all: bool,

        /// Write the filtered rows to <country>_mobile_data.csv
        #[arg(short, long)]
        export: bool,
    },

    /// Write a default configuration file
    Init,
}

fn main() {
    let cli = Cli::parse();

    // Setup logging first (before config load so we can see config errors).
    // An unreadable config falls back to INFO here and is reported by the command.
    let level = if cli.verbose {
        Level::DEBUG
    } else {
        SimConfig::load_or_default(&cli.config)
            .ok()
            .and_then(|config| config.logging.max_level())
            .unwrap_or(Level::INFO)
    };
    tracing_subscriber::fmt().with_max_level(level).init();

    let code = match run(cli) {
        Ok(code) => code,
        Err(e) => {
            error!("❌ {} error", e.category());
            error!("{}", e.user_message());
            1
        }
    };

    std::process::exit(code);
}

fn run(cli: Cli) -> Result<i32, SimError> {
    match cli.command {
        // Init doesn't require config (it creates it)
        Commands::Init => {
            init_config(&cli.config)?;
        }

        // Validation never depends on generator configuration
        Commands::Validate { file } => {
            return Ok(analyze_commands::validate(file).exit_code());
        }

        Commands::Generate { output, format, seed, as_of } => {
            let config = load_config(&cli.config)?;
            let options = generate_commands::GenerateOptions { output, format, seed, as_of };
            generate_commands::generate(options, &config)?;
        }

        Commands::Summary { country, input, seed, sort_by, all, export } => {
            let config = load_config(&cli.config)?;
            let options = analyze_commands::SummaryOptions {
                country,
                input,
                seed,
                sort_by,
                show_all: all,
                export,
            };
            analyze_commands::summary(options, &config)?;
        }
    }

    Ok(0)
}

/// Config file is optional; defaults carry the built-in profile table
fn load_config(path: &str) -> Result<SimConfig, SimError> {
    if std::path::Path::new(path).exists() {
        info!("📁 Config: {}", path);
    }
    Ok(SimConfig::load_or_default(path)?)
}

fn init_config(path: &str) -> Result<(), SimError> {
    info!("🔧 Initializing configuration...");

    if std::path::Path::new(path).exists() {
        warn!("⚠️  {} already exists, skipping", path);
        return Ok(());
    }

    SimConfig::default().to_file(path)?;
    info!("📝 Created {}", path);
    info!("💡 Next steps:");
    info!("   1. Run: market-sim generate");
    info!("   2. Run: market-sim validate");
    info!("   3. Run: market-sim summary --country Japan");

    Ok(())
}
