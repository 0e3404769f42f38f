// Record table IO - polars frames for CSV, serde_json for JSON

use chrono::NaiveDate;
use polars::prelude::*;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};
use tracing::info;

use crate::config::OutputFormat;
use crate::error::{SimError, SimResult};
use crate::types::{
    ObservationRecord, COLUMN_BRAND, COLUMN_COUNTRY, COLUMN_DATE, COLUMN_MARKET_SHARE, COLUMN_OS,
    COLUMN_USAGE, COLUMN_USERS, DATE_FORMAT,
};

/// Build the tabular form of a record sequence, one column per field
pub fn records_to_frame(records: &[ObservationRecord]) -> SimResult<DataFrame> {
    let dates: Vec<String> = records
        .iter()
        .map(|r| r.date.format(DATE_FORMAT).to_string())
        .collect();

    let df = DataFrame::new(vec![
        Series::new(COLUMN_COUNTRY, records.iter().map(|r| r.country.as_str()).collect::<Vec<_>>()),
        Series::new(COLUMN_DATE, dates),
        Series::new(COLUMN_BRAND, records.iter().map(|r| r.brand.as_str()).collect::<Vec<_>>()),
        Series::new(COLUMN_OS, records.iter().map(|r| r.os.label()).collect::<Vec<_>>()),
        Series::new(COLUMN_MARKET_SHARE, records.iter().map(|r| r.market_share_pct).collect::<Vec<_>>()),
        Series::new(COLUMN_USERS, records.iter().map(|r| r.users_millions).collect::<Vec<_>>()),
        Series::new(COLUMN_USAGE, records.iter().map(|r| r.usage_hours).collect::<Vec<_>>()),
    ])?;

    Ok(df)
}

/// Parse a frame with the record schema back into records
pub fn frame_to_records(df: &DataFrame) -> SimResult<Vec<ObservationRecord>> {
    let countries = df.column(COLUMN_COUNTRY)?.cast(&DataType::Utf8)?;
    let dates = df.column(COLUMN_DATE)?.cast(&DataType::Utf8)?;
    let brands = df.column(COLUMN_BRAND)?.cast(&DataType::Utf8)?;
    let systems = df.column(COLUMN_OS)?.cast(&DataType::Utf8)?;
    let shares = df.column(COLUMN_MARKET_SHARE)?.cast(&DataType::Float64)?;
    let users = df.column(COLUMN_USERS)?.cast(&DataType::Float64)?;
    let usage = df.column(COLUMN_USAGE)?.cast(&DataType::Float64)?;

    let (countries, dates, brands, systems) = (countries.utf8()?, dates.utf8()?, brands.utf8()?, systems.utf8()?);
    let (shares, users, usage) = (shares.f64()?, users.f64()?, usage.f64()?);

    let mut records = Vec::with_capacity(df.height());
    for row in 0..df.height() {
        let missing = |column: &str| SimError::ValidationFailed(format!("row {}: missing {}", row + 1, column));

        let date = dates.get(row).ok_or_else(|| missing(COLUMN_DATE))?;
        let os = systems.get(row).ok_or_else(|| missing(COLUMN_OS))?;

        records.push(ObservationRecord {
            country: countries.get(row).ok_or_else(|| missing(COLUMN_COUNTRY))?.to_string(),
            date: NaiveDate::parse_from_str(date, DATE_FORMAT)?,
            brand: brands.get(row).ok_or_else(|| missing(COLUMN_BRAND))?.to_string(),
            os: os.parse().map_err(SimError::ValidationFailed)?,
            market_share_pct: shares.get(row).ok_or_else(|| missing(COLUMN_MARKET_SHARE))?,
            users_millions: users.get(row).ok_or_else(|| missing(COLUMN_USERS))?,
            usage_hours: usage.get(row).ok_or_else(|| missing(COLUMN_USAGE))?,
        });
    }

    Ok(records)
}

pub fn read_csv_frame<P: AsRef<Path>>(path: P) -> SimResult<DataFrame> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(SimError::FileNotFound(path.display().to_string()));
    }

    let df = CsvReader::from_path(path)?
        .has_header(true)
        .finish()?;

    Ok(df)
}

pub fn write_csv<P: AsRef<Path>>(path: P, records: &[ObservationRecord]) -> SimResult<()> {
    let mut df = records_to_frame(records)?;
    let mut file = File::create(path.as_ref())
        .map_err(|e| SimError::FileWrite(format!("{}: {}", path.as_ref().display(), e)))?;

    CsvWriter::new(&mut file).finish(&mut df)?;
    Ok(())
}

pub fn write_json<P: AsRef<Path>>(path: P, records: &[ObservationRecord]) -> SimResult<()> {
    let file = File::create(path.as_ref())
        .map_err(|e| SimError::FileWrite(format!("{}: {}", path.as_ref().display(), e)))?;

    serde_json::to_writer_pretty(BufWriter::new(file), records)?;
    Ok(())
}

pub fn read_json<P: AsRef<Path>>(path: P) -> SimResult<Vec<ObservationRecord>> {
    let file = File::open(path.as_ref())?;
    let records = serde_json::from_reader(BufReader::new(file))?;
    Ok(records)
}

/// Load records from a CSV or JSON file, picking the format from the extension
pub fn read_records<P: AsRef<Path>>(path: P) -> SimResult<Vec<ObservationRecord>> {
    let path = path.as_ref();
    match format_for_path(path) {
        OutputFormat::Json => read_json(path),
        OutputFormat::Csv => frame_to_records(&read_csv_frame(path)?),
    }
}

pub fn write_records<P: AsRef<Path>>(path: P, format: OutputFormat, records: &[ObservationRecord]) -> SimResult<()> {
    match format {
        OutputFormat::Csv => write_csv(path.as_ref(), records)?,
        OutputFormat::Json => write_json(path.as_ref(), records)?,
    }

    info!("💾 Wrote {} records to {}", records.len(), path.as_ref().display());
    Ok(())
}

pub fn format_for_path(path: &Path) -> OutputFormat {
    match path.extension().and_then(|e| e.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("json") => OutputFormat::Json,
        _ => OutputFormat::Csv,
    }
}

/// File name used for a single country's download, e.g. `Japan_mobile_data.csv`
pub fn country_export_path(dir: &Path, country: &str) -> PathBuf {
    dir.join(format!("{}_mobile_data.csv", country))
}
