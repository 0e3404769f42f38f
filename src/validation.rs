//! Schema validation for market record tables
//!
//! Checks a record table (a CSV file or an in-memory frame) against the
//! seven-column contract. Structural and type problems are critical and fail
//! validation; missing values only produce warnings.

use chrono::NaiveDate;
use polars::prelude::*;
use std::path::Path;
use tracing::{debug, error, info, warn};

use crate::export::{read_csv_frame, records_to_frame};
use crate::types::{
    ObservationRecord, COLUMN_BRAND, COLUMN_COUNTRY, COLUMN_DATE, COLUMN_MARKET_SHARE, COLUMN_OS,
    COLUMN_USAGE, COLUMN_USERS, DATE_FORMAT, REQUIRED_COLUMNS,
};

/// File names tried, in order, when no file is given
pub const DEFAULT_CANDIDATES: [&str; 3] = ["sample_mobile_data.csv", "mobile_data.csv", "data.csv"];

/// Validation result with detailed findings
#[derive(Debug, Clone)]
pub struct ValidationResult {
    pub passed: bool,
    pub checks: Vec<ValidationCheck>,
    pub missing_counts: Vec<(String, usize)>,
}

#[derive(Debug, Clone)]
pub struct ValidationCheck {
    pub name: String,
    pub passed: bool,
    pub message: String,
    pub level: ValidationLevel,
    pub kind: CheckKind,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ValidationLevel {
    Critical, // Must pass for the table to be accepted
    Warning,  // Reported, table still accepted
    Info,     // Informational only
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckKind {
    File,
    Structure,
    Type,
    Completeness,
    Summary,
}

impl ValidationCheck {
    fn pass(name: &str, message: impl Into<String>, level: ValidationLevel, kind: CheckKind) -> Self {
        ValidationCheck {
            name: name.to_string(),
            passed: true,
            message: message.into(),
            level,
            kind,
        }
    }

    fn fail(name: &str, message: impl Into<String>, level: ValidationLevel, kind: CheckKind) -> Self {
        ValidationCheck {
            name: name.to_string(),
            passed: false,
            message: message.into(),
            level,
            kind,
        }
    }
}

impl ValidationResult {
    pub fn new() -> Self {
        ValidationResult {
            passed: true,
            checks: Vec::new(),
            missing_counts: Vec::new(),
        }
    }

    pub fn add_check(&mut self, check: ValidationCheck) {
        if !check.passed && check.level == ValidationLevel::Critical {
            self.passed = false;
        }
        self.checks.push(check);
    }

    pub fn critical_failures(&self) -> Vec<&ValidationCheck> {
        self.checks
            .iter()
            .filter(|c| !c.passed && c.level == ValidationLevel::Critical)
            .collect()
    }

    pub fn warnings(&self) -> Vec<&ValidationCheck> {
        self.checks
            .iter()
            .filter(|c| !c.passed && c.level == ValidationLevel::Warning)
            .collect()
    }

    pub fn checks_of(&self, kind: CheckKind) -> impl Iterator<Item = &ValidationCheck> {
        self.checks.iter().filter(move |c| c.kind == kind)
    }

    pub fn missing_count(&self, column: &str) -> Option<usize> {
        self.missing_counts
            .iter()
            .find(|(name, _)| name == column)
            .map(|&(_, count)| count)
    }

    pub fn display(&self) {
        info!("🔍 Schema Validation");
        info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

        for check in &self.checks {
            let icon = if check.passed {
                "✅"
            } else {
                match check.level {
                    ValidationLevel::Critical => "❌",
                    ValidationLevel::Warning => "⚠️",
                    ValidationLevel::Info => "ℹ️",
                }
            };

            info!("{} {:20} - {}", icon, check.name, check.message);
        }

        info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

        if !self.passed {
            let failures = self.critical_failures();
            error!("❌ VALIDATION FAILED: {} critical issue(s)", failures.len());
            for failure in failures {
                error!("   • {}: {}", failure.name, failure.message);
            }
        } else {
            let warnings = self.warnings();
            if !warnings.is_empty() {
                warn!("⚠️  {} warning(s) detected", warnings.len());
                for warning in warnings {
                    warn!("   • {}: {}", warning.name, warning.message);
                }
            }
            info!("✅ VALIDATION SUCCESSFUL");
        }
    }
}

impl Default for ValidationResult {
    fn default() -> Self {
        Self::new()
    }
}

/// First existing file among the conventional names in `dir`
pub fn find_default_file(dir: &Path) -> Option<std::path::PathBuf> {
    DEFAULT_CANDIDATES
        .iter()
        .map(|name| dir.join(name))
        .find(|path| path.exists())
}

/// Validator for the seven-column record table. Never mutates its input.
#[derive(Debug, Clone, Default)]
pub struct SchemaValidator;

impl SchemaValidator {
    pub fn new() -> Self {
        SchemaValidator
    }

    /// Load a CSV file and run the full suite
    pub fn validate_file<P: AsRef<Path>>(&self, path: P) -> ValidationResult {
        let path = path.as_ref();
        let mut result = ValidationResult::new();

        info!("📋 Validating file: {}", path.display());

        if !path.exists() {
            result.add_check(ValidationCheck::fail(
                "File",
                format!("'{}' not found", path.display()),
                ValidationLevel::Critical,
                CheckKind::File,
            ));
            return result;
        }

        let df = match read_csv_frame(path) {
            Ok(df) => df,
            Err(e) => {
                result.add_check(ValidationCheck::fail(
                    "File",
                    format!("Failed to load: {}", e),
                    ValidationLevel::Critical,
                    CheckKind::File,
                ));
                return result;
            }
        };

        result.add_check(ValidationCheck::pass(
            "File",
            format!("Loaded {} rows × {} columns", df.height(), df.width()),
            ValidationLevel::Info,
            CheckKind::File,
        ));
        debug!("Sample data (first 5 rows):\n{}", df.head(Some(5)));

        self.validate_into(&df, &mut result);
        result
    }

    /// Validate generator output through its tabular form
    pub fn validate_records(&self, records: &[ObservationRecord]) -> ValidationResult {
        match records_to_frame(records) {
            Ok(df) => self.validate_frame(&df),
            Err(e) => {
                let mut result = ValidationResult::new();
                result.add_check(ValidationCheck::fail(
                    "Frame",
                    format!("Failed to build table: {}", e),
                    ValidationLevel::Critical,
                    CheckKind::File,
                ));
                result
            }
        }
    }

    pub fn validate_frame(&self, df: &DataFrame) -> ValidationResult {
        let mut result = ValidationResult::new();
        self.validate_into(df, &mut result);
        result
    }

    fn validate_into(&self, df: &DataFrame, result: &mut ValidationResult) {
        // Structural checks; nothing else is meaningful without every column
        let present = df.get_column_names();
        let mut all_present = true;
        for column in REQUIRED_COLUMNS {
            if present.contains(&column) {
                result.add_check(ValidationCheck::pass(column, "Found", ValidationLevel::Info, CheckKind::Structure));
            } else {
                all_present = false;
                result.add_check(ValidationCheck::fail(
                    column,
                    format!("MISSING (found: {})", present.join(", ")),
                    ValidationLevel::Critical,
                    CheckKind::Structure,
                ));
            }
        }

        if !all_present {
            return;
        }

        // Type checks
        for column in [COLUMN_COUNTRY, COLUMN_BRAND, COLUMN_OS] {
            result.add_check(check_text_column(df, column));
        }
        match check_date_column(df) {
            Ok(range) => {
                result.add_check(ValidationCheck::pass(
                    COLUMN_DATE,
                    "Date (YYYY-MM-DD)",
                    ValidationLevel::Info,
                    CheckKind::Type,
                ));
                if let Some((first, last)) = range {
                    result.add_check(ValidationCheck::pass(
                        "Date Range",
                        format!("{} to {}", first, last),
                        ValidationLevel::Info,
                        CheckKind::Summary,
                    ));
                }
            }
            Err(check) => result.add_check(check),
        }
        for column in [COLUMN_MARKET_SHARE, COLUMN_USERS, COLUMN_USAGE] {
            result.add_check(check_numeric_column(df, column));
        }

        // Completeness checks
        let rows = df.height();
        for column in REQUIRED_COLUMNS {
            let missing = df.column(column).map(|s| s.null_count()).unwrap_or(rows);
            result.missing_counts.push((column.to_string(), missing));

            if missing > 0 {
                let pct = missing as f64 / rows.max(1) as f64 * 100.0;
                result.add_check(ValidationCheck::fail(
                    column,
                    format!("{} missing values ({:.1}%)", missing, pct),
                    ValidationLevel::Warning,
                    CheckKind::Completeness,
                ));
            } else {
                result.add_check(ValidationCheck::pass(
                    column,
                    "No missing values",
                    ValidationLevel::Info,
                    CheckKind::Completeness,
                ));
            }
        }

        // Summary
        for (label, column) in [
            ("Unique Countries", COLUMN_COUNTRY),
            ("Unique Brands", COLUMN_BRAND),
            ("Unique OS", COLUMN_OS),
        ] {
            if let Ok(count) = df.column(column).and_then(|s| s.n_unique()) {
                result.add_check(ValidationCheck::pass(
                    label,
                    count.to_string(),
                    ValidationLevel::Info,
                    CheckKind::Summary,
                ));
            }
        }
        result.add_check(ValidationCheck::pass(
            "Records",
            rows.to_string(),
            ValidationLevel::Info,
            CheckKind::Summary,
        ));
    }
}

fn check_text_column(df: &DataFrame, column: &str) -> ValidationCheck {
    let dtype = match df.column(column) {
        Ok(series) => series.dtype().clone(),
        Err(e) => return ValidationCheck::fail(column, e.to_string(), ValidationLevel::Critical, CheckKind::Type),
    };

    match dtype {
        DataType::Utf8 | DataType::Null => {
            ValidationCheck::pass(column, "Text", ValidationLevel::Info, CheckKind::Type)
        }
        other => ValidationCheck::fail(
            column,
            format!("Must contain only text values (found {})", other),
            ValidationLevel::Critical,
            CheckKind::Type,
        ),
    }
}

/// Ok(Some(range)) when every non-missing value is a calendar date
fn check_date_column(df: &DataFrame) -> Result<Option<(NaiveDate, NaiveDate)>, ValidationCheck> {
    let type_error = |message: String| {
        ValidationCheck::fail(COLUMN_DATE, message, ValidationLevel::Critical, CheckKind::Type)
    };

    let series = df.column(COLUMN_DATE).map_err(|e| type_error(e.to_string()))?;
    let temporal = match series.dtype() {
        DataType::Utf8 => false,
        DataType::Date | DataType::Datetime(_, _) => true,
        DataType::Null => return Ok(None),
        other => return Err(type_error(format!("Must be in YYYY-MM-DD format (found {})", other))),
    };

    let as_text = series.cast(&DataType::Utf8).map_err(|e| type_error(e.to_string()))?;
    let values = as_text.utf8().map_err(|e| type_error(e.to_string()))?;

    let mut range: Option<(NaiveDate, NaiveDate)> = None;
    let mut invalid = 0usize;
    let mut first_invalid = None;

    for value in values.into_iter().flatten() {
        // Temporal columns render with a time suffix; only the date part matters
        let text = if temporal { value.get(..10).unwrap_or(value) } else { value };
        match NaiveDate::parse_from_str(text.trim(), DATE_FORMAT) {
            Ok(date) => {
                range = Some(match range {
                    Some((lo, hi)) => (lo.min(date), hi.max(date)),
                    None => (date, date),
                });
            }
            Err(_) => {
                invalid += 1;
                first_invalid.get_or_insert_with(|| value.to_string());
            }
        }
    }

    if invalid > 0 {
        return Err(type_error(format!(
            "Must be in YYYY-MM-DD format ({} invalid, e.g. '{}')",
            invalid,
            first_invalid.unwrap_or_default()
        )));
    }

    Ok(range)
}

fn check_numeric_column(df: &DataFrame, column: &str) -> ValidationCheck {
    let series = match df.column(column) {
        Ok(series) => series,
        Err(e) => return ValidationCheck::fail(column, e.to_string(), ValidationLevel::Critical, CheckKind::Type),
    };

    let dtype = series.dtype();
    if dtype.is_numeric() || *dtype == DataType::Null {
        return ValidationCheck::pass(column, "Numeric", ValidationLevel::Info, CheckKind::Type);
    }

    if *dtype != DataType::Utf8 {
        return ValidationCheck::fail(
            column,
            format!("Must contain only numeric values (found {})", dtype),
            ValidationLevel::Critical,
            CheckKind::Type,
        );
    }

    // Non-strict cast turns unparseable text into nulls
    match series.cast(&DataType::Float64) {
        Ok(parsed) if parsed.null_count() == series.null_count() => {
            ValidationCheck::pass(column, "Numeric (parsed from text)", ValidationLevel::Info, CheckKind::Type)
        }
        Ok(parsed) => ValidationCheck::fail(
            column,
            format!(
                "Must contain only numeric values ({} unparseable)",
                parsed.null_count() - series.null_count()
            ),
            ValidationLevel::Critical,
            CheckKind::Type,
        ),
        Err(e) => ValidationCheck::fail(column, e.to_string(), ValidationLevel::Critical, CheckKind::Type),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(dates: &[Option<&str>], shares: &[&str]) -> DataFrame {
        let n = dates.len();
        DataFrame::new(vec![
            Series::new(COLUMN_COUNTRY, vec!["Japan"; n]),
            Series::new(COLUMN_DATE, dates.to_vec()),
            Series::new(COLUMN_BRAND, vec!["Sharp"; n]),
            Series::new(COLUMN_OS, vec!["Android"; n]),
            Series::new(COLUMN_MARKET_SHARE, shares.to_vec()),
            Series::new(COLUMN_USERS, vec![9.7; n]),
            Series::new(COLUMN_USAGE, vec![4.2; n]),
        ])
        .unwrap()
    }

    #[test]
    fn test_validation_result() {
        let mut result = ValidationResult::new();
        assert!(result.passed);

        result.add_check(ValidationCheck::fail("Gap", "missing", ValidationLevel::Warning, CheckKind::Completeness));
        assert!(result.passed);
        assert_eq!(result.warnings().len(), 1);

        result.add_check(ValidationCheck::fail("Fail", "Failed", ValidationLevel::Critical, CheckKind::Type));
        assert!(!result.passed);
        assert_eq!(result.critical_failures().len(), 1);
    }

    #[test]
    fn test_text_numbers_are_accepted() {
        let df = frame(&[Some("2024-01-01"), Some("2024-01-31")], &["1.5", "7.25"]);
        let result = SchemaValidator::new().validate_frame(&df);
        assert!(result.passed, "{:?}", result.critical_failures());
    }

    #[test]
    fn test_unparseable_number_fails() {
        let df = frame(&[Some("2024-01-01"), Some("2024-01-31")], &["1.5", "lots"]);
        let result = SchemaValidator::new().validate_frame(&df);
        assert!(!result.passed);
        let failures = result.critical_failures();
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].name, COLUMN_MARKET_SHARE);
        assert_eq!(failures[0].kind, CheckKind::Type);
    }

    #[test]
    fn test_bad_date_fails() {
        let df = frame(&[Some("2024-01-01"), Some("31/01/2024")], &["1.5", "2.0"]);
        let result = SchemaValidator::new().validate_frame(&df);
        assert!(!result.passed);
        assert_eq!(result.critical_failures()[0].name, COLUMN_DATE);
    }

    #[test]
    fn test_missing_values_only_warn() {
        let df = frame(&[Some("2024-01-01"), None], &["1.5", "2.0"]);
        let result = SchemaValidator::new().validate_frame(&df);
        assert!(result.passed);
        assert_eq!(result.missing_count(COLUMN_DATE), Some(1));
        assert_eq!(result.missing_count(COLUMN_COUNTRY), Some(0));
        assert_eq!(result.warnings().len(), 1);
    }

    #[test]
    fn test_missing_column_is_structural() {
        let df = frame(&[Some("2024-01-01")], &["1.5"]).drop(COLUMN_OS).unwrap();
        let result = SchemaValidator::new().validate_frame(&df);
        assert!(!result.passed);
        assert_eq!(result.checks_of(CheckKind::Type).count(), 0);
        let failures = result.critical_failures();
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].kind, CheckKind::Structure);
    }

    #[test]
    fn test_numeric_text_column_fails() {
        let df = DataFrame::new(vec![
            Series::new(COLUMN_COUNTRY, &[1i64, 2]),
            Series::new(COLUMN_DATE, &["2024-01-01", "2024-01-31"]),
            Series::new(COLUMN_BRAND, &["A", "B"]),
            Series::new(COLUMN_OS, &["Android", "iOS"]),
            Series::new(COLUMN_MARKET_SHARE, &[1.0, 2.0]),
            Series::new(COLUMN_USERS, &[1.0, 2.0]),
            Series::new(COLUMN_USAGE, &[3.0, 4.0]),
        ])
        .unwrap();
        let result = SchemaValidator::new().validate_frame(&df);
        assert!(!result.passed);
        assert_eq!(result.critical_failures()[0].name, COLUMN_COUNTRY);
    }

    #[test]
    fn test_missing_file() {
        let result = SchemaValidator::new().validate_file("definitely/not/here.csv");
        assert!(!result.passed);
        assert_eq!(result.critical_failures()[0].kind, CheckKind::File);
    }
}
