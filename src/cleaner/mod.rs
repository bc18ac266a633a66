//! Row validation, coercion and deduplication.
//!
//! Converts raw rows into [`SalesRecord`]s under the cleaning policy:
//!
//! - missing or unparseable numeric fields drop the row
//! - unparseable dates drop the row
//! - negative quantity or price drops the row
//! - duplicate `order_id` keeps the first occurrence, drops the rest
//!
//! Dropping is always per-row: cleaning itself never fails. Every drop is
//! tallied by reason in a [`CleanReport`], which also keeps a few sample
//! [`RowError`]s for the text summary. Cleaning an already-clean dataset
//! drops zero rows.

use std::collections::{BTreeMap, HashSet};
use std::path::Path;

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use rust_decimal::Decimal;

use crate::error::ExportResult;
use crate::loader::{RawRow, RawTable};
use crate::models::{DropReason, SalesRecord};

/// How many sample row errors the report keeps.
const MAX_SAMPLES: usize = 5;

/// Everything that is not a digit, decimal point or sign.
static NON_NUMERIC: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^0-9.\-]").unwrap());

// =============================================================================
// Row Errors
// =============================================================================

/// A dropped row with context for the summary report.
#[derive(Debug, Clone)]
pub struct RowError {
    /// 1-based line number in the input file (header is line 1).
    pub line: usize,
    /// Offending column, when one can be named.
    pub column: Option<String>,
    /// Offending raw value, when one exists.
    pub value: Option<String>,
    /// Why the row was dropped.
    pub reason: DropReason,
}

impl RowError {
    fn new(line: usize, reason: DropReason) -> Self {
        Self {
            line,
            column: None,
            value: None,
            reason,
        }
    }

    fn with_column(mut self, column: impl Into<String>) -> Self {
        self.column = Some(column.into());
        self
    }

    fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }
}

impl std::fmt::Display for RowError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match (&self.column, &self.value) {
            (Some(col), Some(val)) => write!(
                f,
                "line {}, column '{}' (value '{}'): {}",
                self.line, col, val, self.reason
            ),
            (Some(col), None) => write!(f, "line {}, column '{}': {}", self.line, col, self.reason),
            _ => write!(f, "line {}: {}", self.line, self.reason),
        }
    }
}

// =============================================================================
// Clean Report
// =============================================================================

/// Outcome of a cleaning pass.
#[derive(Debug, Clone, Default)]
pub struct CleanReport {
    /// Raw rows considered.
    pub input_rows: usize,
    /// Rows that became records.
    pub kept: usize,
    /// Rows dropped.
    pub dropped: usize,
    /// Drop count per reason label, deterministically ordered.
    pub reasons: BTreeMap<String, usize>,
    /// Up to [`MAX_SAMPLES`] example row errors.
    pub samples: Vec<RowError>,
}

impl CleanReport {
    fn record_drop(&mut self, error: RowError) {
        self.dropped += 1;
        *self.reasons.entry(error.reason.to_string()).or_insert(0) += 1;
        if self.samples.len() < MAX_SAMPLES {
            self.samples.push(error);
        }
    }
}

// =============================================================================
// Field Parsing
// =============================================================================

/// Parse a money-like value (`1,234.50`, `$99`) into a Decimal.
pub fn parse_money(raw: &str) -> Option<Decimal> {
    let stripped = NON_NUMERIC.replace_all(raw.trim(), "");
    match stripped.as_ref() {
        "" | "-" | "." | "-." => None,
        s => s.parse::<Decimal>().ok(),
    }
}

/// Parse a quantity into a signed integer (sign checked by the caller).
pub fn parse_quantity(raw: &str) -> Option<i64> {
    raw.trim().parse::<i64>().ok()
}

/// Date formats accepted in raw input.
const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y"];

/// Parse a date in any accepted format.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
}

// =============================================================================
// Cleaning
// =============================================================================

/// Clean a raw table into validated records plus a drop report.
pub fn clean(table: &RawTable) -> (Vec<SalesRecord>, CleanReport) {
    let mut records = Vec::with_capacity(table.rows.len());
    let mut report = CleanReport {
        input_rows: table.rows.len(),
        ..CleanReport::default()
    };
    let mut seen_ids: HashSet<String> = HashSet::new();

    for (index, row) in table.rows.iter().enumerate() {
        // +1 for 0-index, +1 for the header line
        let line = index + 2;
        match clean_row(row, line, &mut seen_ids) {
            Ok(record) => records.push(record),
            Err(error) => report.record_drop(*error),
        }
    }

    report.kept = records.len();
    (records, report)
}

fn clean_row(
    row: &RawRow,
    line: usize,
    seen_ids: &mut HashSet<String>,
) -> Result<SalesRecord, Box<RowError>> {
    let order_id = required(row, "order_id", line)?;
    let customer = required(row, "customer", line)?;
    let product = required(row, "product", line)?;

    let quantity_raw = required(row, "quantity", line)?;
    let quantity = parse_quantity(&quantity_raw).ok_or_else(|| {
        Box::new(
            RowError::new(line, DropReason::InvalidQuantity)
                .with_column("quantity")
                .with_value(&*quantity_raw),
        )
    })?;
    let quantity = u32::try_from(quantity).map_err(|_| {
        Box::new(
            RowError::new(line, DropReason::InvalidQuantity)
                .with_column("quantity")
                .with_value(&*quantity_raw),
        )
    })?;

    let price_raw = required(row, "unit_price", line)?;
    let unit_price = parse_money(&price_raw)
        .filter(|price| !price.is_sign_negative())
        .ok_or_else(|| {
            Box::new(
                RowError::new(line, DropReason::InvalidPrice)
                    .with_column("unit_price")
                    .with_value(&*price_raw),
            )
        })?;

    let date_raw = required(row, "date", line)?;
    let date = parse_date(&date_raw).ok_or_else(|| {
        Box::new(
            RowError::new(line, DropReason::InvalidDate)
                .with_column("date")
                .with_value(&*date_raw),
        )
    })?;

    if !seen_ids.insert(order_id.clone()) {
        return Err(Box::new(
            RowError::new(line, DropReason::DuplicateOrderId)
                .with_column("order_id")
                .with_value(&*order_id),
        ));
    }

    let region = row
        .get("region")
        .map(|r| r.trim())
        .filter(|r| !r.is_empty())
        .map(String::from);

    Ok(SalesRecord {
        order_id,
        customer,
        product,
        quantity,
        unit_price,
        date,
        region,
    })
}

/// Fetch a required column, trimmed; empty or absent is a drop.
fn required(row: &RawRow, column: &str, line: usize) -> Result<String, Box<RowError>> {
    match row.get(column).map(|v| v.trim()) {
        Some(value) if !value.is_empty() => Ok(value.to_string()),
        _ => Err(Box::new(
            RowError::new(line, DropReason::MissingField(column.to_string()))
                .with_column(column),
        )),
    }
}

// =============================================================================
// Persistence
// =============================================================================

/// Write the cleaned dataset as comma-delimited CSV with the canonical header.
pub fn write_clean(path: &Path, records: &[SalesRecord]) -> ExportResult<()> {
    let mut writer = csv::Writer::from_path(path)?;
    for record in records {
        writer.serialize(record)?;
    }
    writer.flush()?;
    Ok(())
}
