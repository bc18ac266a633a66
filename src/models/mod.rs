//! Domain models for the salescope pipeline.
//!
//! This module contains the core data structures used throughout the
//! pipeline:
//!
//! - [`SalesRecord`] - one validated sales transaction
//! - [`Granularity`] - time-bucket size for the revenue breakdown
//! - [`DropReason`] - why a raw row was rejected during cleaning
//!
//! Records are created by the cleaner and are read-only afterwards: the
//! analyzer, the sort/search demo and the exporters all take `&[SalesRecord]`.

use chrono::{Datelike, NaiveDate};
use clap::ValueEnum;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

// =============================================================================
// Sales Record
// =============================================================================

/// A single validated sales transaction.
///
/// Invariants (enforced by the cleaner, assumed everywhere else):
/// `order_id` is non-empty and unique within a cleaned dataset,
/// `quantity >= 0`, `unit_price >= 0`, `date` is a valid calendar date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SalesRecord {
    /// Unique order identifier.
    pub order_id: String,
    /// Customer name.
    pub customer: String,
    /// Product name.
    pub product: String,
    /// Units sold.
    pub quantity: u32,
    /// Price per unit.
    pub unit_price: Decimal,
    /// Transaction date.
    pub date: NaiveDate,
    /// Sales region, if recorded.
    pub region: Option<String>,
}

impl SalesRecord {
    /// Revenue contributed by this row: `quantity * unit_price`, exact.
    pub fn line_total(&self) -> Decimal {
        Decimal::from(self.quantity) * self.unit_price
    }
}

/// Canonical column order of the cleaned dataset.
pub const COLUMNS: [&str; 7] = [
    "order_id",
    "customer",
    "product",
    "quantity",
    "unit_price",
    "date",
    "region",
];

// =============================================================================
// Time Bucket Granularity
// =============================================================================

/// Bucket size for the time-based revenue breakdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    /// `YYYY-MM` buckets.
    #[default]
    Month,
    /// `YYYY-Qn` buckets.
    Quarter,
    /// `YYYY` buckets.
    Year,
}

impl Granularity {
    /// Render the bucket key for a date.
    ///
    /// Keys sort lexicographically in chronological order, which is what
    /// the breakdown relies on.
    pub fn bucket_key(&self, date: NaiveDate) -> String {
        match self {
            Granularity::Month => format!("{:04}-{:02}", date.year(), date.month()),
            Granularity::Quarter => {
                format!("{:04}-Q{}", date.year(), (date.month() - 1) / 3 + 1)
            }
            Granularity::Year => format!("{:04}", date.year()),
        }
    }
}

// =============================================================================
// Drop Reasons
// =============================================================================

/// Why a raw row was rejected during cleaning.
///
/// The display labels are stable: they key the drop tally in the clean
/// report and appear verbatim in the text summary.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum DropReason {
    /// A required column was empty or absent.
    MissingField(String),
    /// Quantity was not a non-negative integer.
    InvalidQuantity,
    /// Unit price was not a non-negative money value.
    InvalidPrice,
    /// Date did not parse in any accepted format.
    InvalidDate,
    /// An earlier row already used this order id.
    DuplicateOrderId,
}

impl std::fmt::Display for DropReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DropReason::MissingField(column) => write!(f, "missing {}", column),
            DropReason::InvalidQuantity => write!(f, "invalid quantity"),
            DropReason::InvalidPrice => write!(f, "invalid price"),
            DropReason::InvalidDate => write!(f, "invalid date"),
            DropReason::DuplicateOrderId => write!(f, "duplicate order_id"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn record(quantity: u32, unit_price: Decimal) -> SalesRecord {
        SalesRecord {
            order_id: "1001".into(),
            customer: "Acme".into(),
            product: "Widget".into(),
            quantity,
            unit_price,
            date: NaiveDate::from_ymd_opt(2024, 1, 5).unwrap(),
            region: None,
        }
    }

    #[test]
    fn test_line_total_exact() {
        assert_eq!(record(2, dec!(10.00)).line_total(), dec!(20.00));
        assert_eq!(record(3, dec!(0.10)).line_total(), dec!(0.30));
        assert_eq!(record(0, dec!(99.99)).line_total(), dec!(0.00));
    }

    #[test]
    fn test_bucket_keys() {
        let date = NaiveDate::from_ymd_opt(2024, 2, 1).unwrap();
        assert_eq!(Granularity::Month.bucket_key(date), "2024-02");
        assert_eq!(Granularity::Quarter.bucket_key(date), "2024-Q1");
        assert_eq!(Granularity::Year.bucket_key(date), "2024");

        let december = NaiveDate::from_ymd_opt(2023, 12, 31).unwrap();
        assert_eq!(Granularity::Quarter.bucket_key(december), "2023-Q4");
    }

    #[test]
    fn test_bucket_keys_sort_chronologically() {
        let a = Granularity::Month.bucket_key(NaiveDate::from_ymd_opt(2023, 12, 1).unwrap());
        let b = Granularity::Month.bucket_key(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        assert!(a < b);
    }

    #[test]
    fn test_drop_reason_labels() {
        assert_eq!(DropReason::InvalidQuantity.to_string(), "invalid quantity");
        assert_eq!(
            DropReason::MissingField("order_id".into()).to_string(),
            "missing order_id"
        );
        assert_eq!(DropReason::DuplicateOrderId.to_string(), "duplicate order_id");
    }
}
