//! Descriptive analytics over the cleaned dataset.
//!
//! Everything here is a pure function of the input slice: no hidden state,
//! no I/O. Aggregation maps are `BTreeMap`s so that iteration order, and
//! therefore every downstream export, is deterministic. Ranking ties are
//! broken by ascending lexical order of the grouping key.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::Serialize;

use crate::error::{AnalyticsError, AnalyticsResult};
use crate::models::{Granularity, SalesRecord};

/// Label used when a record carries no region.
pub const NO_REGION: &str = "(unspecified)";

/// How many outlier orders the report lists.
const MAX_OUTLIERS: usize = 5;

// =============================================================================
// Report Structures
// =============================================================================

/// One entry of a revenue ranking.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedEntry {
    /// 1-based rank.
    pub rank: usize,
    /// Grouping key (customer, product or region name).
    pub key: String,
    /// Total revenue for the key over the whole dataset.
    pub revenue: Decimal,
}

/// Revenue for one time bucket.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BucketRevenue {
    /// Bucket key (e.g. `2024-01`), chronologically ordered.
    pub bucket: String,
    pub revenue: Decimal,
    /// Percent change vs the previous bucket; `None` for the first bucket
    /// or when the previous bucket had zero revenue.
    pub growth_pct: Option<Decimal>,
}

/// Customer count in one lifetime-value tier.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SegmentCount {
    /// Tier label, lowest quartile first (`Bronze` .. `Platinum`).
    pub tier: String,
    /// Customers whose lifetime value falls in the tier.
    pub customers: usize,
}

/// An unusually large order flagged by the IQR fence.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutlierOrder {
    pub order_id: String,
    pub customer: String,
    pub line_total: Decimal,
}

/// IQR-based outlier detection result.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Outliers {
    /// Upper fence: `Q3 + 1.5 * IQR` over line totals.
    pub upper_fence: Decimal,
    /// Orders above the fence, largest first, capped.
    pub orders: Vec<OutlierOrder>,
    /// Total count above the fence (may exceed `orders.len()`).
    pub count: usize,
}

/// The full output of the analyzer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalyticsReport {
    pub total_revenue: Decimal,
    pub total_quantity: u64,
    pub order_count: usize,
    pub unique_customers: usize,
    /// Revenue divided by order count.
    pub average_order_value: Decimal,
    /// Share of customers with more than one order, in percent.
    pub repeat_customer_rate_pct: Decimal,
    pub top_customers: Vec<RankedEntry>,
    pub top_products: Vec<RankedEntry>,
    /// Customers per lifetime-value quartile tier; empty below four customers.
    pub segmentation: Vec<SegmentCount>,
    pub revenue_by_bucket: Vec<BucketRevenue>,
    pub revenue_by_region: Vec<RankedEntry>,
    pub outliers: Outliers,
}

// =============================================================================
// Aggregation
// =============================================================================

/// Sum line totals per key.
fn revenue_by<F>(records: &[SalesRecord], key: F) -> BTreeMap<String, Decimal>
where
    F: Fn(&SalesRecord) -> String,
{
    let mut totals: BTreeMap<String, Decimal> = BTreeMap::new();
    for record in records {
        *totals.entry(key(record)).or_insert(Decimal::ZERO) += record.line_total();
    }
    totals
}

/// Rank a revenue map descending, ties broken by ascending key.
///
/// `top_n = None` keeps every entry (used for the region breakdown).
pub fn rank_revenue(totals: BTreeMap<String, Decimal>, top_n: Option<usize>) -> Vec<RankedEntry> {
    let mut entries: Vec<(String, Decimal)> = totals.into_iter().collect();
    entries.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    if let Some(n) = top_n {
        entries.truncate(n);
    }
    entries
        .into_iter()
        .enumerate()
        .map(|(i, (key, revenue))| RankedEntry {
            rank: i + 1,
            key,
            revenue,
        })
        .collect()
}

/// Linear-interpolated percentile of a sorted, non-empty slice.
///
/// `p` is in `[0, 1]`.
fn percentile(sorted: &[Decimal], p: Decimal) -> Decimal {
    use rust_decimal::prelude::ToPrimitive;

    let pos = p * Decimal::from(sorted.len() - 1);
    let lower = pos.floor();
    let frac = pos - lower;
    let idx = lower.to_usize().unwrap_or(0);
    if idx + 1 >= sorted.len() {
        return sorted[sorted.len() - 1];
    }
    sorted[idx] + (sorted[idx + 1] - sorted[idx]) * frac
}

/// Lifetime-value tier labels, lowest quartile first.
const TIERS: [&str; 4] = ["Bronze", "Silver", "Gold", "Platinum"];

/// Segment customers into quartile tiers by lifetime value (total revenue).
///
/// Quartile cuts need at least four customers; below that the result is
/// empty and the summary omits the section.
fn segment_customers(customer_ltv: &BTreeMap<String, Decimal>) -> Vec<SegmentCount> {
    if customer_ltv.len() < 4 {
        return Vec::new();
    }

    let mut sorted: Vec<Decimal> = customer_ltv.values().copied().collect();
    sorted.sort();
    let q1 = percentile(&sorted, Decimal::new(25, 2));
    let q2 = percentile(&sorted, Decimal::new(50, 2));
    let q3 = percentile(&sorted, Decimal::new(75, 2));

    // Quartile bins are upper-inclusive: a value on a cut stays in the
    // lower tier.
    let mut counts = [0usize; 4];
    for &value in customer_ltv.values() {
        let tier = if value <= q1 {
            0
        } else if value <= q2 {
            1
        } else if value <= q3 {
            2
        } else {
            3
        };
        counts[tier] += 1;
    }

    TIERS
        .iter()
        .zip(counts)
        .map(|(tier, customers)| SegmentCount {
            tier: (*tier).to_string(),
            customers,
        })
        .collect()
}

/// Flag unusually large orders: line totals above `Q3 + 1.5 * IQR`.
fn detect_outliers(records: &[SalesRecord]) -> Outliers {
    let mut totals: Vec<Decimal> = records.iter().map(SalesRecord::line_total).collect();
    totals.sort();

    let q1 = percentile(&totals, Decimal::new(25, 2));
    let q3 = percentile(&totals, Decimal::new(75, 2));
    let upper_fence = q3 + Decimal::new(15, 1) * (q3 - q1);

    let mut orders: Vec<OutlierOrder> = records
        .iter()
        .filter(|r| r.line_total() > upper_fence)
        .map(|r| OutlierOrder {
            order_id: r.order_id.clone(),
            customer: r.customer.clone(),
            line_total: r.line_total(),
        })
        .collect();
    orders.sort_by(|a, b| {
        b.line_total
            .cmp(&a.line_total)
            .then_with(|| a.order_id.cmp(&b.order_id))
    });

    let count = orders.len();
    orders.truncate(MAX_OUTLIERS);
    Outliers {
        upper_fence,
        orders,
        count,
    }
}

/// Compute the full analytics report.
///
/// # Errors
///
/// [`AnalyticsError::EmptyDataset`] when `records` is empty — there is
/// nothing meaningful to report and the pipeline must abort.
pub fn analyze(
    records: &[SalesRecord],
    top_n: usize,
    granularity: Granularity,
) -> AnalyticsResult<AnalyticsReport> {
    if records.is_empty() {
        return Err(AnalyticsError::EmptyDataset);
    }

    let total_revenue: Decimal = records.iter().map(SalesRecord::line_total).sum();
    let total_quantity: u64 = records.iter().map(|r| u64::from(r.quantity)).sum();
    let order_count = records.len();
    let average_order_value = total_revenue / Decimal::from(order_count as u64);

    // Orders per customer drives both the ranking and the repeat rate.
    let mut orders_per_customer: BTreeMap<&str, usize> = BTreeMap::new();
    for record in records {
        *orders_per_customer.entry(record.customer.as_str()).or_insert(0) += 1;
    }
    let unique_customers = orders_per_customer.len();
    let repeat_customers = orders_per_customer.values().filter(|&&n| n > 1).count();
    let repeat_customer_rate_pct = Decimal::from(repeat_customers as u64)
        / Decimal::from(unique_customers as u64)
        * Decimal::from(100);

    let customer_ltv = revenue_by(records, |r| r.customer.clone());
    let segmentation = segment_customers(&customer_ltv);
    let top_customers = rank_revenue(customer_ltv, Some(top_n));
    let top_products = rank_revenue(revenue_by(records, |r| r.product.clone()), Some(top_n));
    let revenue_by_region = rank_revenue(
        revenue_by(records, |r| {
            r.region.clone().unwrap_or_else(|| NO_REGION.to_string())
        }),
        None,
    );

    // Bucket keys sort chronologically, so the BTreeMap walk is the timeline.
    let bucket_totals = revenue_by(records, |r| granularity.bucket_key(r.date));
    let mut revenue_by_bucket = Vec::with_capacity(bucket_totals.len());
    let mut previous: Option<Decimal> = None;
    for (bucket, revenue) in bucket_totals {
        let growth_pct = previous
            .filter(|prev| !prev.is_zero())
            .map(|prev| (revenue - prev) / prev * Decimal::from(100));
        revenue_by_bucket.push(BucketRevenue {
            bucket,
            revenue,
            growth_pct,
        });
        previous = Some(revenue);
    }

    Ok(AnalyticsReport {
        total_revenue,
        total_quantity,
        order_count,
        unique_customers,
        average_order_value,
        repeat_customer_rate_pct,
        top_customers,
        top_products,
        segmentation,
        revenue_by_bucket,
        revenue_by_region,
        outliers: detect_outliers(records),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn record(
        order_id: &str,
        customer: &str,
        product: &str,
        quantity: u32,
        unit_price: Decimal,
        date: (i32, u32, u32),
    ) -> SalesRecord {
        SalesRecord {
            order_id: order_id.into(),
            customer: customer.into(),
            product: product.into(),
            quantity,
            unit_price,
            date: NaiveDate::from_ymd_opt(date.0, date.1, date.2).unwrap(),
            region: None,
        }
    }

    /// The worked example: two orders, revenue 30, product X = 30, A = 20.
    #[test]
    fn test_worked_example() {
        let records = vec![
            record("1", "A", "X", 2, dec!(10.0), (2024, 1, 5)),
            record("2", "B", "X", 1, dec!(10.0), (2024, 2, 1)),
        ];
        let report = analyze(&records, 10, Granularity::Month).unwrap();

        assert_eq!(report.total_revenue, dec!(30.0));
        assert_eq!(report.top_products[0].key, "X");
        assert_eq!(report.top_products[0].revenue, dec!(30.0));
        assert_eq!(report.top_customers[0].key, "A");
        assert_eq!(report.top_customers[0].revenue, dec!(20.0));
        assert_eq!(report.total_quantity, 3);
        assert_eq!(report.average_order_value, dec!(15.0));
    }

    #[test]
    fn test_empty_dataset_is_an_error() {
        assert!(matches!(
            analyze(&[], 10, Granularity::Month),
            Err(AnalyticsError::EmptyDataset)
        ));
    }

    #[test]
    fn test_ranking_ties_broken_lexically() {
        let records = vec![
            record("1", "zeta", "P", 1, dec!(10), (2024, 1, 1)),
            record("2", "alpha", "P", 1, dec!(10), (2024, 1, 2)),
            record("3", "mid", "P", 1, dec!(20), (2024, 1, 3)),
        ];
        let report = analyze(&records, 10, Granularity::Month).unwrap();
        let keys: Vec<&str> = report.top_customers.iter().map(|e| e.key.as_str()).collect();
        assert_eq!(keys, vec!["mid", "alpha", "zeta"]);
        assert_eq!(report.top_customers[1].rank, 2);
    }

    #[test]
    fn test_top_n_truncates_after_full_sums() {
        let records = vec![
            record("1", "A", "P1", 1, dec!(5), (2024, 1, 1)),
            record("2", "A", "P1", 1, dec!(5), (2024, 1, 2)),
            record("3", "B", "P2", 1, dec!(7), (2024, 1, 3)),
            record("4", "C", "P3", 1, dec!(1), (2024, 1, 4)),
        ];
        let report = analyze(&records, 2, Granularity::Month).unwrap();

        assert_eq!(report.top_customers.len(), 2);
        // A's entry sums *all* of A's line totals, not just the kept rows.
        assert_eq!(report.top_customers[0].key, "A");
        assert_eq!(report.top_customers[0].revenue, dec!(10));
    }

    #[test]
    fn test_grouping_sums_match_line_totals() {
        let records = vec![
            record("1", "A", "X", 2, dec!(3.25), (2024, 1, 1)),
            record("2", "B", "X", 4, dec!(1.10), (2024, 1, 2)),
            record("3", "A", "Y", 1, dec!(9.99), (2024, 2, 3)),
        ];
        let report = analyze(&records, 10, Granularity::Month).unwrap();

        for entry in &report.top_customers {
            let expected: Decimal = records
                .iter()
                .filter(|r| r.customer == entry.key)
                .map(SalesRecord::line_total)
                .sum();
            assert_eq!(entry.revenue, expected);
        }

        let ranking_sum: Decimal = report.top_products.iter().map(|e| e.revenue).sum();
        assert_eq!(ranking_sum, report.total_revenue);
    }

    #[test]
    fn test_bucket_breakdown_and_growth() {
        let records = vec![
            record("1", "A", "X", 1, dec!(100), (2024, 1, 10)),
            record("2", "B", "X", 1, dec!(150), (2024, 2, 10)),
            record("3", "C", "X", 1, dec!(75), (2024, 3, 10)),
        ];
        let report = analyze(&records, 10, Granularity::Month).unwrap();
        let buckets = &report.revenue_by_bucket;

        assert_eq!(buckets.len(), 3);
        assert_eq!(buckets[0].bucket, "2024-01");
        assert_eq!(buckets[0].growth_pct, None);
        assert_eq!(buckets[1].growth_pct, Some(dec!(50)));
        assert_eq!(buckets[2].growth_pct, Some(dec!(-50)));
    }

    #[test]
    fn test_repeat_customer_rate() {
        let records = vec![
            record("1", "A", "X", 1, dec!(1), (2024, 1, 1)),
            record("2", "A", "X", 1, dec!(1), (2024, 1, 2)),
            record("3", "B", "X", 1, dec!(1), (2024, 1, 3)),
            record("4", "C", "X", 1, dec!(1), (2024, 1, 4)),
        ];
        let report = analyze(&records, 10, Granularity::Month).unwrap();
        // 1 repeat customer out of 3.
        assert_eq!(report.repeat_customer_rate_pct.round_dp(2), dec!(33.33));
    }

    #[test]
    fn test_region_breakdown_handles_missing() {
        let mut records = vec![
            record("1", "A", "X", 1, dec!(10), (2024, 1, 1)),
            record("2", "B", "X", 1, dec!(20), (2024, 1, 2)),
        ];
        records[0].region = Some("North".into());
        let report = analyze(&records, 10, Granularity::Month).unwrap();

        assert_eq!(report.revenue_by_region[0].key, NO_REGION);
        assert_eq!(report.revenue_by_region[1].key, "North");
    }

    #[test]
    fn test_segmentation_one_customer_per_tier() {
        // Distinct lifetime values 10 < 20 < 30 < 40: one customer lands in
        // each quartile tier.
        let records = vec![
            record("1", "A", "X", 1, dec!(10), (2024, 1, 1)),
            record("2", "B", "X", 1, dec!(20), (2024, 1, 2)),
            record("3", "C", "X", 1, dec!(30), (2024, 1, 3)),
            record("4", "D", "X", 1, dec!(40), (2024, 1, 4)),
        ];
        let report = analyze(&records, 10, Granularity::Month).unwrap();

        let tiers: Vec<&str> = report.segmentation.iter().map(|s| s.tier.as_str()).collect();
        assert_eq!(tiers, vec!["Bronze", "Silver", "Gold", "Platinum"]);
        assert!(report.segmentation.iter().all(|s| s.customers == 1));
    }

    #[test]
    fn test_segmentation_sums_lifetime_value_across_orders() {
        // E places two small orders; the tier is cut on the summed LTV.
        let records = vec![
            record("1", "A", "X", 1, dec!(10), (2024, 1, 1)),
            record("2", "B", "X", 1, dec!(20), (2024, 1, 2)),
            record("3", "C", "X", 1, dec!(30), (2024, 1, 3)),
            record("4", "E", "X", 1, dec!(35), (2024, 1, 4)),
            record("5", "E", "X", 1, dec!(35), (2024, 1, 5)),
        ];
        let report = analyze(&records, 10, Granularity::Month).unwrap();

        // LTVs 10, 20, 30, 70: E (70) is the lone Platinum customer.
        assert_eq!(report.segmentation[3].tier, "Platinum");
        assert_eq!(report.segmentation[3].customers, 1);
        let total: usize = report.segmentation.iter().map(|s| s.customers).sum();
        assert_eq!(total, report.unique_customers);
    }

    #[test]
    fn test_segmentation_needs_four_customers() {
        let records = vec![
            record("1", "A", "X", 1, dec!(10), (2024, 1, 1)),
            record("2", "B", "X", 1, dec!(20), (2024, 1, 2)),
            record("3", "C", "X", 1, dec!(30), (2024, 1, 3)),
        ];
        let report = analyze(&records, 10, Granularity::Month).unwrap();
        assert!(report.segmentation.is_empty());
    }

    #[test]
    fn test_outlier_detection() {
        let mut records: Vec<SalesRecord> = (0..20)
            .map(|i| record(&format!("{i}"), "A", "X", 1, dec!(10), (2024, 1, 1)))
            .collect();
        records.push(record("big", "B", "X", 100, dec!(10), (2024, 1, 2)));

        let report = analyze(&records, 10, Granularity::Month).unwrap();
        assert_eq!(report.outliers.count, 1);
        assert_eq!(report.outliers.orders[0].order_id, "big");
        assert!(report.outliers.upper_fence < dec!(1000));
    }

    #[test]
    fn test_percentile_interpolation() {
        let sorted = vec![dec!(1), dec!(2), dec!(3), dec!(4)];
        assert_eq!(percentile(&sorted, dec!(0)), dec!(1));
        assert_eq!(percentile(&sorted, dec!(1)), dec!(4));
        assert_eq!(percentile(&sorted, dec!(0.5)), dec!(2.5));
    }
}
