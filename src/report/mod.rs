//! Plain-text summary and ranked CSV exports.
//!
//! The summary answers the predefined analytical questions and embeds the
//! cleaning tally and the benchmark table. Output is fully determined by
//! its inputs; no timestamps or absolute paths leak into the text (figure
//! and export names are listed relative to the output directory).

use std::fmt::Write as _;
use std::path::Path;

use rust_decimal::Decimal;

use crate::algorithms::BenchmarkReport;
use crate::analytics::{AnalyticsReport, RankedEntry};
use crate::cleaner::CleanReport;
use crate::error::ExportResult;

/// Render a section heading with an `=` underline, as in the summary file.
fn heading(out: &mut String, title: &str) {
    let _ = writeln!(out, "{title}");
    let _ = writeln!(out, "{}", "=".repeat(title.len()));
}

fn money(value: Decimal) -> String {
    format!("{:.2}", value.round_dp(2))
}

/// Build the complete summary report text.
pub fn render_summary(
    clean: &CleanReport,
    analytics: &AnalyticsReport,
    bench: Option<&BenchmarkReport>,
) -> String {
    let mut out = String::new();

    heading(&mut out, "Sales Analytics Summary");
    let _ = writeln!(out, "Orders: {}", analytics.order_count);
    let _ = writeln!(out, "Customers (unique): {}", analytics.unique_customers);
    let _ = writeln!(out, "Total revenue: {}", money(analytics.total_revenue));
    let _ = writeln!(out, "Total quantity: {}", analytics.total_quantity);
    let _ = writeln!(
        out,
        "Average order value: {}",
        money(analytics.average_order_value)
    );
    let _ = writeln!(
        out,
        "Repeat customer rate: {}%",
        money(analytics.repeat_customer_rate_pct)
    );
    let _ = writeln!(out);

    heading(&mut out, "Cleaning");
    let _ = writeln!(out, "Input rows: {}", clean.input_rows);
    let _ = writeln!(out, "Kept: {}", clean.kept);
    let _ = writeln!(out, "Dropped: {}", clean.dropped);
    for (reason, count) in &clean.reasons {
        let _ = writeln!(out, "  - {reason}: {count}");
    }
    if !clean.samples.is_empty() {
        let _ = writeln!(out, "Sample drops:");
        for sample in &clean.samples {
            let _ = writeln!(out, "  - {sample}");
        }
    }
    let _ = writeln!(out);

    heading(&mut out, "Top customers by revenue");
    write_ranking_lines(&mut out, &analytics.top_customers);
    let _ = writeln!(out);

    heading(&mut out, "Top products by revenue");
    write_ranking_lines(&mut out, &analytics.top_products);
    let _ = writeln!(out);

    heading(&mut out, "Revenue by region");
    write_ranking_lines(&mut out, &analytics.revenue_by_region);
    let _ = writeln!(out);

    heading(&mut out, "Revenue over time");
    for bucket in &analytics.revenue_by_bucket {
        match bucket.growth_pct {
            Some(growth) => {
                let _ = writeln!(
                    out,
                    "  - {}: {}  (growth {}%)",
                    bucket.bucket,
                    money(bucket.revenue),
                    money(growth)
                );
            }
            None => {
                let _ = writeln!(out, "  - {}: {}", bucket.bucket, money(bucket.revenue));
            }
        }
    }
    let _ = writeln!(out);

    heading(&mut out, "Outliers");
    let _ = writeln!(
        out,
        "Upper fence (Q3 + 1.5*IQR): {}",
        money(analytics.outliers.upper_fence)
    );
    let _ = writeln!(out, "Orders above fence: {}", analytics.outliers.count);
    for order in &analytics.outliers.orders {
        let _ = writeln!(
            out,
            "  - order {} | customer {} | amount {}",
            order.order_id,
            order.customer,
            money(order.line_total)
        );
    }

    if !analytics.segmentation.is_empty() {
        let _ = writeln!(out);
        heading(&mut out, "Customer segmentation (by lifetime value quartiles)");
        for segment in &analytics.segmentation {
            let _ = writeln!(out, "  - {}: {}", segment.tier, segment.customers);
        }
    }

    if let Some(bench) = bench {
        let _ = writeln!(out);
        out.push_str(&render_benchmark(bench));
    }

    out
}

/// Render the algorithmic-analysis section on its own (also used by the
/// `bench` subcommand).
pub fn render_benchmark(bench: &BenchmarkReport) -> String {
    let mut out = String::new();
    heading(&mut out, "Algorithmic Analysis");
    let _ = writeln!(
        out,
        "Custom merge sort (O(n log n), stable) vs built-in slice::sort,"
    );
    let _ = writeln!(
        out,
        "custom binary search (O(log n), leftmost match) vs slice::binary_search."
    );
    let _ = writeln!(out, "Averaged over {} trial(s) per size.", bench.trials);
    let _ = writeln!(out);
    let _ = writeln!(out, "Sort timings:");
    write_timing_table(&mut out, &bench.sort);
    let _ = writeln!(out);
    let _ = writeln!(out, "Search timings (per 1000 lookups):");
    write_timing_table(&mut out, &bench.search);
    out
}

fn write_ranking_lines(out: &mut String, entries: &[RankedEntry]) {
    for entry in entries {
        let _ = writeln!(
            out,
            "  {:>2}. {}: {}",
            entry.rank,
            entry.key,
            money(entry.revenue)
        );
    }
}

fn write_timing_table(out: &mut String, runs: &[crate::algorithms::TimingComparison]) {
    let _ = writeln!(
        out,
        "  {:>8}  {:>14}  {:>14}  {:>10}  {}",
        "n", "custom (s)", "builtin (s)", "ratio", "matches"
    );
    for run in runs {
        let ratio = run
            .ratio()
            .map_or_else(|| "n/a".to_string(), |r| format!("{r:.2}x"));
        let _ = writeln!(
            out,
            "  {:>8}  {:>14.6}  {:>14.6}  {:>10}  {}",
            run.n,
            run.custom_secs,
            run.builtin_secs,
            ratio,
            if run.output_matches { "yes" } else { "NO" }
        );
    }
}

/// Append the list of written exports and figures to the summary body.
pub fn render_manifest(exports: &[String], figures: &[String]) -> String {
    let mut out = String::new();
    heading(&mut out, "Exports");
    for name in exports {
        let _ = writeln!(out, "  - {name}");
    }
    let _ = writeln!(out);
    heading(&mut out, "Figures");
    for name in figures {
        let _ = writeln!(out, "  - {name}");
    }
    out
}

/// Write the summary text to a file.
pub fn write_report(path: &Path, body: &str) -> ExportResult<()> {
    std::fs::write(path, body)?;
    Ok(())
}

/// Write a ranked revenue export: rank, name, revenue.
pub fn write_ranking(path: &Path, entries: &[RankedEntry]) -> ExportResult<()> {
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(["rank", "name", "revenue"])?;
    for entry in entries {
        writer.write_record([
            entry.rank.to_string(),
            entry.key.clone(),
            money(entry.revenue),
        ])?;
    }
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::analyze;
    use crate::models::{Granularity, SalesRecord};
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn sample_records() -> Vec<SalesRecord> {
        vec![
            SalesRecord {
                order_id: "1".into(),
                customer: "A".into(),
                product: "X".into(),
                quantity: 2,
                unit_price: dec!(10.0),
                date: NaiveDate::from_ymd_opt(2024, 1, 5).unwrap(),
                region: Some("North".into()),
            },
            SalesRecord {
                order_id: "2".into(),
                customer: "B".into(),
                product: "X".into(),
                quantity: 1,
                unit_price: dec!(10.0),
                date: NaiveDate::from_ymd_opt(2024, 2, 1).unwrap(),
                region: None,
            },
        ]
    }

    #[test]
    fn test_summary_contains_key_metrics() {
        let records = sample_records();
        let analytics = analyze(&records, 10, Granularity::Month).unwrap();
        let clean = CleanReport {
            input_rows: 3,
            kept: 2,
            dropped: 1,
            ..CleanReport::default()
        };

        let text = render_summary(&clean, &analytics, None);
        assert!(text.contains("Total revenue: 30.00"));
        assert!(text.contains("Average order value: 15.00"));
        assert!(text.contains("1. X: 30.00"));
        assert!(text.contains("2024-01: 20.00"));
        assert!(text.contains("Dropped: 1"));
        // No benchmark section when bench results are absent, and no
        // segmentation below four customers.
        assert!(!text.contains("Algorithmic Analysis"));
        assert!(!text.contains("Customer segmentation"));
    }

    #[test]
    fn test_summary_lists_segmentation_tiers() {
        let records: Vec<SalesRecord> = (1u32..=4)
            .map(|i| SalesRecord {
                order_id: i.to_string(),
                customer: format!("C{i}"),
                product: "X".into(),
                quantity: i,
                unit_price: dec!(10.0),
                date: NaiveDate::from_ymd_opt(2024, 1, i).unwrap(),
                region: None,
            })
            .collect();
        let analytics = analyze(&records, 10, Granularity::Month).unwrap();

        let text = render_summary(&CleanReport::default(), &analytics, None);
        assert!(text.contains("Customer segmentation (by lifetime value quartiles)"));
        assert!(text.contains("  - Bronze: 1"));
        assert!(text.contains("  - Platinum: 1"));
    }

    #[test]
    fn test_summary_includes_benchmark_table() {
        let records = sample_records();
        let analytics = analyze(&records, 10, Granularity::Month).unwrap();
        let amounts: Vec<_> = records.iter().map(SalesRecord::line_total).collect();
        let bench = crate::algorithms::benchmark(&amounts, 1);

        let text = render_summary(&CleanReport::default(), &analytics, Some(&bench));
        assert!(text.contains("Algorithmic Analysis"));
        assert!(text.contains("custom (s)"));
        assert!(text.contains("yes"));
    }

    #[test]
    fn test_summary_is_deterministic() {
        let records = sample_records();
        let analytics = analyze(&records, 10, Granularity::Month).unwrap();
        let clean = CleanReport::default();
        assert_eq!(
            render_summary(&clean, &analytics, None),
            render_summary(&clean, &analytics, None)
        );
    }

    #[test]
    fn test_write_ranking_csv() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("top_customers.csv");
        let entries = vec![
            RankedEntry {
                rank: 1,
                key: "A".into(),
                revenue: dec!(20.0),
            },
            RankedEntry {
                rank: 2,
                key: "B".into(),
                revenue: dec!(10.0),
            },
        ];

        write_ranking(&path, &entries).unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.starts_with("rank,name,revenue"));
        assert!(content.contains("1,A,20.00"));
        assert!(content.contains("2,B,10.00"));
    }
}
