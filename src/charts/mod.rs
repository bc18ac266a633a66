//! PNG chart rendering with plotters.
//!
//! One file per chart, written into the figures directory:
//!
//! - `revenue_over_time.png` - bucketed revenue bars
//! - `top_products.png` - ranked product revenue bars
//! - `timing_comparison.png` - custom vs built-in sort/search times by input size
//! - `line_total_distribution.png` - histogram of order line totals

use std::path::Path;

use plotters::prelude::*;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

use crate::algorithms::{BenchmarkReport, TimingComparison};
use crate::analytics::AnalyticsReport;
use crate::error::{ExportError, ExportResult};
use crate::models::SalesRecord;

const CHART_SIZE: (u32, u32) = (900, 600);
const HISTOGRAM_BINS: usize = 20;

fn chart_error<E: std::fmt::Display>(chart: &'static str) -> impl Fn(E) -> ExportError {
    move |e| ExportError::Chart {
        chart: chart.to_string(),
        message: e.to_string(),
    }
}

fn as_f64(value: Decimal) -> f64 {
    value.to_f64().unwrap_or(0.0)
}

/// Render every chart for the report; returns the written file names.
pub fn render_all(
    figures_dir: &Path,
    analytics: &AnalyticsReport,
    bench: &BenchmarkReport,
    records: &[SalesRecord],
) -> ExportResult<Vec<String>> {
    let mut files = Vec::new();

    let buckets: Vec<(String, f64)> = analytics
        .revenue_by_bucket
        .iter()
        .map(|b| (b.bucket.clone(), as_f64(b.revenue)))
        .collect();
    revenue_bars(
        &figures_dir.join("revenue_over_time.png"),
        "Revenue over time",
        &buckets,
    )?;
    files.push("revenue_over_time.png".to_string());

    let products: Vec<(String, f64)> = analytics
        .top_products
        .iter()
        .map(|e| (e.key.clone(), as_f64(e.revenue)))
        .collect();
    revenue_bars(
        &figures_dir.join("top_products.png"),
        "Top products by revenue",
        &products,
    )?;
    files.push("top_products.png".to_string());

    timing_chart(&figures_dir.join("timing_comparison.png"), bench)?;
    files.push("timing_comparison.png".to_string());

    let totals: Vec<f64> = records
        .iter()
        .map(|r| as_f64(r.line_total()))
        .collect();
    histogram(&figures_dir.join("line_total_distribution.png"), &totals)?;
    files.push("line_total_distribution.png".to_string());

    Ok(files)
}

/// Bar chart of labeled revenue values.
pub fn revenue_bars(path: &Path, title: &str, data: &[(String, f64)]) -> ExportResult<()> {
    let err = chart_error("revenue_bars");
    let root = BitMapBackend::new(path, CHART_SIZE).into_drawing_area();
    root.fill(&WHITE).map_err(&err)?;

    let max = data.iter().map(|d| d.1).fold(0.0_f64, f64::max).max(1.0);
    let mut chart = ChartBuilder::on(&root)
        .caption(title, ("sans-serif", 28))
        .margin(10)
        .x_label_area_size(60)
        .y_label_area_size(80)
        .build_cartesian_2d(0..data.len() as i32, 0f64..max * 1.1)
        .map_err(&err)?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(data.len().max(1))
        .x_label_formatter(&|idx| {
            data.get(*idx as usize)
                .map(|d| d.0.clone())
                .unwrap_or_default()
        })
        .y_desc("Revenue")
        .draw()
        .map_err(&err)?;

    chart
        .draw_series(data.iter().enumerate().map(|(i, (_, value))| {
            Rectangle::new([(i as i32, 0.0), (i as i32 + 1, *value)], BLUE.filled())
        }))
        .map_err(&err)?;

    root.present().map_err(&err)?;
    Ok(())
}

/// Line chart of custom vs built-in sort and search times across input
/// sizes. Search times cover a batch of lookups per measurement, so all
/// four series share the seconds axis.
pub fn timing_chart(path: &Path, bench: &BenchmarkReport) -> ExportResult<()> {
    let err = chart_error("timing_chart");
    let root = BitMapBackend::new(path, CHART_SIZE).into_drawing_area();
    root.fill(&WHITE).map_err(&err)?;

    let all_runs = || bench.sort.iter().chain(&bench.search);
    let max_n = all_runs().map(|r| r.n).max().unwrap_or(1) as f64;
    let max_secs = all_runs()
        .flat_map(|r| [r.custom_secs, r.builtin_secs])
        .fold(0.0_f64, f64::max)
        .max(f64::MIN_POSITIVE);

    let mut chart = ChartBuilder::on(&root)
        .caption("Sort/search timing: custom vs built-in", ("sans-serif", 28))
        .margin(10)
        .x_label_area_size(50)
        .y_label_area_size(80)
        .build_cartesian_2d(0f64..max_n * 1.05, 0f64..max_secs * 1.2)
        .map_err(&err)?;

    chart
        .configure_mesh()
        .x_desc("Input size")
        .y_desc("Seconds")
        .draw()
        .map_err(&err)?;

    let points = |runs: &[TimingComparison], custom: bool| -> Vec<(f64, f64)> {
        runs.iter()
            .map(|r| (r.n as f64, if custom { r.custom_secs } else { r.builtin_secs }))
            .collect()
    };

    chart
        .draw_series(LineSeries::new(points(&bench.sort, true), &RED))
        .map_err(&err)?
        .label("custom merge sort")
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], RED));
    chart
        .draw_series(LineSeries::new(points(&bench.sort, false), &BLUE))
        .map_err(&err)?
        .label("built-in sort")
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], BLUE));
    chart
        .draw_series(LineSeries::new(points(&bench.search, true), &MAGENTA))
        .map_err(&err)?
        .label("custom binary search (batched)")
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], MAGENTA));
    chart
        .draw_series(LineSeries::new(points(&bench.search, false), &GREEN))
        .map_err(&err)?
        .label("built-in binary search (batched)")
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], GREEN));

    chart
        .configure_series_labels()
        .border_style(BLACK)
        .background_style(WHITE.mix(0.8))
        .draw()
        .map_err(&err)?;

    root.present().map_err(&err)?;
    Ok(())
}

/// Histogram of order line totals.
pub fn histogram(path: &Path, values: &[f64]) -> ExportResult<()> {
    let err = chart_error("histogram");
    let root = BitMapBackend::new(path, CHART_SIZE).into_drawing_area();
    root.fill(&WHITE).map_err(&err)?;

    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let (min, max) = if values.is_empty() || min == max {
        (min.min(0.0), max.max(1.0))
    } else {
        (min, max)
    };
    let width = (max - min) / HISTOGRAM_BINS as f64;

    let mut counts = vec![0usize; HISTOGRAM_BINS];
    for &value in values {
        let bin = (((value - min) / width) as usize).min(HISTOGRAM_BINS - 1);
        counts[bin] += 1;
    }
    let max_count = counts.iter().copied().max().unwrap_or(1).max(1);

    let mut chart = ChartBuilder::on(&root)
        .caption("Order line total distribution", ("sans-serif", 28))
        .margin(10)
        .x_label_area_size(50)
        .y_label_area_size(60)
        .build_cartesian_2d(min..max, 0usize..max_count + 1)
        .map_err(&err)?;

    chart
        .configure_mesh()
        .x_desc("Line total")
        .y_desc("Orders")
        .draw()
        .map_err(&err)?;

    chart
        .draw_series(counts.iter().enumerate().map(|(i, &count)| {
            let x0 = min + width * i as f64;
            Rectangle::new([(x0, 0), (x0 + width, count)], BLUE.filled())
        }))
        .map_err(&err)?;

    root.present().map_err(&err)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algorithms::benchmark;
    use crate::analytics::analyze;
    use crate::models::Granularity;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    #[test]
    fn test_render_all_writes_files() {
        let dir = tempfile::tempdir().unwrap();
        let records: Vec<SalesRecord> = (0u32..30)
            .map(|i| SalesRecord {
                order_id: format!("{i}"),
                customer: format!("C{}", i % 5),
                product: format!("P{}", i % 3),
                quantity: (i % 4) + 1,
                unit_price: dec!(9.99),
                date: NaiveDate::from_ymd_opt(2024, (i % 12) + 1, 10).unwrap(),
                region: None,
            })
            .collect();

        let analytics = analyze(&records, 5, Granularity::Month).unwrap();
        let amounts: Vec<_> = records.iter().map(SalesRecord::line_total).collect();
        let bench = benchmark(&amounts, 1);

        let files = render_all(dir.path(), &analytics, &bench, &records).unwrap();
        assert_eq!(files.len(), 4);
        for name in files {
            let path = dir.path().join(name);
            assert!(path.exists());
            assert!(std::fs::metadata(&path).unwrap().len() > 0);
        }
    }

    #[test]
    fn test_timing_chart_plots_sort_and_search() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("timing.png");

        let run = |n: usize, custom: f64, builtin: f64| TimingComparison {
            n,
            custom_secs: custom,
            builtin_secs: builtin,
            output_matches: true,
        };
        let bench = BenchmarkReport {
            trials: 1,
            sort: vec![run(10, 0.002, 0.001), run(40, 0.009, 0.003)],
            search: vec![run(10, 0.0004, 0.0003), run(40, 0.0006, 0.0004)],
        };

        timing_chart(&path, &bench).unwrap();
        assert!(std::fs::metadata(&path).unwrap().len() > 0);
    }
}
