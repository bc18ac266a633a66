//! End-to-end pipeline orchestration.
//!
//! Runs the stages in strict sequence: load, clean, persist the cleaned
//! dataset, analyze, benchmark, export. Single-threaded and synchronous;
//! the pipeline either runs to completion or returns the first fatal
//! stage error. Row-level problems never abort the run — they end up in
//! the clean report instead.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::algorithms::{self, BenchmarkReport};
use crate::analytics::{self, AnalyticsReport};
use crate::cleaner::{self, CleanReport};
use crate::error::{AnalyticsError, PipelineResult};
use crate::loader;
use crate::models::{Granularity, SalesRecord};
use crate::report;
use crate::{charts, error::PipelineError};

/// Benchmark trials averaged per input size.
const BENCH_TRIALS: u32 = 3;

/// Options for a pipeline run. All paths are relative to the working
/// directory unless absolute; nothing is read from global state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Raw dataset to ingest.
    pub input_path: PathBuf,
    /// Directory receiving every output (created if missing).
    pub output_dir: PathBuf,
    /// Entries kept in each revenue ranking.
    pub top_n: usize,
    /// Bucket size of the time-based breakdown.
    pub granularity: Granularity,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            input_path: PathBuf::from("data/sales_data.csv"),
            output_dir: PathBuf::from("output"),
            top_n: 10,
            granularity: Granularity::Month,
        }
    }
}

/// Everything a completed run produced.
#[derive(Debug)]
pub struct PipelineOutcome {
    pub records: Vec<SalesRecord>,
    pub clean_report: CleanReport,
    pub analytics: AnalyticsReport,
    pub bench: BenchmarkReport,
    /// Cleaned dataset location.
    pub clean_path: PathBuf,
    /// Summary report location.
    pub report_path: PathBuf,
    /// Ranked CSV exports.
    pub exports: Vec<PathBuf>,
    /// Chart images.
    pub figures: Vec<PathBuf>,
}

/// Run the full pipeline.
///
/// # Errors
///
/// Fatal conditions only: missing/unreadable input, an empty dataset after
/// cleaning, or an export failure. See [`PipelineError`].
pub fn run(config: &PipelineConfig) -> PipelineResult<PipelineOutcome> {
    let figures_dir = config.output_dir.join("figures");
    std::fs::create_dir_all(&figures_dir)?;

    info!(input = %config.input_path.display(), "loading raw dataset");
    let table = loader::load(&config.input_path)?;
    info!(
        rows = table.rows.len(),
        encoding = %table.encoding,
        delimiter = %table.delimiter,
        "raw dataset loaded"
    );

    let (records, clean_report) = cleaner::clean(&table);
    info!(
        kept = clean_report.kept,
        dropped = clean_report.dropped,
        "cleaning finished"
    );
    if records.is_empty() {
        return Err(PipelineError::Analytics(AnalyticsError::EmptyDataset));
    }

    let clean_path = config.output_dir.join("sales_clean.csv");
    cleaner::write_clean(&clean_path, &records)?;
    info!(path = %clean_path.display(), "cleaned dataset written");

    let analytics = analytics::analyze(&records, config.top_n, config.granularity)?;
    info!(
        revenue = %analytics.total_revenue,
        orders = analytics.order_count,
        "analytics computed"
    );

    let line_totals: Vec<_> = records.iter().map(SalesRecord::line_total).collect();
    let bench = algorithms::benchmark(&line_totals, BENCH_TRIALS);
    info!(sizes = bench.sort.len(), "benchmarks finished");

    let customers_path = config.output_dir.join("top_customers.csv");
    report::write_ranking(&customers_path, &analytics.top_customers)?;
    let products_path = config.output_dir.join("top_products.csv");
    report::write_ranking(&products_path, &analytics.top_products)?;

    let figure_names = charts::render_all(&figures_dir, &analytics, &bench, &records)?;
    info!(count = figure_names.len(), "charts rendered");

    let export_names = vec![
        "sales_clean.csv".to_string(),
        "top_customers.csv".to_string(),
        "top_products.csv".to_string(),
    ];
    let mut body = report::render_summary(&clean_report, &analytics, Some(&bench));
    body.push('\n');
    body.push_str(&report::render_manifest(&export_names, &figure_names));

    let report_path = config.output_dir.join("summary_report.txt");
    report::write_report(&report_path, &body)?;
    info!(path = %report_path.display(), "summary report written");

    Ok(PipelineOutcome {
        records,
        clean_report,
        analytics,
        bench,
        clean_path,
        report_path,
        exports: vec![customers_path, products_path],
        figures: figure_names
            .into_iter()
            .map(|name| figures_dir.join(name))
            .collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LoadError;
    use rust_decimal_macros::dec;
    use std::io::Write;

    const HEADER: &str = "order_id,customer,product,quantity,unit_price,date,region";

    fn config_for(dir: &std::path::Path, input: &str) -> PipelineConfig {
        let input_path = dir.join("sales_data.csv");
        let mut file = std::fs::File::create(&input_path).unwrap();
        write!(file, "{input}").unwrap();
        PipelineConfig {
            input_path,
            output_dir: dir.join("output"),
            top_n: 10,
            granularity: Granularity::Month,
        }
    }

    #[test]
    fn test_full_run() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_for(
            dir.path(),
            &format!(
                "{HEADER}\n\
                 1,A,X,2,10.00,2024-01-05,North\n\
                 2,B,X,1,10.00,2024-02-01,\n\
                 3,C,Y,-1,5.00,2024-02-02,\n\
                 1,A,X,2,10.00,2024-01-05,North\n"
            ),
        );

        let outcome = run(&config).unwrap();

        assert_eq!(outcome.records.len(), 2);
        assert_eq!(outcome.clean_report.dropped, 2);
        assert_eq!(outcome.clean_report.reasons["invalid quantity"], 1);
        assert_eq!(outcome.clean_report.reasons["duplicate order_id"], 1);
        assert_eq!(outcome.analytics.total_revenue, dec!(30.00));

        assert!(outcome.clean_path.exists());
        assert!(outcome.report_path.exists());
        for path in outcome.exports.iter().chain(&outcome.figures) {
            assert!(path.exists(), "{} missing", path.display());
        }

        let summary = std::fs::read_to_string(&outcome.report_path).unwrap();
        assert!(summary.contains("Total revenue: 30.00"));
        assert!(summary.contains("invalid quantity: 1"));
        assert!(summary.contains("revenue_over_time.png"));
    }

    #[test]
    fn test_missing_input_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let config = PipelineConfig {
            input_path: dir.path().join("nope.csv"),
            output_dir: dir.path().join("output"),
            ..PipelineConfig::default()
        };
        let result = run(&config);
        assert!(matches!(
            result,
            Err(PipelineError::Load(LoadError::MissingFile(_)))
        ));
    }

    #[test]
    fn test_all_rows_dropped_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_for(
            dir.path(),
            &format!("{HEADER}\n1,A,X,bad,10.00,2024-01-05,\n"),
        );
        let result = run(&config);
        assert!(matches!(
            result,
            Err(PipelineError::Analytics(AnalyticsError::EmptyDataset))
        ));
    }
}
