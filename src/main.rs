//! Salescope CLI - clean, analyze and report on a sales dataset
//!
//! # Commands
//!
//! ```bash
//! salescope                      # Full pipeline with default paths
//! salescope run --top-n 5       # Full pipeline, tuned
//! salescope clean input.csv     # Just load + clean + persist
//! salescope analyze input.csv   # Analytics summary to stdout
//! salescope bench input.csv     # Sort/search timing table
//! ```
//!
//! All paths default to the fixed relative locations
//! (`data/sales_data.csv`, `output/`), so the binary runs with no
//! arguments at all.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use salescope::error::PipelineResult;
use salescope::models::Granularity;
use salescope::pipeline::{self, PipelineConfig};
use salescope::{algorithms, analytics, cleaner, loader, report};

#[derive(Parser)]
#[command(name = "salescope")]
#[command(about = "Sales CSV cleaning, analytics and reporting", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the full pipeline: clean, analyze, benchmark, export
    Run(RunArgs),

    /// Load and clean the dataset, persist the cleaned CSV
    Clean {
        /// Input CSV file
        #[arg(default_value = "data/sales_data.csv")]
        input: PathBuf,

        /// Cleaned CSV destination
        #[arg(short, long, default_value = "output/sales_clean.csv")]
        output: PathBuf,
    },

    /// Print the analytics summary without benchmarks or charts
    Analyze {
        /// Input CSV file (raw or already cleaned)
        #[arg(default_value = "data/sales_data.csv")]
        input: PathBuf,

        /// Ranking size
        #[arg(long, default_value_t = 10)]
        top_n: usize,

        /// Time bucket granularity
        #[arg(long, value_enum, default_value_t = Granularity::Month)]
        granularity: Granularity,
    },

    /// Print the sort/search timing table
    Bench {
        /// Input CSV file
        #[arg(default_value = "data/sales_data.csv")]
        input: PathBuf,

        /// Trials averaged per input size
        #[arg(long, default_value_t = 3)]
        trials: u32,
    },
}

#[derive(Parser)]
struct RunArgs {
    /// Input CSV file
    #[arg(short, long, default_value = "data/sales_data.csv")]
    input: PathBuf,

    /// Directory for every output
    #[arg(short, long, default_value = "output")]
    output_dir: PathBuf,

    /// Ranking size
    #[arg(long, default_value_t = 10)]
    top_n: usize,

    /// Time bucket granularity
    #[arg(long, value_enum, default_value_t = Granularity::Month)]
    granularity: Granularity,
}

fn main() {
    // Default to INFO, allow override with RUST_LOG
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Some(Commands::Run(args)) => cmd_run(args),
        Some(Commands::Clean { input, output }) => cmd_clean(&input, &output),
        Some(Commands::Analyze {
            input,
            top_n,
            granularity,
        }) => cmd_analyze(&input, top_n, granularity),
        Some(Commands::Bench { input, trials }) => cmd_bench(&input, trials),
        // No subcommand: full pipeline with the fixed default locations.
        None => cmd_run(RunArgs {
            input: PathBuf::from("data/sales_data.csv"),
            output_dir: PathBuf::from("output"),
            top_n: 10,
            granularity: Granularity::Month,
        }),
    };

    if let Err(e) = result {
        eprintln!("❌ Error: {e}");
        std::process::exit(1);
    }
}

fn cmd_run(args: RunArgs) -> PipelineResult<()> {
    eprintln!("📄 Processing: {}", args.input.display());

    let config = PipelineConfig {
        input_path: args.input,
        output_dir: args.output_dir,
        top_n: args.top_n,
        granularity: args.granularity,
    };
    let outcome = pipeline::run(&config)?;

    eprintln!(
        "   Rows: {} kept, {} dropped",
        outcome.clean_report.kept, outcome.clean_report.dropped
    );
    for (reason, count) in &outcome.clean_report.reasons {
        eprintln!("     - {reason}: {count}");
    }

    eprintln!("\n✨ Done.");
    eprintln!("   Cleaned CSV: {}", outcome.clean_path.display());
    eprintln!("   Report: {}", outcome.report_path.display());
    for figure in &outcome.figures {
        eprintln!("   Figure: {}", figure.display());
    }
    Ok(())
}

fn cmd_clean(input: &std::path::Path, output: &std::path::Path) -> PipelineResult<()> {
    eprintln!("📄 Cleaning: {}", input.display());

    let table = loader::load(input)?;
    eprintln!(
        "   Encoding: {}, delimiter: '{}'",
        table.encoding,
        format_delimiter(table.delimiter)
    );

    let (records, clean_report) = cleaner::clean(&table);
    if let Some(parent) = output.parent() {
        std::fs::create_dir_all(parent)?;
    }
    cleaner::write_clean(output, &records)?;

    eprintln!(
        "✅ Kept {} of {} rows ({} dropped)",
        clean_report.kept, clean_report.input_rows, clean_report.dropped
    );
    for (reason, count) in &clean_report.reasons {
        eprintln!("   - {reason}: {count}");
    }
    eprintln!("💾 Cleaned CSV written to: {}", output.display());
    Ok(())
}

fn cmd_analyze(
    input: &std::path::Path,
    top_n: usize,
    granularity: Granularity,
) -> PipelineResult<()> {
    eprintln!("📊 Analyzing: {}", input.display());

    let table = loader::load(input)?;
    let (records, clean_report) = cleaner::clean(&table);
    let analytics = analytics::analyze(&records, top_n, granularity)?;

    println!("{}", report::render_summary(&clean_report, &analytics, None));
    Ok(())
}

fn cmd_bench(input: &std::path::Path, trials: u32) -> PipelineResult<()> {
    eprintln!("⏱️  Benchmarking on: {}", input.display());

    let table = loader::load(input)?;
    let (records, _) = cleaner::clean(&table);
    if records.is_empty() {
        return Err(salescope::error::AnalyticsError::EmptyDataset.into());
    }

    let line_totals: Vec<_> = records
        .iter()
        .map(salescope::models::SalesRecord::line_total)
        .collect();
    let bench = algorithms::benchmark(&line_totals, trials);

    println!("{}", report::render_benchmark(&bench));
    Ok(())
}

fn format_delimiter(d: char) -> String {
    match d {
        '\t' => "\\t".to_string(),
        c => c.to_string(),
    }
}
