//! # Salescope - sales CSV cleaning, analytics and reporting
//!
//! Salescope ingests a raw delimited sales dataset, cleans it row by row,
//! computes descriptive analytics, benchmarks hand-written sort/search
//! routines against the standard library, and exports a text report,
//! ranked CSVs and chart images.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐   ┌─────────────┐   ┌─────────────┐   ┌─────────────┐
//! │  Raw CSV    │──▶│   Loader    │──▶│   Cleaner   │──▶│ SalesRecord │
//! │ (any enc.)  │   │ (auto-enc)  │   │ (validate)  │   │   (typed)   │
//! └─────────────┘   └─────────────┘   └─────────────┘   └──────┬──────┘
//!                                                              │
//!                         ┌────────────────────┬───────────────┤
//!                         ▼                    ▼               ▼
//!                   ┌───────────┐       ┌────────────┐   ┌───────────┐
//!                   │ Analytics │       │ Algorithms │   │ Clean CSV │
//!                   └─────┬─────┘       └─────┬──────┘   └───────────┘
//!                         └────────┬──────────┘
//!                                  ▼
//!                        report.txt / CSVs / PNGs
//! ```
//!
//! The pipeline is single-threaded and synchronous: each stage runs to
//! completion before the next starts, and records are immutable once
//! cleaned.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use salescope::{pipeline, PipelineConfig};
//!
//! fn main() -> Result<(), salescope::PipelineError> {
//!     let outcome = pipeline::run(&PipelineConfig::default())?;
//!     println!("kept {} records", outcome.records.len());
//!     Ok(())
//! }
//! ```
//!
//! ## Modules
//!
//! - [`error`] - per-stage error types
//! - [`models`] - `SalesRecord` and friends
//! - [`loader`] - raw ingestion with encoding/delimiter detection
//! - [`cleaner`] - validation, coercion, deduplication
//! - [`analytics`] - pure aggregate computation
//! - [`algorithms`] - custom sort/search plus the timing harness
//! - [`report`] - text summary and ranked CSV exports
//! - [`charts`] - PNG chart rendering
//! - [`pipeline`] - configuration and orchestration

// Core modules
pub mod error;
pub mod models;

// Ingestion
pub mod cleaner;
pub mod loader;

// Computation
pub mod algorithms;
pub mod analytics;

// Output
pub mod charts;
pub mod report;

// Orchestration
pub mod pipeline;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{
    AnalyticsError, ExportError, LoadError, PipelineError, PipelineResult,
};

pub use models::{DropReason, Granularity, SalesRecord};

pub use cleaner::{clean, write_clean, CleanReport, RowError};
pub use loader::{load, load_bytes, RawRow, RawTable};

pub use algorithms::{
    benchmark, binary_search, binary_search_by, linear_search, linear_search_by, merge_sort,
    merge_sort_by,
    BenchmarkReport, TimingComparison,
};
pub use analytics::{analyze, AnalyticsReport, RankedEntry, SegmentCount};

pub use pipeline::{run, PipelineConfig, PipelineOutcome};
