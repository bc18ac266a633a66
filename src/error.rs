//! Error types for the salescope pipeline.
//!
//! This module defines one error enum per pipeline stage:
//!
//! - [`LoadError`] - reading and decoding the raw dataset
//! - [`AnalyticsError`] - aggregate computation
//! - [`ExportError`] - report, CSV and chart output
//! - [`PipelineError`] - top-level orchestration
//!
//! Malformed rows are *not* represented here: they are recovered per-row
//! during cleaning and tallied in a [`crate::cleaner::CleanReport`]. Only
//! whole-stage failures surface as these types. Conversion is automatic
//! via `From` implementations, allowing `?` to work across stage
//! boundaries.

use std::path::PathBuf;
use thiserror::Error;

// =============================================================================
// Load Errors
// =============================================================================

/// Errors while reading the raw dataset.
#[derive(Debug, Error)]
pub enum LoadError {
    /// Input file does not exist.
    #[error("Input file not found: {}", .0.display())]
    MissingFile(PathBuf),

    /// Failed to read the file.
    #[error("Failed to read file: {0}")]
    Io(#[from] std::io::Error),

    /// File contains no data rows.
    #[error("Input file is empty")]
    EmptyFile,

    /// Header row is missing or unusable.
    #[error("No headers found in input file")]
    NoHeaders,

    /// A required column is absent from the header row.
    #[error("Missing required column: {0}")]
    MissingColumn(String),

    /// Underlying CSV reader error.
    #[error("Invalid delimited data: {0}")]
    Csv(#[from] csv::Error),
}

// =============================================================================
// Analytics Errors
// =============================================================================

/// Errors during aggregate computation.
#[derive(Debug, Error)]
pub enum AnalyticsError {
    /// Every row was dropped during cleaning; no analytics are possible.
    #[error("Dataset is empty after cleaning; nothing to analyze")]
    EmptyDataset,
}

// =============================================================================
// Export Errors
// =============================================================================

/// Errors while writing reports, ranked CSVs or charts.
#[derive(Debug, Error)]
pub enum ExportError {
    /// Failed to write an output file.
    #[error("Failed to write output: {0}")]
    Io(#[from] std::io::Error),

    /// CSV serialization failed.
    #[error("Failed to write CSV export: {0}")]
    Csv(#[from] csv::Error),

    /// Chart rendering failed.
    #[error("Failed to render chart '{chart}': {message}")]
    Chart { chart: String, message: String },
}

// =============================================================================
// Pipeline Errors (top-level)
// =============================================================================

/// Top-level pipeline orchestration errors.
///
/// This is the main error type returned by [`crate::pipeline::run`]. It
/// wraps all stage errors; the binary prints it and exits non-zero.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Load stage failed.
    #[error("Load error: {0}")]
    Load(#[from] LoadError),

    /// Analytics stage failed.
    #[error("Analytics error: {0}")]
    Analytics(#[from] AnalyticsError),

    /// Export stage failed.
    #[error("Export error: {0}")]
    Export(#[from] ExportError),

    /// Filesystem error outside a specific stage (e.g. creating output dirs).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for load operations.
pub type LoadResult<T> = Result<T, LoadError>;

/// Result type for analytics operations.
pub type AnalyticsResult<T> = Result<T, AnalyticsError>;

/// Result type for export operations.
pub type ExportResult<T> = Result<T, ExportError>;

/// Result type for pipeline operations.
pub type PipelineResult<T> = Result<T, PipelineError>;
