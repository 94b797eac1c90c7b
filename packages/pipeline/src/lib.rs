#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Batch stages of the PEFA table pipeline.
//!
//! 1. [`download`]: read the assessment metadata sheet and fetch every
//!    selected report PDF (cached by file existence).
//! 2. [`locate`]: find the table start page in each downloaded PDF and
//!    write the review sheet (`stage1.csv`).
//! 3. A human fills in `table_last_page` and corrects start pages, saving
//!    the result as `stage1_reviewed.csv`.
//! 4. [`extract`]: extract, reconcile, and write one CSV per reviewed
//!    report.
//!
//! Stages run documents one at a time. A failure on one document is logged
//! and counted in the stage's [`BatchSummary`]; it never stops the batch.

pub mod config;
pub mod download;
pub mod extract;
pub mod locate;
pub mod progress;
pub mod review;

use std::fmt;
use std::path::PathBuf;

pub use config::{ExcludedReport, PipelineConfig};

/// Errors that can occur while running a pipeline stage.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// The config file could not be parsed.
    #[error("invalid config '{}': {source}", path.display())]
    Config {
        /// Path of the config file.
        path: PathBuf,
        /// Underlying parse error.
        source: toml::de::Error,
    },

    /// A review sheet row is inconsistent.
    #[error("review error for '{pdf}': {message}")]
    Review {
        /// The row's `pdf` value.
        pdf: String,
        /// What is wrong with the row.
        message: String,
    },

    /// An I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV reading or writing failed.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Metadata reading or report download failed.
    #[error(transparent)]
    Scrape(#[from] pefa_scraper::ScrapeError),

    /// Page text or table extraction failed.
    #[error(transparent)]
    Pdf(#[from] pefa_pdf::PdfError),

    /// Profile loading or table location failed.
    #[error(transparent)]
    Locate(#[from] pefa_locate::LocateError),

    /// Writing a reconciled table failed.
    #[error(transparent)]
    Reconcile(#[from] pefa_reconcile::ReconcileError),

    /// A report name or page range is invalid.
    #[error(transparent)]
    Model(#[from] pefa_report_models::ModelError),
}

/// Per-document outcome counts for one stage run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchSummary {
    /// Documents the stage did work for.
    pub processed: usize,
    /// Documents left alone (cached, excluded, unreviewed, ...).
    pub skipped: usize,
    /// Documents whose processing failed.
    pub failed: usize,
}

impl BatchSummary {
    /// Total number of documents seen.
    #[must_use]
    pub const fn total(&self) -> usize {
        self.processed + self.skipped + self.failed
    }
}

impl fmt::Display for BatchSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} processed, {} skipped, {} failed",
            self.processed, self.skipped, self.failed
        )
    }
}
