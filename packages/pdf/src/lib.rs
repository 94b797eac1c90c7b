#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Page text and table extraction for PEFA assessment reports.
//!
//! Assessment reports are long PDFs with no consistent structure. This
//! crate exposes two seams used by the rest of the pipeline:
//!
//! - [`PageTextProvider`]: plain text for a page, addressed by 0-based
//!   index, plus the page count.
//! - [`TableExtractor`]: raw tables for a 1-based [`PageRange`] using one
//!   of the [`ExtractionStrategy`] variants.
//!
//! [`PdfPages`] provides page text through [`pdf_extract`]. [`PdfTables`]
//! detects tables from the page geometry through [`pdfplumber`]. The
//! choice between lattice and stream output lives in [`select`].

pub mod select;
pub mod tables;

use std::path::Path;

use pefa_report_models::{ExtractionStrategy, PageRange, RawTable};

pub use tables::PdfTables;

/// Errors specific to PDF extraction.
#[derive(Debug, thiserror::Error)]
pub enum PdfError {
    /// PDF text extraction failed.
    #[error("PDF extraction error: {0}")]
    Extraction(String),

    /// A page index past the end of the document was requested.
    #[error("page index {index} out of range (document has {page_count} pages)")]
    PageOutOfRange {
        /// Requested 0-based index.
        index: usize,
        /// Number of pages in the document.
        page_count: usize,
    },

    /// An I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Source of plain page text for a single document.
pub trait PageTextProvider {
    /// Total number of pages.
    fn page_count(&self) -> usize;

    /// Text of the page at the 0-based `index`.
    ///
    /// # Errors
    ///
    /// Returns [`PdfError::PageOutOfRange`] if `index >= page_count()`, or
    /// another [`PdfError`] if the page cannot be read.
    fn page_text(&self, index: usize) -> Result<&str, PdfError>;
}

/// Extracts raw tables from a range of pages.
pub trait TableExtractor {
    /// Returns every table detected on the pages of `pages`, in page order.
    ///
    /// `pages` is 1-based; implementations convert to 0-based indices
    /// internally.
    ///
    /// # Errors
    ///
    /// Returns [`PdfError`] if a page in the range cannot be read.
    fn extract_tables(
        &self,
        pages: PageRange,
        strategy: ExtractionStrategy,
    ) -> Result<Vec<RawTable>, PdfError>;
}

/// All page texts of one PDF, extracted up front.
#[derive(Debug, Clone, Default)]
pub struct PdfPages {
    pages: Vec<String>,
}

impl PdfPages {
    /// Extracts the text of every page of the PDF at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`PdfError::Extraction`] if the file cannot be parsed.
    pub fn open(path: &Path) -> Result<Self, PdfError> {
        let pages = pdf_extract::extract_text_by_pages(path).map_err(|e| {
            PdfError::Extraction(format!(
                "failed to extract text from {}: {e}",
                path.display()
            ))
        })?;

        log::debug!("Extracted {} pages of text from {}", pages.len(), path.display());

        Ok(Self { pages })
    }

    /// Extracts the text of every page of an in-memory PDF.
    ///
    /// # Errors
    ///
    /// Returns [`PdfError::Extraction`] if the bytes cannot be parsed.
    pub fn from_mem(bytes: &[u8]) -> Result<Self, PdfError> {
        let pages = pdf_extract::extract_text_from_mem_by_pages(bytes)
            .map_err(|e| PdfError::Extraction(format!("failed to extract text from PDF: {e}")))?;

        log::debug!("Extracted {} pages of text from {} bytes", pages.len(), bytes.len());

        Ok(Self { pages })
    }

    /// Wraps already-extracted page texts.
    #[must_use]
    pub const fn from_texts(pages: Vec<String>) -> Self {
        Self { pages }
    }
}

impl PageTextProvider for PdfPages {
    fn page_count(&self) -> usize {
        self.pages.len()
    }

    fn page_text(&self, index: usize) -> Result<&str, PdfError> {
        self.pages
            .get(index)
            .map(String::as_str)
            .ok_or(PdfError::PageOutOfRange {
                index,
                page_count: self.pages.len(),
            })
    }
}
