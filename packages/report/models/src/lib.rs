#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Shared types for the PEFA table pipeline.
//!
//! Every stage (fetch, locate, extract, reconcile) speaks in terms of the
//! types defined here. Page numbers that cross a crate boundary are always
//! 1-based and carried by [`PageRange`] or [`Resolution`]; 0-based page
//! indices only exist inside page text providers and table extractors.

use std::fmt;
use std::ops::RangeInclusive;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// Errors raised while constructing model values.
#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    /// A report file stem did not follow `{language}_{country}_{code}`.
    #[error("invalid report file name '{0}': expected '{{language}}_{{country}}_{{code}}'")]
    InvalidReportName(String),

    /// A page range was empty, inverted, or started at page 0.
    #[error("invalid page range {start}-{end}")]
    InvalidPageRange {
        /// Requested first page (1-based).
        start: u32,
        /// Requested last page (1-based).
        end: u32,
    },
}

// ── Report identity ──────────────────────────────────────────────────────

/// Identity of one assessment report: language, country, and numeric code.
///
/// The code is the last path segment of the report's content page URL
/// (e.g. `https://www.pefa.org/node/42` has code `42`).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ReportKey {
    /// Report language as listed in the metadata sheet (e.g. `"French"`).
    pub language: String,
    /// Assessed country (e.g. `"Kyrgyz Republic"`).
    pub country: String,
    /// Numeric report code.
    pub code: String,
}

impl ReportKey {
    /// Creates a new key.
    #[must_use]
    pub fn new(language: &str, country: &str, code: &str) -> Self {
        Self {
            language: language.to_owned(),
            country: country.to_owned(),
            code: code.to_owned(),
        }
    }

    /// Parses a key from a file stem such as `English_Testland_42`.
    ///
    /// The language is everything before the first `_` and the code is
    /// everything after the last `_`, so country names may contain
    /// underscores.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::InvalidReportName`] if the stem has fewer than
    /// three parts or the code is not numeric.
    pub fn parse_stem(stem: &str) -> Result<Self, ModelError> {
        let invalid = || ModelError::InvalidReportName(stem.to_owned());

        let (language, rest) = stem.split_once('_').ok_or_else(invalid)?;
        let (country, code) = rest.rsplit_once('_').ok_or_else(invalid)?;

        if language.is_empty()
            || country.is_empty()
            || code.is_empty()
            || !code.chars().all(|c| c.is_ascii_digit())
        {
            return Err(invalid());
        }

        Ok(Self::new(language, country, code))
    }

    /// Parses a key from the stem of a PDF path.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::InvalidReportName`] if the path has no stem or
    /// the stem is malformed.
    pub fn from_path(path: &Path) -> Result<Self, ModelError> {
        let stem = path
            .file_stem()
            .and_then(|s| s.to_str())
            .ok_or_else(|| ModelError::InvalidReportName(path.display().to_string()))?;
        Self::parse_stem(stem)
    }

    /// Returns the file stem this key is stored under.
    #[must_use]
    pub fn file_stem(&self) -> String {
        format!("{}_{}_{}", self.language, self.country, self.code)
    }
}

impl fmt::Display for ReportKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.file_stem())
    }
}

/// A downloaded report PDF with its page count.
///
/// Created once per source file and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportDocument {
    /// Identity parsed from the file name.
    pub key: ReportKey,
    /// Location of the source PDF.
    pub path: PathBuf,
    /// Total number of pages.
    pub page_count: usize,
}

impl ReportDocument {
    /// Creates a document from its PDF path and page count.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::InvalidReportName`] if the file name does not
    /// follow the `{language}_{country}_{code}.pdf` convention.
    pub fn new(path: &Path, page_count: usize) -> Result<Self, ModelError> {
        Ok(Self {
            key: ReportKey::from_path(path)?,
            path: path.to_path_buf(),
            page_count,
        })
    }
}

// ── Page numbering ───────────────────────────────────────────────────────

/// An inclusive, 1-based page range as a human reviewer reads it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PageRange {
    start: u32,
    end: u32,
}

impl PageRange {
    /// Creates a range covering pages `start..=end` (1-based).
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::InvalidPageRange`] if `start` is 0 or greater
    /// than `end`.
    pub const fn new(start: u32, end: u32) -> Result<Self, ModelError> {
        if start == 0 || start > end {
            return Err(ModelError::InvalidPageRange { start, end });
        }
        Ok(Self { start, end })
    }

    /// First page (1-based).
    #[must_use]
    pub const fn start(&self) -> u32 {
        self.start
    }

    /// Last page (1-based, inclusive).
    #[must_use]
    pub const fn end(&self) -> u32 {
        self.end
    }

    /// Number of pages covered.
    #[must_use]
    pub const fn len(&self) -> u32 {
        self.end - self.start + 1
    }

    /// Always `false`; a valid range covers at least one page.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        false
    }

    /// The 0-based page indices covered by this range.
    #[must_use]
    pub fn indices(&self) -> RangeInclusive<usize> {
        (self.start as usize - 1)..=(self.end as usize - 1)
    }
}

impl fmt::Display for PageRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start, self.end)
    }
}

/// Converts a 0-based page index to the 1-based page number shown to
/// reviewers.
#[must_use]
pub fn page_number(index: usize) -> u32 {
    u32::try_from(index + 1).unwrap_or(u32::MAX)
}

// ── Locating ─────────────────────────────────────────────────────────────

/// A page whose text matched a profile's primary pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    /// 0-based page index.
    pub page_index: usize,
    /// Extracted page text, kept for tertiary checks.
    pub text: String,
}

/// Which resolution rule selected the table start page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, AsRefStr)]
#[strum(serialize_all = "snake_case")]
pub enum ResolutionRule {
    /// Exactly one candidate was found.
    OnlyCandidate,
    /// Several candidates and no tertiary patterns; the first one won.
    FirstCandidate,
    /// The first candidate matching any tertiary pattern.
    TertiaryMatch,
    /// Full rescan requiring all secondary and tertiary patterns.
    SecondChance,
}

/// Outcome of locating the table start page in one document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// The table starts on `page` (1-based).
    Found {
        /// 1-based start page.
        page: u32,
        /// Rule that produced the page.
        rule: ResolutionRule,
    },
    /// No page could be resolved.
    NotFound {
        /// 1-based pages of every candidate that was considered.
        candidate_pages: Vec<u32>,
    },
}

impl Resolution {
    /// Returns the resolved 1-based start page, if any.
    #[must_use]
    pub const fn start_page(&self) -> Option<u32> {
        match self {
            Self::Found { page, .. } => Some(*page),
            Self::NotFound { .. } => None,
        }
    }
}

// ── Extraction ───────────────────────────────────────────────────────────

/// Table extraction strategy.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ExtractionStrategy {
    /// Structured grid: cells are delimited by explicit rulings.
    Lattice,
    /// Whitespace stream: cells are delimited by aligned gaps.
    Stream,
}

/// One table as detected on a page: rows of cell strings.
///
/// Rows may have different lengths and cells may be empty; the column
/// count is the width of the widest row.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawTable {
    /// Rows in reading order.
    pub rows: Vec<Vec<String>>,
}

impl RawTable {
    /// Creates a table from rows of cells.
    #[must_use]
    pub const fn new(rows: Vec<Vec<String>>) -> Self {
        Self { rows }
    }

    /// Width of the widest row.
    #[must_use]
    pub fn column_count(&self) -> usize {
        self.rows.iter().map(Vec::len).max().unwrap_or(0)
    }

    /// Number of rows.
    #[must_use]
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Returns the cell at (`row`, `col`), treating missing cells as empty.
    #[must_use]
    pub fn cell(&self, row: usize, col: usize) -> &str {
        self.rows
            .get(row)
            .and_then(|r| r.get(col))
            .map_or("", String::as_str)
    }
}

// ── Output ───────────────────────────────────────────────────────────────

/// Metadata column names that prefix every output row, in order.
pub const METADATA_COLUMNS: [&str; 9] = [
    "Language",
    "Country",
    "Report ID",
    "Link to Report",
    "table_start_page",
    "table_last_page",
    "Detected Table Year",
    "Detected Table Type",
    "Detected Currency",
];

/// Per-report metadata replicated on every output row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportMetadata {
    /// Report identity.
    pub key: ReportKey,
    /// Canonical link to the report's content page.
    pub link: String,
    /// Reviewed page range the table was extracted from.
    pub pages: PageRange,
}

impl ReportMetadata {
    /// Returns the metadata cells in [`METADATA_COLUMNS`] order.
    ///
    /// Year, table type, and currency detection are not implemented and are
    /// always empty.
    #[must_use]
    pub fn cells(&self) -> Vec<String> {
        vec![
            self.key.language.clone(),
            self.key.country.clone(),
            self.key.code.clone(),
            self.link.clone(),
            self.pages.start().to_string(),
            self.pages.end().to_string(),
            String::new(),
            String::new(),
            String::new(),
        ]
    }
}

/// The reconciled table for one report: metadata columns followed by the
/// table body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedReportTable {
    /// Header names, metadata first.
    pub columns: Vec<String>,
    /// Rows, each exactly `columns.len()` cells wide.
    pub rows: Vec<Vec<String>>,
}

impl NormalizedReportTable {
    /// Total number of columns per row.
    #[must_use]
    pub fn width(&self) -> usize {
        self.columns.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_report_stem() {
        let key = ReportKey::parse_stem("English_Kyrgyz Republic_181").unwrap();
        assert_eq!(key.language, "English");
        assert_eq!(key.country, "Kyrgyz Republic");
        assert_eq!(key.code, "181");
        assert_eq!(key.file_stem(), "English_Kyrgyz Republic_181");
    }

    #[test]
    fn country_may_contain_underscores() {
        let key = ReportKey::parse_stem("French_Congo_Brazzaville_7").unwrap();
        assert_eq!(key.country, "Congo_Brazzaville");
        assert_eq!(key.code, "7");
    }

    #[test]
    fn rejects_malformed_stems() {
        assert!(ReportKey::parse_stem("English_42").is_err());
        assert!(ReportKey::parse_stem("English_Testland_node").is_err());
        assert!(ReportKey::parse_stem("_Testland_42").is_err());
    }

    #[test]
    fn page_range_indices_are_zero_based() {
        let range = PageRange::new(11, 12).unwrap();
        assert_eq!(range.indices(), 10..=11);
        assert_eq!(range.len(), 2);
        assert_eq!(range.to_string(), "11-12");
    }

    #[test]
    fn rejects_invalid_page_ranges() {
        assert!(PageRange::new(0, 3).is_err());
        assert!(PageRange::new(5, 4).is_err());
        assert!(PageRange::new(4, 4).is_ok());
    }

    #[test]
    fn raw_table_column_count_is_widest_row() {
        let table = RawTable::new(vec![
            vec!["a".to_owned()],
            vec!["b".to_owned(), "c".to_owned(), "d".to_owned()],
        ]);
        assert_eq!(table.column_count(), 3);
        assert_eq!(table.cell(0, 2), "");
        assert_eq!(table.cell(1, 2), "d");
    }

    #[test]
    fn metadata_cells_match_column_names() {
        let meta = ReportMetadata {
            key: ReportKey::new("English", "Testland", "42"),
            link: "https://www.pefa.org/node/42".to_owned(),
            pages: PageRange::new(11, 12).unwrap(),
        };
        let cells = meta.cells();
        assert_eq!(cells.len(), METADATA_COLUMNS.len());
        assert_eq!(cells[2], "42");
        assert_eq!(cells[4], "11");
        assert_eq!(cells[5], "12");
        assert!(cells[6..].iter().all(String::is_empty));
    }
}
