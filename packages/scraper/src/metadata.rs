//! Assessment metadata CSV reader.
//!
//! Only the columns the pipeline needs are deserialized; any others in the
//! published sheet are ignored.

use std::io::Read;
use std::path::Path;

use serde::Deserialize;

use crate::ScrapeError;

/// One row of the assessment metadata sheet.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AssessmentRow {
    /// URL of the report's content page.
    #[serde(rename = "Link to Content")]
    pub link: String,
    /// Report language.
    #[serde(rename = "Language")]
    pub language: String,
    /// Assessed country.
    #[serde(rename = "Country")]
    pub country: String,
    /// Assessment type (`National`, `Subnational`, ...).
    #[serde(rename = "Type")]
    pub assessment_type: String,
    /// Publication status (`Public`, `Not public`, ...).
    #[serde(rename = "Availability")]
    pub availability: String,
    /// Assessment framework edition.
    #[serde(rename = "Framework")]
    pub framework: String,
}

/// Which metadata rows to process.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct MetadataFilter {
    /// Required `Type` value.
    pub assessment_type: String,
    /// Required `Availability` value.
    pub availability: String,
    /// Required `Framework` value.
    pub framework: String,
}

impl Default for MetadataFilter {
    fn default() -> Self {
        Self {
            assessment_type: "National".to_owned(),
            availability: "Public".to_owned(),
            framework: "2016 Framework".to_owned(),
        }
    }
}

impl MetadataFilter {
    /// Returns `true` if `row` should be processed.
    #[must_use]
    pub fn accepts(&self, row: &AssessmentRow) -> bool {
        row.assessment_type == self.assessment_type
            && row.availability == self.availability
            && row.framework == self.framework
    }
}

/// Reads metadata rows from `reader`, keeping those accepted by `filter`.
///
/// # Errors
///
/// Returns [`ScrapeError::Csv`] if the CSV is malformed or lacks a required
/// column.
pub fn read_assessments<R: Read>(
    reader: R,
    filter: &MetadataFilter,
) -> Result<Vec<AssessmentRow>, ScrapeError> {
    let mut csv = csv::Reader::from_reader(reader);
    let mut rows = Vec::new();
    let mut total = 0_usize;

    for record in csv.deserialize::<AssessmentRow>() {
        let row = record?;
        total += 1;
        if filter.accepts(&row) {
            rows.push(row);
        }
    }

    log::info!("Selected {} of {total} assessments", rows.len());

    Ok(rows)
}

/// Reads metadata rows from the CSV file at `path`.
///
/// # Errors
///
/// Returns [`ScrapeError`] if the file cannot be opened or parsed.
pub fn read_assessments_file(
    path: &Path,
    filter: &MetadataFilter,
) -> Result<Vec<AssessmentRow>, ScrapeError> {
    let file = std::fs::File::open(path)?;
    read_assessments(std::io::BufReader::new(file), filter)
}
