//! The review sheet exchanged between the locate and extract stages.
//!
//! The locate stage writes one row per report with the detected start page
//! (blank when nothing was found). A reviewer corrects start pages, fills
//! in `table_last_page`, and saves the sheet under a new name. Spreadsheet
//! tools tend to rewrite whole numbers as `12.0`, so page cells accept that
//! form too.

use std::io::{Read, Write};
use std::path::Path;

use pefa_report_models::PageRange;
use serde::{Deserialize, Deserializer, Serialize};

use crate::PipelineError;

/// Header of the review sheet, in column order.
pub const REVIEW_COLUMNS: [&str; 6] = [
    "code",
    "pdf",
    "Link to Content",
    "table_start_page",
    "table_last_page",
    "comment",
];

/// One report in the review sheet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewRow {
    /// Numeric report code.
    pub code: String,
    /// Path of the report PDF.
    pub pdf: String,
    /// Content page link.
    #[serde(rename = "Link to Content")]
    pub link: String,
    /// 1-based first page of the table, if known.
    #[serde(default, deserialize_with = "deserialize_page")]
    pub table_start_page: Option<u32>,
    /// 1-based last page of the table, if reviewed.
    #[serde(default, deserialize_with = "deserialize_page")]
    pub table_last_page: Option<u32>,
    /// Free-form reviewer or pipeline note.
    #[serde(default)]
    pub comment: String,
}

impl ReviewRow {
    /// The reviewed page range, or `None` if no start page is set.
    ///
    /// A missing last page means the table fits on the start page.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::Review`] if the last page precedes the
    /// start page.
    pub fn page_range(&self) -> Result<Option<PageRange>, PipelineError> {
        let Some(start) = self.table_start_page else {
            return Ok(None);
        };
        let end = self.table_last_page.unwrap_or(start);

        PageRange::new(start, end)
            .map(Some)
            .map_err(|e| PipelineError::Review {
                pdf: self.pdf.clone(),
                message: e.to_string(),
            })
    }
}

fn parse_page(cell: &str) -> Result<u32, String> {
    let digits = cell.strip_suffix(".0").unwrap_or(cell);
    digits
        .parse()
        .map_err(|_| format!("invalid page number '{cell}'"))
}

fn deserialize_page<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    let cell = Option::<String>::deserialize(deserializer)?;
    cell.as_deref()
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .map(parse_page)
        .transpose()
        .map_err(serde::de::Error::custom)
}

/// Writes review rows as CSV. The header is written even when `rows` is
/// empty.
///
/// # Errors
///
/// Returns [`PipelineError::Csv`] if serialization or the writer fails.
pub fn write_review<W: Write>(rows: &[ReviewRow], writer: W) -> Result<(), PipelineError> {
    let mut csv = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);
    csv.write_record(REVIEW_COLUMNS)?;
    for row in rows {
        csv.serialize(row)?;
    }
    csv.flush()?;
    Ok(())
}

/// Writes review rows to `path`, creating parent directories.
///
/// # Errors
///
/// Returns [`PipelineError`] if the file cannot be created or written.
pub fn write_review_file(rows: &[ReviewRow], path: &Path) -> Result<(), PipelineError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let file = std::fs::File::create(path)?;
    write_review(rows, std::io::BufWriter::new(file))
}

/// Reads review rows from CSV.
///
/// # Errors
///
/// Returns [`PipelineError::Csv`] if the sheet is malformed or a page cell
/// is not a whole number.
pub fn read_review<R: Read>(reader: R) -> Result<Vec<ReviewRow>, PipelineError> {
    csv::Reader::from_reader(reader)
        .deserialize()
        .collect::<Result<Vec<ReviewRow>, csv::Error>>()
        .map_err(PipelineError::from)
}

/// Reads review rows from the CSV file at `path`.
///
/// # Errors
///
/// Returns [`PipelineError`] if the file cannot be opened or parsed.
pub fn read_review_file(path: &Path) -> Result<Vec<ReviewRow>, PipelineError> {
    let file = std::fs::File::open(path)?;
    read_review(std::io::BufReader::new(file))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(start: Option<u32>, last: Option<u32>) -> ReviewRow {
        ReviewRow {
            code: "42".to_owned(),
            pdf: "data/pdfs/English_Testland_42.pdf".to_owned(),
            link: "https://www.pefa.org/node/42".to_owned(),
            table_start_page: start,
            table_last_page: last,
            comment: String::new(),
        }
    }

    #[test]
    fn writes_stage1_columns_in_order() {
        let mut out = Vec::new();
        write_review(&[row(Some(11), None), row(None, None)], &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(
            lines[0],
            "code,pdf,Link to Content,table_start_page,table_last_page,comment"
        );
        assert_eq!(
            lines[1],
            "42,data/pdfs/English_Testland_42.pdf,https://www.pefa.org/node/42,11,,"
        );
        assert_eq!(
            lines[2],
            "42,data/pdfs/English_Testland_42.pdf,https://www.pefa.org/node/42,,,"
        );
    }

    #[test]
    fn empty_sheet_keeps_header() {
        let mut out = Vec::new();
        write_review(&[], &mut out).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap().trim_end(),
            REVIEW_COLUMNS.join(",")
        );
    }

    #[test]
    fn reads_spreadsheet_style_page_numbers() {
        let sheet = "\
code,pdf,Link to Content,table_start_page,table_last_page,comment
42,a.pdf,https://www.pefa.org/node/42,11.0,12.0,checked
43,b.pdf,https://www.pefa.org/node/43,,,
";
        let rows = read_review(sheet.as_bytes()).unwrap();
        assert_eq!(rows[0].table_start_page, Some(11));
        assert_eq!(rows[0].table_last_page, Some(12));
        assert_eq!(rows[0].comment, "checked");
        assert_eq!(rows[1].table_start_page, None);
    }

    #[test]
    fn comment_column_is_optional() {
        let sheet = "code,pdf,Link to Content,table_start_page,table_last_page\n\
                     42,a.pdf,https://www.pefa.org/node/42,3,4\n";
        let rows = read_review(sheet.as_bytes()).unwrap();
        assert_eq!(rows[0].comment, "");
        assert_eq!(rows[0].table_last_page, Some(4));
    }

    #[test]
    fn rejects_non_numeric_page() {
        let sheet = "code,pdf,Link to Content,table_start_page,table_last_page,comment\n\
                     42,a.pdf,x,eleven,,\n";
        assert!(matches!(read_review(sheet.as_bytes()), Err(PipelineError::Csv(_))));
    }

    #[test]
    fn page_range_defaults_end_to_start() {
        assert_eq!(row(None, Some(4)).page_range().unwrap(), None);

        let range = row(Some(11), None).page_range().unwrap().unwrap();
        assert_eq!((range.start(), range.end()), (11, 11));

        let range = row(Some(11), Some(12)).page_range().unwrap().unwrap();
        assert_eq!((range.start(), range.end()), (11, 12));

        assert!(matches!(
            row(Some(12), Some(11)).page_range(),
            Err(PipelineError::Review { .. })
        ));
    }
}
