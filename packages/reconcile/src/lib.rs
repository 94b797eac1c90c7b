#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Table reconciliation.
//!
//! Extraction usually returns the annex as several sub-tables (one per page,
//! or one per detected block) with different column counts. This crate
//! cleans each sub-table, pads them to a common width, stacks them, and
//! prefixes every row with the report's metadata so the result can be
//! written as one flat CSV per report.

use std::ffi::OsStr;
use std::io::Write;
use std::path::{Path, PathBuf};

use pefa_report_models::{METADATA_COLUMNS, NormalizedReportTable, RawTable, ReportMetadata};

/// Errors that can occur while writing reconciled tables.
#[derive(Debug, thiserror::Error)]
pub enum ReconcileError {
    /// CSV serialization failed.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// An I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

fn is_blank(cell: &str) -> bool {
    cell.trim().is_empty()
}

/// Drops rows whose cells are all blank, then columns whose cells are all
/// blank.
///
/// Ragged rows are padded with empty cells first, so the result is
/// rectangular.
#[must_use]
pub fn drop_empty(table: &RawTable) -> RawTable {
    let width = table.column_count();

    let rows: Vec<Vec<String>> = (0..table.row_count())
        .filter(|&r| (0..width).any(|c| !is_blank(table.cell(r, c))))
        .map(|r| (0..width).map(|c| table.cell(r, c).to_owned()).collect())
        .collect();

    let keep: Vec<usize> = (0..width)
        .filter(|&c| rows.iter().any(|row| !is_blank(&row[c])))
        .collect();

    RawTable::new(
        rows.into_iter()
            .map(|row| keep.iter().map(|&c| row[c].clone()).collect())
            .collect(),
    )
}

/// Placeholder names for `count` added columns: `Unnamed 0`, `Unnamed 1`, ...
#[must_use]
pub fn unnamed_columns(count: usize) -> Vec<String> {
    (0..count).map(|i| format!("Unnamed {i}")).collect()
}

/// Pads a cleaned table on the right to `width` columns.
///
/// The first row is the table's header row and receives placeholder names
/// for the added columns; the remaining rows receive empty cells. Original
/// column order is preserved.
#[must_use]
pub fn pad_table(table: &RawTable, width: usize) -> Vec<Vec<String>> {
    let missing = width.saturating_sub(table.column_count());

    table
        .rows
        .iter()
        .enumerate()
        .map(|(i, row)| {
            let mut row = row.clone();
            if i == 0 {
                row.extend(unnamed_columns(missing));
            } else {
                row.resize(row.len() + missing, String::new());
            }
            row
        })
        .collect()
}

/// Cleans, pads, and stacks `tables`, then prefixes every row with
/// `metadata`.
///
/// Body columns are named by position (`0`, `1`, ...) after the
/// [`METADATA_COLUMNS`]. Tables that are empty after cleaning contribute no
/// rows; if every table is empty the result has no rows.
#[must_use]
pub fn reconcile(tables: &[RawTable], metadata: &ReportMetadata) -> NormalizedReportTable {
    let cleaned: Vec<RawTable> = tables
        .iter()
        .map(drop_empty)
        .filter(|t| t.row_count() > 0)
        .collect();

    let width = cleaned.iter().map(RawTable::column_count).max().unwrap_or(0);

    let columns: Vec<String> = METADATA_COLUMNS
        .iter()
        .map(|&c| c.to_owned())
        .chain((0..width).map(|i| i.to_string()))
        .collect();

    let prefix = metadata.cells();
    let rows: Vec<Vec<String>> = cleaned
        .iter()
        .flat_map(|t| pad_table(t, width))
        .map(|body| prefix.iter().cloned().chain(body).collect())
        .collect();

    log::debug!(
        "{}: reconciled {} table(s) into {} rows x {} columns",
        metadata.key,
        cleaned.len(),
        rows.len(),
        columns.len()
    );

    NormalizedReportTable { columns, rows }
}

/// Writes a reconciled table as CSV (header row, no index column).
///
/// # Errors
///
/// Returns [`ReconcileError`] if serialization or the underlying writer
/// fails.
pub fn write_csv<W: Write>(table: &NormalizedReportTable, writer: W) -> Result<(), ReconcileError> {
    let mut csv = csv::WriterBuilder::new().flexible(false).from_writer(writer);
    csv.write_record(&table.columns)?;
    for row in &table.rows {
        csv.write_record(row)?;
    }
    csv.flush()?;
    Ok(())
}

/// Sibling of `path` that a CSV is written to before it is renamed into
/// place (`{name}.part`).
#[must_use]
pub fn partial_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(OsStr::to_os_string).unwrap_or_default();
    name.push(".part");
    path.with_file_name(name)
}

/// Writes a reconciled table to `path`, creating parent directories.
///
/// The CSV is written to [`partial_path`] and renamed once complete, so a
/// failed write never leaves a truncated file under `path`.
///
/// # Errors
///
/// Returns [`ReconcileError`] if the file cannot be created or written.
pub fn write_csv_file(table: &NormalizedReportTable, path: &Path) -> Result<(), ReconcileError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let partial = partial_path(path);
    let written = std::fs::File::create(&partial)
        .map_err(ReconcileError::from)
        .and_then(|file| write_csv(table, std::io::BufWriter::new(file)));

    if let Err(e) = written {
        let _ = std::fs::remove_file(&partial);
        return Err(e);
    }

    std::fs::rename(&partial, path)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use pefa_report_models::{PageRange, ReportKey};

    use super::*;

    fn row(cells: &[&str]) -> Vec<String> {
        cells.iter().map(|&c| c.to_owned()).collect()
    }

    fn metadata() -> ReportMetadata {
        ReportMetadata {
            key: ReportKey::new("English", "Testland", "42"),
            link: "https://www.pefa.org/node/42".to_owned(),
            pages: PageRange::new(11, 12).unwrap(),
        }
    }

    #[test]
    fn drops_empty_rows_and_columns() {
        let table = RawTable::new(vec![
            row(&["Year", "", "Budget"]),
            row(&["", " ", ""]),
            row(&["2019", "", "100"]),
            row(&["2020"]),
        ]);
        let cleaned = drop_empty(&table);
        assert_eq!(
            cleaned.rows,
            vec![
                row(&["Year", "Budget"]),
                row(&["2019", "100"]),
                row(&["2020", ""]),
            ]
        );
    }

    #[test]
    fn pads_header_with_placeholders_and_body_with_blanks() {
        let table = RawTable::new(vec![row(&["a", "b"]), row(&["1", "2"])]);
        assert_eq!(
            pad_table(&table, 4),
            vec![
                row(&["a", "b", "Unnamed 0", "Unnamed 1"]),
                row(&["1", "2", "", ""]),
            ]
        );
    }

    #[test]
    fn reconciles_tables_of_three_five_and_two_columns() {
        let three = RawTable::new(vec![
            row(&["Year", "Budget", "Actual"]),
            row(&["", "", ""]),
            row(&["2019", "100", "95"]),
        ]);
        let five = RawTable::new(vec![
            row(&["Head", "2019", "", "2020", "2021", "Dev"]),
            row(&["Health", "10", "", "11", "12", "3%"]),
            row(&["Education", "20", "", "21", "22", "1%"]),
        ]);
        let two = RawTable::new(vec![row(&["Total", "30"]), row(&["Variance", "2%"])]);

        let table = reconcile(&[three, five, two], &metadata());

        assert_eq!(table.width(), METADATA_COLUMNS.len() + 5);
        assert_eq!(table.rows.len(), 2 + 3 + 2);
        assert!(table.rows.iter().all(|r| r.len() == table.width()));

        let body = |r: usize| &table.rows[r][METADATA_COLUMNS.len()..];
        assert_eq!(body(0), row(&["Year", "Budget", "Actual", "Unnamed 0", "Unnamed 1"]));
        assert_eq!(body(2), row(&["Head", "2019", "2020", "2021", "Dev"]));
        assert_eq!(
            body(5),
            row(&["Total", "30", "Unnamed 0", "Unnamed 1", "Unnamed 2"])
        );
        assert_eq!(body(6), row(&["Variance", "2%", "", "", ""]));
    }

    #[test]
    fn every_row_carries_the_same_metadata_prefix() {
        let tables = vec![
            RawTable::new(vec![row(&["a", "b"]), row(&["c", "d"])]),
            RawTable::new(vec![row(&["e"])]),
        ];
        let table = reconcile(&tables, &metadata());
        let prefix = metadata().cells();
        for r in &table.rows {
            assert_eq!(&r[..METADATA_COLUMNS.len()], prefix.as_slice());
        }
        assert_eq!(table.rows[0][0], "English");
        assert_eq!(table.rows[0][1], "Testland");
        assert_eq!(table.rows[0][2], "42");
    }

    #[test]
    fn no_tables_yields_header_only() {
        let table = reconcile(&[RawTable::new(vec![row(&["", ""])])], &metadata());
        assert!(table.rows.is_empty());
        assert_eq!(table.width(), METADATA_COLUMNS.len());
    }

    #[test]
    fn writes_csv_without_index_column() {
        let table = reconcile(
            &[RawTable::new(vec![row(&["Year", "Budget"]), row(&["2019", "1,000"])])],
            &metadata(),
        );
        let mut out = Vec::new();
        write_csv(&table, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("Language,Country,Report ID,Link to Report,"));
        assert!(lines[0].ends_with(",0,1"));
        assert!(lines[2].ends_with(",2019,\"1,000\""));
    }

    #[test]
    fn partial_path_appends_part_suffix() {
        assert_eq!(
            partial_path(Path::new("out/English_St. Lucia_12.csv")),
            Path::new("out/English_St. Lucia_12.csv.part")
        );
    }

    #[test]
    fn file_write_renames_into_place() {
        let dir = std::env::temp_dir().join("pefa_reconcile_write_file");
        let _ = std::fs::remove_dir_all(&dir);
        let out = dir.join("nested").join("English_Testland_42.csv");
        std::fs::create_dir_all(out.parent().unwrap()).unwrap();
        std::fs::write(partial_path(&out), "stale,partial").unwrap();

        let table = reconcile(&[RawTable::new(vec![row(&["Year"]), row(&["2019"])])], &metadata());
        write_csv_file(&table, &out).unwrap();

        assert!(!partial_path(&out).exists());
        let text = std::fs::read_to_string(&out).unwrap();
        assert!(text.starts_with("Language,Country,"));
        assert_eq!(text.lines().count(), 3);

        let _ = std::fs::remove_dir_all(&dir);
    }
}
