//! Choosing between lattice and stream extraction output.
//!
//! Both strategies are run over the reviewed page range. Lattice output is
//! preferred when it looks like one logical table rather than a scatter of
//! fragments, and when it captured at least as many columns as the stream
//! pass did.

use pefa_report_models::{ExtractionStrategy, PageRange, RawTable};

use crate::{PdfError, TableExtractor};

/// Lattice output with this many tables or more is treated as fragmented.
pub const MAX_LATTICE_TABLES: usize = 30;

/// Lattice output with this many columns in total or more is treated as
/// fragmented.
pub const MAX_LATTICE_COLUMNS: usize = 30;

/// Sum of column counts over all tables.
#[must_use]
pub fn total_columns(tables: &[RawTable]) -> usize {
    tables.iter().map(RawTable::column_count).sum()
}

/// Returns `true` if the lattice output should be used over the stream
/// output.
#[must_use]
pub fn prefer_lattice(lattice: &[RawTable], stream: &[RawTable]) -> bool {
    let lattice_columns = total_columns(lattice);
    lattice.len() < MAX_LATTICE_TABLES
        && lattice_columns < MAX_LATTICE_COLUMNS
        && lattice_columns >= total_columns(stream)
}

/// Tables chosen for one page range, with the counts that drove the choice.
#[derive(Debug, Clone)]
pub struct Selection {
    /// Strategy whose output was kept.
    pub strategy: ExtractionStrategy,
    /// The kept tables.
    pub tables: Vec<RawTable>,
    /// Tables found by the lattice pass.
    pub lattice_tables: usize,
    /// Total columns found by the lattice pass.
    pub lattice_columns: usize,
    /// Tables found by the stream pass.
    pub stream_tables: usize,
    /// Total columns found by the stream pass.
    pub stream_columns: usize,
}

/// Runs both strategies over `pages` and keeps the better output.
///
/// # Errors
///
/// Returns [`PdfError`] if either extraction pass fails.
pub fn select_tables(
    extractor: &(impl TableExtractor + ?Sized),
    pages: PageRange,
) -> Result<Selection, PdfError> {
    let lattice = extractor.extract_tables(pages, ExtractionStrategy::Lattice)?;
    let stream = extractor.extract_tables(pages, ExtractionStrategy::Stream)?;

    let lattice_columns = total_columns(&lattice);
    let stream_columns = total_columns(&stream);

    log::info!(
        "Pages {pages}: lattice tables & columns: {} {lattice_columns}, stream tables & columns: {} {stream_columns}",
        lattice.len(),
        stream.len()
    );

    let lattice_count = lattice.len();
    let stream_count = stream.len();

    let (strategy, tables) = if prefer_lattice(&lattice, &stream) {
        (ExtractionStrategy::Lattice, lattice)
    } else {
        (ExtractionStrategy::Stream, stream)
    };

    log::debug!("Pages {pages}: using {strategy} output");

    Ok(Selection {
        strategy,
        tables,
        lattice_tables: lattice_count,
        lattice_columns,
        stream_tables: stream_count,
        stream_columns,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(cols: usize) -> RawTable {
        RawTable::new(vec![vec!["x".to_owned(); cols]])
    }

    #[test]
    fn prefers_lattice_with_at_least_as_many_columns() {
        assert!(prefer_lattice(&[table(5)], &[table(3), table(2)]));
        assert!(!prefer_lattice(&[table(4)], &[table(3), table(2)]));
    }

    #[test]
    fn rejects_fragmented_lattice_output() {
        let many: Vec<RawTable> = (0..MAX_LATTICE_TABLES).map(|_| table(1)).collect();
        assert!(!prefer_lattice(&many, &[]));

        assert!(!prefer_lattice(&[table(MAX_LATTICE_COLUMNS)], &[table(2)]));
    }

    #[test]
    fn empty_outputs_fall_back_to_lattice() {
        assert!(prefer_lattice(&[], &[]));
    }

    struct Fixed;

    impl TableExtractor for Fixed {
        fn extract_tables(
            &self,
            _pages: PageRange,
            strategy: ExtractionStrategy,
        ) -> Result<Vec<RawTable>, PdfError> {
            Ok(match strategy {
                ExtractionStrategy::Lattice => vec![table(2)],
                ExtractionStrategy::Stream => vec![table(3)],
            })
        }
    }

    #[test]
    fn select_tables_reports_both_passes() {
        let selection = select_tables(&Fixed, PageRange::new(1, 1).unwrap()).unwrap();
        assert_eq!(selection.strategy, ExtractionStrategy::Stream);
        assert_eq!(selection.lattice_columns, 2);
        assert_eq!(selection.stream_columns, 3);
        assert_eq!(selection.tables, vec![table(3)]);
    }
}
