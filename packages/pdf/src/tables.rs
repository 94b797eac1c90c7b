//! Geometric table detection with [`pdfplumber`].
//!
//! Lattice detection builds cells from the ruling lines and rectangle edges
//! drawn on the page. Stream detection builds them from the alignment of
//! words, for tables printed without rulings.

use std::path::Path;

use pdfplumber::{Pdf, Strategy, Table, TableSettings};
use pefa_report_models::{ExtractionStrategy, PageRange, RawTable};

use crate::{PdfError, TableExtractor};

/// Detection settings for `strategy`, otherwise pdfplumber's defaults.
#[must_use]
pub fn table_settings(strategy: ExtractionStrategy) -> TableSettings {
    let strategy = match strategy {
        ExtractionStrategy::Lattice => Strategy::Lattice,
        ExtractionStrategy::Stream => Strategy::Stream,
    };

    TableSettings {
        strategy,
        ..TableSettings::default()
    }
}

/// Cell texts of a detected table, row by row. Cells without text are
/// empty strings.
#[must_use]
pub fn raw_table(table: &Table) -> RawTable {
    RawTable::new(
        table
            .rows
            .iter()
            .map(|row| {
                row.iter()
                    .map(|cell| cell.text.as_deref().unwrap_or_default().trim().to_owned())
                    .collect()
            })
            .collect(),
    )
}

/// A parsed PDF whose pages are searched for tables on demand.
pub struct PdfTables {
    pdf: Pdf,
}

impl PdfTables {
    /// Parses the PDF at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`PdfError::Io`] if the file cannot be read, or
    /// [`PdfError::Extraction`] if it is not a valid PDF.
    pub fn open(path: &Path) -> Result<Self, PdfError> {
        let bytes = std::fs::read(path)?;
        Self::from_mem(&bytes).map_err(|e| match e {
            PdfError::Extraction(message) => {
                PdfError::Extraction(format!("{}: {message}", path.display()))
            }
            other => other,
        })
    }

    /// Parses an in-memory PDF.
    ///
    /// # Errors
    ///
    /// Returns [`PdfError::Extraction`] if the bytes are not a valid PDF.
    pub fn from_mem(bytes: &[u8]) -> Result<Self, PdfError> {
        let pdf = Pdf::open(bytes, None)
            .map_err(|e| PdfError::Extraction(format!("failed to parse PDF: {e}")))?;

        log::debug!("Parsed {} pages for table detection", pdf.page_count());

        Ok(Self { pdf })
    }

    /// Number of pages in the document.
    #[must_use]
    pub fn page_count(&self) -> usize {
        self.pdf.page_count()
    }

    fn page_tables(
        &self,
        index: usize,
        settings: &TableSettings,
    ) -> Result<Vec<RawTable>, PdfError> {
        let page_count = self.page_count();
        if index >= page_count {
            return Err(PdfError::PageOutOfRange { index, page_count });
        }

        let page = self.pdf.page(index).map_err(|e| {
            PdfError::Extraction(format!("failed to read page {}: {e}", index + 1))
        })?;

        Ok(page.find_tables(settings).iter().map(raw_table).collect())
    }
}

impl TableExtractor for PdfTables {
    fn extract_tables(
        &self,
        pages: PageRange,
        strategy: ExtractionStrategy,
    ) -> Result<Vec<RawTable>, PdfError> {
        let settings = table_settings(strategy);
        let mut tables = Vec::new();

        for index in pages.indices() {
            let found = self.page_tables(index, &settings)?;
            log::trace!(
                "{strategy} strategy found {} table(s) on page {}",
                found.len(),
                index + 1
            );
            tables.extend(found);
        }

        Ok(tables)
    }
}

#[cfg(test)]
mod tests {
    use lopdf::{Document, Object, Stream, dictionary};

    use super::*;
    use crate::select::select_tables;
    use crate::{PageTextProvider, PdfPages};

    /// Builds a PDF with one page per content stream, with Helvetica as
    /// `/F1`.
    fn pdf_bytes(contents: Vec<Vec<u8>>) -> Vec<u8> {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica",
        });
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! { "F1" => font_id },
        });

        let kids: Vec<Object> = contents
            .into_iter()
            .map(|content| {
                let content_id = doc.add_object(Stream::new(dictionary! {}, content));
                Object::Reference(doc.add_object(dictionary! {
                    "Type" => "Page",
                    "Parent" => pages_id,
                    "Contents" => content_id,
                    "Resources" => resources_id,
                    "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
                }))
            })
            .collect();

        let count = i64::try_from(kids.len()).unwrap();
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => count,
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        let mut bytes = Vec::new();
        doc.save_to(&mut bytes).unwrap();
        bytes
    }

    /// Text cells laid out on a 120pt x 20pt grid from (72, 700) down.
    fn cells(rows: &[&[&str]]) -> String {
        let mut content = String::new();
        for (r, row) in rows.iter().enumerate() {
            for (c, text) in row.iter().enumerate() {
                let x = 78 + 120 * c;
                let y = 686 - 20 * r;
                content.push_str(&format!("BT /F1 10 Tf {x} {y} Td ({text}) Tj ET\n"));
            }
        }
        content
    }

    /// Stroked grid lines around every cell of `rows x columns`.
    fn rulings(rows: usize, columns: usize) -> String {
        let (left, top) = (72, 700);
        let right = left + 120 * columns;
        let bottom = top - 20 * rows;
        let mut content = String::from("0.5 w\n");
        for r in 0..=rows {
            let y = top - 20 * r;
            content.push_str(&format!("{left} {y} m {right} {y} l S\n"));
        }
        for c in 0..=columns {
            let x = left + 120 * c;
            content.push_str(&format!("{x} {top} m {x} {bottom} l S\n"));
        }
        content
    }

    fn ruled_report() -> Vec<u8> {
        let rows: &[&[&str]] = &[&["Year", "Budget", "Actual"], &["2019", "100", "95"]];
        let content = format!("{}{}", rulings(2, 3), cells(rows));
        pdf_bytes(vec![
            b"BT /F1 12 Tf 72 700 Td (Narrative) Tj ET".to_vec(),
            content.into_bytes(),
        ])
    }

    fn unruled_report() -> Vec<u8> {
        let rows: &[&[&str]] = &[
            &["Year", "Budget", "Actual"],
            &["2019", "100", "95"],
            &["2020", "110", "120"],
            &["2021", "130", "125"],
        ];
        pdf_bytes(vec![cells(rows).into_bytes()])
    }

    #[test]
    fn maps_strategies_onto_pdfplumber() {
        assert_eq!(
            table_settings(ExtractionStrategy::Lattice).strategy,
            Strategy::Lattice
        );
        assert_eq!(
            table_settings(ExtractionStrategy::Stream).strategy,
            Strategy::Stream
        );
    }

    #[test]
    fn lattice_reads_a_ruled_grid() {
        let tables = PdfTables::from_mem(&ruled_report()).unwrap();
        assert_eq!(tables.page_count(), 2);

        let found = tables
            .extract_tables(PageRange::new(2, 2).unwrap(), ExtractionStrategy::Lattice)
            .unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].row_count(), 2);
        assert_eq!(found[0].column_count(), 3);
        assert_eq!(found[0].rows[0], vec!["Year", "Budget", "Actual"]);
        assert_eq!(found[0].rows[1], vec!["2019", "100", "95"]);
    }

    #[test]
    fn ruled_grid_selects_lattice() {
        let tables = PdfTables::from_mem(&ruled_report()).unwrap();
        let selection = select_tables(&tables, PageRange::new(2, 2).unwrap()).unwrap();
        assert_eq!(selection.strategy, ExtractionStrategy::Lattice);
        assert_eq!(selection.lattice_tables, 1);
        assert_eq!(selection.tables[0].rows[0][0], "Year");
    }

    #[test]
    fn unruled_table_is_found_by_stream_only() {
        let tables = PdfTables::from_mem(&unruled_report()).unwrap();
        let range = PageRange::new(1, 1).unwrap();

        assert!(
            tables
                .extract_tables(range, ExtractionStrategy::Lattice)
                .unwrap()
                .is_empty()
        );
        let stream = tables
            .extract_tables(range, ExtractionStrategy::Stream)
            .unwrap();
        assert!(!stream.is_empty());
        assert!(stream.iter().any(|t| t.column_count() >= 2));

        let selection = select_tables(&tables, range).unwrap();
        assert_eq!(selection.strategy, ExtractionStrategy::Stream);
        assert_eq!(selection.lattice_tables, 0);
    }

    #[test]
    fn page_text_comes_from_the_same_bytes() {
        let pages = PdfPages::from_mem(&ruled_report()).unwrap();
        assert_eq!(pages.page_count(), 2);
        assert!(pages.page_text(1).unwrap().contains("Budget"));
    }

    #[test]
    fn range_past_the_end_fails() {
        let tables = PdfTables::from_mem(&unruled_report()).unwrap();
        assert!(matches!(
            tables.extract_tables(PageRange::new(1, 2).unwrap(), ExtractionStrategy::Stream),
            Err(PdfError::PageOutOfRange {
                index: 1,
                page_count: 1
            })
        ));
    }

    #[test]
    fn garbage_bytes_do_not_parse() {
        assert!(matches!(
            PdfTables::from_mem(b"this is not a pdf"),
            Err(PdfError::Extraction(_))
        ));
    }
}
