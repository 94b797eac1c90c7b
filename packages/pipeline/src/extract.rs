//! Extract stage: reviewed sheet to one normalized CSV per report.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use pefa_pdf::select::select_tables;
use pefa_pdf::{PdfTables, TableExtractor};
use pefa_reconcile::{reconcile, write_csv_file};
use pefa_report_models::{PageRange, ReportKey, ReportMetadata};

use crate::progress::{ProgressCallback, as_total, finish_stage};
use crate::review::{ReviewRow, read_review_file};
use crate::{BatchSummary, PipelineConfig, PipelineError};

/// Options for the extract stage.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExtractOptions {
    /// Re-extract reports whose output CSV already exists.
    pub force: bool,
}

/// Output CSV path for a report PDF.
#[must_use]
pub fn output_path(output_dir: &Path, key: &ReportKey) -> PathBuf {
    output_dir.join(format!("{}.csv", key.file_stem()))
}

/// Extracts, reconciles, and writes the table of one report.
///
/// Returns the number of rows written.
///
/// # Errors
///
/// Returns [`PipelineError`] if extraction fails or the CSV cannot be
/// written.
pub fn extract_report(
    extractor: &(impl TableExtractor + ?Sized),
    metadata: &ReportMetadata,
    out: &Path,
) -> Result<usize, PipelineError> {
    let selection = select_tables(extractor, metadata.pages)?;
    log::debug!(
        "{}: using {} output ({} table(s))",
        metadata.key,
        selection.strategy,
        selection.tables.len()
    );

    let table = reconcile(&selection.tables, metadata);
    if table.rows.is_empty() {
        log::warn!(
            "{}: no table content on pages {}",
            metadata.key,
            metadata.pages
        );
    }

    write_csv_file(&table, out)?;
    Ok(table.rows.len())
}

enum Plan {
    Skip,
    Extract {
        key: ReportKey,
        pages: PageRange,
        out: PathBuf,
    },
}

fn plan(
    config: &PipelineConfig,
    options: ExtractOptions,
    row: &ReviewRow,
) -> Result<Plan, PipelineError> {
    let pdf = Path::new(&row.pdf);
    let key = ReportKey::from_path(pdf)?;

    if let Some(excluded) = config.exclusion(&key.file_stem()) {
        log::info!("{key}: excluded ({}), skipping", excluded.reason);
        return Ok(Plan::Skip);
    }

    let Some(pages) = row.page_range()? else {
        log::info!("No table in pdf {}, skipping", row.pdf);
        return Ok(Plan::Skip);
    };

    let out = output_path(&config.output_dir, &key);
    if !options.force && out.exists() {
        log::info!("{key}: {} already exists, skipping", out.display());
        return Ok(Plan::Skip);
    }

    Ok(Plan::Extract { key, pages, out })
}

/// Extracts every reviewed report with a start page.
///
/// Rows without a start page, excluded reports, and reports whose output
/// already exists (unless `force`) are skipped. Output is only ever
/// complete: an interrupted write leaves a `.part` file, which does not
/// count as existing output. A report that fails is
/// logged and counted; the others are still extracted.
///
/// # Errors
///
/// Returns [`PipelineError`] if the reviewed sheet cannot be read.
pub fn run(
    config: &PipelineConfig,
    options: ExtractOptions,
    progress: &Arc<dyn ProgressCallback>,
) -> Result<BatchSummary, PipelineError> {
    let rows = read_review_file(&config.reviewed_csv)?;
    let mut summary = BatchSummary::default();

    progress.set_total(as_total(rows.len()));

    for row in &rows {
        progress.inc(1);

        let (key, pages, out) = match plan(config, options, row) {
            Ok(Plan::Extract { key, pages, out }) => (key, pages, out),
            Ok(Plan::Skip) => {
                summary.skipped += 1;
                continue;
            }
            Err(e) => {
                log::error!("{}: {e}", row.pdf);
                summary.failed += 1;
                continue;
            }
        };

        progress.set_message(key.to_string());

        let metadata = ReportMetadata {
            key,
            link: row.link.clone(),
            pages,
        };

        let extracted = PdfTables::open(Path::new(&row.pdf))
            .map_err(PipelineError::from)
            .and_then(|pdf| extract_report(&pdf, &metadata, &out));

        match extracted {
            Ok(count) => {
                log::info!("{}: wrote {count} rows to {}", metadata.key, out.display());
                summary.processed += 1;
            }
            Err(e) => {
                log::error!("{}: extraction failed: {e}", metadata.key);
                summary.failed += 1;
            }
        }
    }

    finish_stage(progress.as_ref(), "Extract", &summary);

    Ok(summary)
}
