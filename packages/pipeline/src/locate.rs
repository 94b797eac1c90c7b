//! Locate stage: downloaded PDFs to the review sheet.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use pefa_locate::{LanguageProfile, ProfileRegistry, locate_table_start};
use pefa_pdf::{PageTextProvider, PdfPages};
use pefa_report_models::{ReportDocument, ReportKey, Resolution};

use crate::progress::{ProgressCallback, as_total, finish_stage};
use crate::review::{ReviewRow, write_review_file};
use crate::{BatchSummary, PipelineConfig, PipelineError};

/// Narrows which PDFs the locate stage visits.
#[derive(Debug, Clone, Default)]
pub struct LocateOptions {
    /// Only reports in this language (name or alias).
    pub language: Option<String>,
    /// Only this PDF.
    pub only: Option<PathBuf>,
}

/// Lists the PDFs in `dir`, sorted by file name.
///
/// # Errors
///
/// Returns [`PipelineError::Io`] if the directory cannot be read.
pub fn list_pdfs(dir: &Path) -> Result<Vec<PathBuf>, PipelineError> {
    let mut pdfs = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_file()
            && path
                .extension()
                .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"))
        {
            pdfs.push(path);
        }
    }
    pdfs.sort();
    Ok(pdfs)
}

/// Resolves the table start page in one document.
///
/// # Errors
///
/// Returns [`PipelineError::Locate`] if a page cannot be read.
pub fn locate_report(
    pages: &(impl PageTextProvider + ?Sized),
    profile: &LanguageProfile,
    key: &ReportKey,
) -> Result<Resolution, PipelineError> {
    let resolution = locate_table_start(pages, profile)?;

    match &resolution {
        Resolution::Found { page, rule } => {
            log::info!("{key}: table start on page {page} ({rule})");
        }
        Resolution::NotFound { candidate_pages } => {
            log::warn!(
                "{key}: table start page not found ({} candidate(s): {candidate_pages:?})",
                candidate_pages.len()
            );
        }
    }

    Ok(resolution)
}

/// Builds the review sheet row for a located report.
#[must_use]
pub fn review_row(
    config: &PipelineConfig,
    key: &ReportKey,
    pdf: &Path,
    resolution: &Resolution,
) -> ReviewRow {
    ReviewRow {
        code: key.code.clone(),
        pdf: pdf.display().to_string(),
        link: config.report_link(&key.code),
        table_start_page: resolution.start_page(),
        table_last_page: None,
        comment: String::new(),
    }
}

fn selected(
    registry: &ProfileRegistry,
    options: &LocateOptions,
    path: &Path,
    profile: &LanguageProfile,
) -> Result<bool, PipelineError> {
    if let Some(only) = &options.only
        && path != only.as_path()
        && path.file_name() != only.file_name()
    {
        return Ok(false);
    }
    if let Some(language) = &options.language {
        return Ok(registry.get(language)?.name() == profile.name());
    }
    Ok(true)
}

/// Locates the table in every downloaded PDF and writes the review sheet.
///
/// PDFs with malformed names or an unknown language are skipped with a
/// warning. A PDF that cannot be read is logged, counted as failed, and
/// still gets a row (with the error as its comment) so the reviewer sees
/// it.
///
/// # Errors
///
/// Returns [`PipelineError`] if the PDF directory cannot be listed, a
/// `--language` filter names no profile, or the sheet cannot be written.
pub fn run(
    config: &PipelineConfig,
    registry: &ProfileRegistry,
    options: &LocateOptions,
    progress: &Arc<dyn ProgressCallback>,
) -> Result<BatchSummary, PipelineError> {
    let pdfs = list_pdfs(&config.pdf_dir)?;
    let mut summary = BatchSummary::default();
    let mut rows = Vec::new();

    progress.set_total(as_total(pdfs.len()));

    for path in &pdfs {
        progress.inc(1);

        let key = match ReportKey::from_path(path) {
            Ok(key) => key,
            Err(e) => {
                log::warn!("Skipping {}: {e}", path.display());
                summary.skipped += 1;
                continue;
            }
        };

        let profile = match registry.get(&key.language) {
            Ok(profile) => profile,
            Err(e) => {
                log::warn!("Skipping {key}: {e}");
                summary.skipped += 1;
                continue;
            }
        };

        if !selected(registry, options, path, profile)? {
            continue;
        }

        progress.set_message(key.to_string());

        let located = PdfPages::open(path)
            .map_err(PipelineError::from)
            .and_then(|pages| {
                let document = ReportDocument::new(path, pages.page_count())?;
                log::info!(
                    "Searching {}, starting at page ({}/{})",
                    document.key,
                    pefa_locate::scan_start(document.page_count),
                    document.page_count
                );
                locate_report(&pages, profile, &document.key)
            });

        match located {
            Ok(resolution) => {
                rows.push(review_row(config, &key, path, &resolution));
                summary.processed += 1;
            }
            Err(e) => {
                log::error!("{key}: {e}");
                let mut row = review_row(
                    config,
                    &key,
                    path,
                    &Resolution::NotFound {
                        candidate_pages: Vec::new(),
                    },
                );
                row.comment = format!("locate failed: {e}");
                rows.push(row);
                summary.failed += 1;
            }
        }
    }

    write_review_file(&rows, &config.stage1_csv)?;

    log::info!("Review sheet written to {}", config.stage1_csv.display());
    finish_stage(progress.as_ref(), "Locate", &summary);

    Ok(summary)
}
