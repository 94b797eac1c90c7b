//! Download stage: metadata sheet to local report PDFs.

use std::sync::Arc;

use pefa_scraper::fetch::{FetchOutcome, ReportFetcher};
use pefa_scraper::metadata::read_assessments_file;

use crate::progress::{ProgressCallback, as_total, finish_stage};
use crate::{BatchSummary, PipelineConfig, PipelineError};

/// Fetches every report selected by the config's metadata filter.
///
/// Reports already on disk count as skipped. A report that cannot be
/// fetched is logged and counted as failed; the remaining reports are
/// still fetched.
///
/// # Errors
///
/// Returns [`PipelineError`] if the metadata sheet cannot be read or the
/// HTTP client cannot be built.
pub async fn run(
    config: &PipelineConfig,
    progress: &Arc<dyn ProgressCallback>,
) -> Result<BatchSummary, PipelineError> {
    let rows = read_assessments_file(&config.metadata_csv, &config.filter)?;
    let client = pefa_scraper::build_client(&config.headers)?;
    let fetcher = ReportFetcher::new(client, &config.pdf_dir);
    log::info!(
        "Fetching {} report(s) into {}",
        rows.len(),
        fetcher.pdf_dir().display()
    );

    let mut summary = BatchSummary::default();
    progress.set_total(as_total(rows.len()));

    for row in &rows {
        progress.set_message(format!("{} ({})", row.country, row.language));

        match fetcher.fetch(&row.link, &row.language, &row.country).await {
            Ok(outcome @ FetchOutcome::Cached(_)) => {
                log::debug!("{} already on disk", outcome.path().display());
                summary.skipped += 1;
            }
            Ok(outcome @ FetchOutcome::Downloaded { bytes, .. }) => {
                log::debug!("Wrote {bytes} bytes to {}", outcome.path().display());
                summary.processed += 1;
            }
            Err(e) => {
                log::error!("{} ({}): download failed: {e}", row.country, row.link);
                summary.failed += 1;
            }
        }

        progress.inc(1);
    }

    finish_stage(progress.as_ref(), "Download", &summary);

    Ok(summary)
}
