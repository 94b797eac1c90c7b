//! Report PDF download.
//!
//! Each report's content page carries a "Download PDF" anchor. The fetcher
//! resolves that anchor against the site origin and stores the PDF as
//! `{language}_{country}_{code}.pdf`, where `code` is the last path segment
//! of the content page URL.

use std::path::{Path, PathBuf};

use pefa_report_models::ReportKey;
use scraper::{Html, Selector};

use crate::ScrapeError;

/// Visible text of the anchor that links to the report PDF.
pub const DOWNLOAD_LINK_TEXT: &str = "Download PDF";

/// Returns the report code: the last non-empty path segment of `link`.
#[must_use]
pub fn report_id(link: &str) -> Option<&str> {
    let path = link.split(['?', '#']).next().unwrap_or(link);
    path.rsplit('/').find(|segment| !segment.is_empty())
}

/// Builds the storage key for a metadata row.
///
/// # Errors
///
/// Returns [`ScrapeError::Parse`] if the last path segment of `link` is
/// not a numeric report code.
pub fn report_key(link: &str, language: &str, country: &str) -> Result<ReportKey, ScrapeError> {
    let code = report_id(link)
        .filter(|id| id.chars().all(|c| c.is_ascii_digit()))
        .ok_or_else(|| ScrapeError::Parse(format!("no report id in link '{link}'")))?;
    Ok(ReportKey::new(language, country, code))
}

/// Path of the stored PDF for `key` under `dir`.
#[must_use]
pub fn report_path(dir: &Path, key: &ReportKey) -> PathBuf {
    dir.join(format!("{}.pdf", key.file_stem()))
}

/// Finds the `href` of the "Download PDF" anchor in a content page.
#[must_use]
pub fn find_download_href(html: &str) -> Option<String> {
    let document = Html::parse_document(html);
    let anchor_sel = Selector::parse("a[href]").unwrap_or_else(|_| unreachable!());

    document
        .select(&anchor_sel)
        .find(|a| a.text().collect::<String>().trim() == DOWNLOAD_LINK_TEXT)
        .and_then(|a| a.value().attr("href"))
        .map(str::to_owned)
}

/// Resolves `href` against the origin of `page`.
///
/// # Errors
///
/// Returns [`ScrapeError::Parse`] if the joined URL is invalid.
pub fn resolve_download_url(page: &reqwest::Url, href: &str) -> Result<reqwest::Url, ScrapeError> {
    let mut origin = page.clone();
    origin.set_path("/");
    origin.set_query(None);
    origin.set_fragment(None);

    origin
        .join(href)
        .map_err(|e| ScrapeError::Parse(format!("invalid download href '{href}': {e}")))
}

/// Result of fetching one report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// The PDF was already on disk; nothing was requested.
    Cached(PathBuf),
    /// The PDF was downloaded and written.
    Downloaded {
        /// Where the PDF was written.
        path: PathBuf,
        /// Size of the PDF in bytes.
        bytes: u64,
    },
}

impl FetchOutcome {
    /// Path of the stored PDF.
    #[must_use]
    pub fn path(&self) -> &Path {
        match self {
            Self::Cached(path) | Self::Downloaded { path, .. } => path,
        }
    }
}

/// Downloads report PDFs into a directory, skipping ones already present.
pub struct ReportFetcher {
    client: reqwest::Client,
    pdf_dir: PathBuf,
}

impl ReportFetcher {
    /// Creates a fetcher that stores PDFs under `pdf_dir`.
    #[must_use]
    pub fn new(client: reqwest::Client, pdf_dir: impl Into<PathBuf>) -> Self {
        Self {
            client,
            pdf_dir: pdf_dir.into(),
        }
    }

    /// Directory PDFs are stored in.
    #[must_use]
    pub fn pdf_dir(&self) -> &Path {
        &self.pdf_dir
    }

    /// Fetches the report behind the content page `link`.
    ///
    /// A report whose PDF already exists is not requested again. Downloads
    /// are written to a `.part` file and renamed into place, so an
    /// interrupted run never leaves a truncated PDF under the final name.
    ///
    /// # Errors
    ///
    /// Returns [`ScrapeError::NotFound`] if the content page has no
    /// download anchor, or another [`ScrapeError`] if a request or a
    /// filesystem operation fails.
    pub async fn fetch(
        &self,
        link: &str,
        language: &str,
        country: &str,
    ) -> Result<FetchOutcome, ScrapeError> {
        let key = report_key(link, language, country)?;
        let path = report_path(&self.pdf_dir, &key);

        if tokio::fs::try_exists(&path).await? {
            log::debug!("{key}: already downloaded");
            return Ok(FetchOutcome::Cached(path));
        }

        let page_url = reqwest::Url::parse(link)
            .map_err(|e| ScrapeError::Parse(format!("invalid link '{link}': {e}")))?;

        log::debug!("{key}: fetching content page {page_url}");
        let html = self
            .client
            .get(page_url.clone())
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;

        let href = find_download_href(&html)
            .ok_or_else(|| ScrapeError::NotFound(format!("no download link on {link}")))?;
        let pdf_url = resolve_download_url(&page_url, &href)?;

        log::info!("{key}: downloading {pdf_url}");
        let body = self
            .client
            .get(pdf_url)
            .send()
            .await?
            .error_for_status()?
            .bytes()
            .await?;

        tokio::fs::create_dir_all(&self.pdf_dir).await?;
        let partial = path.with_extension("pdf.part");
        tokio::fs::write(&partial, &body).await?;
        tokio::fs::rename(&partial, &path).await?;

        Ok(FetchOutcome::Downloaded {
            path,
            bytes: u64::try_from(body.len()).unwrap_or(u64::MAX),
        })
    }
}
