#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Assessment metadata ingestion and report download.
//!
//! The published assessment list is a CSV ([`metadata`]) with one row per
//! report and a link to its content page. [`fetch`] follows that link,
//! finds the page's "Download PDF" anchor, and stores the PDF under a
//! predictable `{language}_{country}_{code}.pdf` name. A report already on
//! disk is never fetched again.

pub mod fetch;
pub mod metadata;

use std::collections::BTreeMap;

/// Errors that can occur during metadata reading or report download.
#[derive(Debug, thiserror::Error)]
pub enum ScrapeError {
    /// An HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Parsing a URL or response body failed.
    #[error("Parse error: {0}")]
    Parse(String),

    /// The content page has no "Download PDF" anchor.
    #[error("Not found: {0}")]
    NotFound(String),

    /// An I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV parsing failed.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

/// Builds a [`reqwest::Client`] with the given default headers.
///
/// # Errors
///
/// Returns [`ScrapeError::Parse`] if a header name or value is invalid, or
/// [`ScrapeError::Http`] if the client cannot be built.
pub fn build_client(headers: &BTreeMap<String, String>) -> Result<reqwest::Client, ScrapeError> {
    let mut header_map = reqwest::header::HeaderMap::new();
    for (key, value) in headers {
        let name = reqwest::header::HeaderName::from_bytes(key.as_bytes())
            .map_err(|e| ScrapeError::Parse(format!("invalid header name '{key}': {e}")))?;
        let val = reqwest::header::HeaderValue::from_str(value)
            .map_err(|e| ScrapeError::Parse(format!("invalid header value '{value}': {e}")))?;
        header_map.insert(name, val);
    }
    reqwest::Client::builder()
        .default_headers(header_map)
        .build()
        .map_err(ScrapeError::Http)
}
