#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Locates the budget execution variance table in assessment reports.
//!
//! The annex holding the PI-1/PI-2/PI-3 calculations has no fixed position
//! or heading. Location works in two steps:
//!
//! 1. [`locator`] scans the final third of the document for pages whose text
//!    matches a language profile's primary pattern (and its secondary
//!    patterns, possibly on the following page).
//! 2. [`resolver`] narrows the candidates down to one start page through an
//!    ordered chain of fallback rules.
//!
//! Language profiles are plain data, embedded as TOML and loaded through
//! [`registry::ProfileRegistry`]. The heuristic favours recall: a human
//! reviews every resolved page before extraction.

pub mod locator;
pub mod matcher;
pub mod profile;
pub mod registry;
pub mod resolver;

pub use locator::{locate_candidates, scan_start};
pub use profile::{LanguageProfile, ProfileDefinition};
pub use registry::ProfileRegistry;
pub use resolver::{locate_table_start, locate_table_start_from, resolve};

/// Errors that can occur while loading profiles or locating tables.
#[derive(Debug, thiserror::Error)]
pub enum LocateError {
    /// A profile pattern is not a valid regular expression.
    #[error("invalid pattern '{pattern}' in profile '{profile}': {source}")]
    Pattern {
        /// Profile the pattern belongs to.
        profile: String,
        /// The offending pattern.
        pattern: String,
        /// Underlying regex error.
        source: regex::Error,
    },

    /// A profile TOML document failed to parse.
    #[error("invalid profile TOML '{name}': {source}")]
    Toml {
        /// Name of the TOML source.
        name: String,
        /// Underlying parse error.
        source: toml::de::Error,
    },

    /// Two profiles claim the same language name or alias.
    #[error("language '{0}' is defined by more than one profile")]
    DuplicateLanguage(String),

    /// No profile is registered for a language.
    #[error("no profile configured for language '{0}'")]
    UnknownLanguage(String),

    /// Reading page text failed.
    #[error(transparent)]
    Pdf(#[from] pefa_pdf::PdfError),
}
