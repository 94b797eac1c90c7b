//! Pipeline settings.
//!
//! Every field has a default matching the conventional `data/` layout, so
//! a config file only needs the values it changes:
//!
//! ```toml
//! pdf_dir = "/mnt/reports"
//!
//! [filter]
//! framework = "2011 Framework"
//!
//! [[exclude]]
//! stem = "English_Kyrgyz Republic_181"
//! reason = "annex tables are scanned images"
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use pefa_locate::{LocateError, ProfileDefinition, ProfileRegistry};
use pefa_scraper::metadata::MetadataFilter;
use serde::Deserialize;

use crate::PipelineError;

/// Default prefix of a report's content page link; the report code is
/// appended.
pub const DEFAULT_REPORT_LINK_BASE: &str = "https://www.pefa.org/node/";

/// A report left out of extraction, with the reason.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ExcludedReport {
    /// File stem of the report PDF (e.g. `English_Testland_42`).
    pub stem: String,
    /// Why the report is excluded.
    #[serde(default)]
    pub reason: String,
}

/// Settings shared by all stages.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Assessment metadata sheet.
    pub metadata_csv: PathBuf,
    /// Directory report PDFs are downloaded to and read from.
    pub pdf_dir: PathBuf,
    /// Review sheet written by the locate stage.
    pub stage1_csv: PathBuf,
    /// Human-reviewed sheet read by the extract stage.
    pub reviewed_csv: PathBuf,
    /// Directory of per-report output CSVs.
    pub output_dir: PathBuf,
    /// Prefix for `Link to Content` in the review sheet.
    pub report_link_base: String,
    /// Which metadata rows to download.
    pub filter: MetadataFilter,
    /// Default HTTP headers for downloads.
    pub headers: BTreeMap<String, String>,
    /// Reports skipped at extraction.
    pub exclude: Vec<ExcludedReport>,
    /// Extra language profiles; one named like a built-in profile
    /// replaces it.
    pub profiles: Vec<ProfileDefinition>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            metadata_csv: PathBuf::from("data/pefa-assessments.csv"),
            pdf_dir: PathBuf::from("data/pdfs"),
            stage1_csv: PathBuf::from("data/stage1.csv"),
            reviewed_csv: PathBuf::from("data/stage1_reviewed.csv"),
            output_dir: PathBuf::from("data/csvs_consolidated"),
            report_link_base: DEFAULT_REPORT_LINK_BASE.to_owned(),
            filter: MetadataFilter::default(),
            headers: BTreeMap::from([(
                "User-Agent".to_owned(),
                concat!("pefa-tables/", env!("CARGO_PKG_VERSION")).to_owned(),
            )]),
            exclude: Vec::new(),
            profiles: Vec::new(),
        }
    }
}

impl PipelineConfig {
    /// Parses a config from TOML text. `path` is only used in errors.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::Config`] if the TOML is malformed or has
    /// fields of the wrong type.
    pub fn from_toml_str(path: &Path, toml: &str) -> Result<Self, PipelineError> {
        toml::from_str(toml).map_err(|source| PipelineError::Config {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Reads a config file.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError`] if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self, PipelineError> {
        let toml = std::fs::read_to_string(path)?;
        let config = Self::from_toml_str(path, &toml)?;
        log::info!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Reads `path` if given, otherwise returns the defaults.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError`] if the file cannot be read or parsed.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, PipelineError> {
        path.map_or_else(|| Ok(Self::default()), Self::load)
    }

    /// The exclusion entry for a report stem, if any.
    #[must_use]
    pub fn exclusion(&self, stem: &str) -> Option<&ExcludedReport> {
        self.exclude.iter().find(|e| e.stem == stem)
    }

    /// Content page link for a report code.
    #[must_use]
    pub fn report_link(&self, code: &str) -> String {
        format!("{}{code}", self.report_link_base)
    }

    /// Builds the language profile registry: built-in profiles plus the
    /// configured ones.
    ///
    /// # Errors
    ///
    /// Returns [`LocateError`] if a profile fails to compile or two
    /// profiles claim the same language.
    pub fn profile_registry(&self) -> Result<ProfileRegistry, LocateError> {
        ProfileRegistry::builtin_with(self.profiles.clone())
    }
}
