#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! `pefa`: locate and extract the PI-1/PI-2/PI-3 budget execution tables
//! from PEFA assessment reports.
//!
//! Run a stage directly with a subcommand, or with none for an interactive
//! menu. Logging goes through [`pefa_cli_utils::init_logger`], so set
//! `RUST_LOG=info` to follow progress per document.

mod interactive;
mod stages;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use pefa_pipeline::PipelineConfig;
use pefa_pipeline::extract::ExtractOptions;
use pefa_pipeline::locate::LocateOptions;

#[derive(Parser)]
#[command(
    name = "pefa",
    about = "Locate and extract budget execution tables from PEFA reports"
)]
struct Cli {
    /// Pipeline config file (TOML); built-in defaults are used when omitted
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Download the report PDFs selected from the metadata sheet
    Download,
    /// Find the table start page in each PDF and write the review sheet
    Locate {
        /// Only reports in this language (profile name or alias)
        #[arg(long)]
        language: Option<String>,
        /// Only this PDF (path or file name)
        #[arg(long)]
        only: Option<PathBuf>,
    },
    /// Extract and normalize the tables listed in the reviewed sheet
    Extract {
        /// Re-extract reports whose output CSV already exists
        #[arg(long)]
        force: bool,
    },
    /// List the configured language profiles
    Profiles,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let multi = pefa_cli_utils::init_logger();
    let cli = Cli::parse();
    let config = PipelineConfig::load_or_default(cli.config.as_deref())?;

    let Some(command) = cli.command else {
        return interactive::run(&config, &multi).await;
    };

    match command {
        Commands::Download => {
            stages::download(&config, &multi).await?;
        }
        Commands::Locate { language, only } => {
            stages::locate(&config, &multi, &LocateOptions { language, only })?;
        }
        Commands::Extract { force } => {
            stages::extract(&config, &multi, ExtractOptions { force })?;
        }
        Commands::Profiles => stages::list_profiles(&config)?,
    }

    Ok(())
}
