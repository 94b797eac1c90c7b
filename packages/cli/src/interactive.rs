//! Menu-driven front end, used when `pefa` runs without a subcommand.

use std::path::PathBuf;
use std::time::Instant;

use dialoguer::{Confirm, Input, MultiSelect};
use pefa_cli_utils::MultiProgress;
use pefa_pipeline::PipelineConfig;
use pefa_pipeline::extract::ExtractOptions;
use pefa_pipeline::locate::LocateOptions;

use crate::stages;

/// Pipeline steps, in run order.
enum Step {
    Download,
    Locate,
    Extract,
    Profiles,
}

impl Step {
    const ALL: &[Self] = &[Self::Download, Self::Locate, Self::Extract, Self::Profiles];

    #[must_use]
    const fn label(&self) -> &'static str {
        match self {
            Self::Download => "Download report PDFs",
            Self::Locate => "Locate tables (writes review sheet)",
            Self::Extract => "Extract reviewed tables",
            Self::Profiles => "List language profiles",
        }
    }
}

fn prompt_optional(prompt: &str) -> Result<Option<String>, Box<dyn std::error::Error>> {
    let input: String = Input::new()
        .with_prompt(prompt)
        .allow_empty(true)
        .interact_text()?;

    let input = input.trim();
    Ok((!input.is_empty()).then(|| input.to_owned()))
}

/// Prompts for the steps to run and their options, then runs them in
/// order.
///
/// # Errors
///
/// Returns an error if a prompt fails or a selected stage fails.
pub async fn run(
    config: &PipelineConfig,
    multi: &MultiProgress,
) -> Result<(), Box<dyn std::error::Error>> {
    println!("PEFA Table Toolchain");
    println!();

    let labels: Vec<&str> = Step::ALL.iter().map(Step::label).collect();
    let selected = MultiSelect::new()
        .with_prompt("Steps to run (space=toggle, enter=confirm)")
        .items(&labels)
        .interact()?;

    if selected.is_empty() {
        println!("No steps selected.");
        return Ok(());
    }

    let start = Instant::now();

    for idx in selected {
        match Step::ALL[idx] {
            Step::Download => {
                let summary = stages::download(config, multi).await?;
                println!("Download: {summary}");
            }
            Step::Locate => {
                let options = LocateOptions {
                    language: prompt_optional("Only this language (empty for all)")?,
                    only: prompt_optional("Only this PDF (empty for all)")?.map(PathBuf::from),
                };
                let summary = stages::locate(config, multi, &options)?;
                println!("Locate: {summary}");
                println!(
                    "Review {} and save it as {} before extracting.",
                    config.stage1_csv.display(),
                    config.reviewed_csv.display()
                );
            }
            Step::Extract => {
                let force = Confirm::new()
                    .with_prompt("Re-extract reports that already have output?")
                    .default(false)
                    .interact()?;
                let summary = stages::extract(config, multi, ExtractOptions { force })?;
                println!("Extract: {summary}");
            }
            Step::Profiles => stages::list_profiles(config)?,
        }
    }

    log::info!("Finished in {:.1}s", start.elapsed().as_secs_f64());

    Ok(())
}
