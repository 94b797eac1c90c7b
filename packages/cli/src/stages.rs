//! Stage runners shared by the subcommands and the interactive menu.

use std::time::Instant;

use pefa_cli_utils::{IndicatifProgress, MultiProgress};
use pefa_pipeline::extract::ExtractOptions;
use pefa_pipeline::locate::LocateOptions;
use pefa_pipeline::{BatchSummary, PipelineConfig, PipelineError};

/// Runs the download stage with a progress bar.
///
/// # Errors
///
/// Returns [`PipelineError`] if the metadata sheet cannot be read.
pub async fn download(
    config: &PipelineConfig,
    multi: &MultiProgress,
) -> Result<BatchSummary, PipelineError> {
    let start = Instant::now();
    let progress = IndicatifProgress::stage_bar(multi, "Downloading");
    let summary = pefa_pipeline::download::run(config, &progress).await?;
    log::info!("Download done in {:.1}s", start.elapsed().as_secs_f64());
    Ok(summary)
}

/// Runs the locate stage with a progress bar.
///
/// # Errors
///
/// Returns [`PipelineError`] if the profiles, the PDF directory, or the
/// review sheet cannot be used.
pub fn locate(
    config: &PipelineConfig,
    multi: &MultiProgress,
    options: &LocateOptions,
) -> Result<BatchSummary, PipelineError> {
    let start = Instant::now();
    let registry = config.profile_registry()?;
    let progress = IndicatifProgress::stage_bar(multi, "Locating");
    let summary = pefa_pipeline::locate::run(config, &registry, options, &progress)?;
    log::info!("Locate done in {:.1}s", start.elapsed().as_secs_f64());
    Ok(summary)
}

/// Runs the extract stage with a progress bar.
///
/// # Errors
///
/// Returns [`PipelineError`] if the reviewed sheet cannot be read.
pub fn extract(
    config: &PipelineConfig,
    multi: &MultiProgress,
    options: ExtractOptions,
) -> Result<BatchSummary, PipelineError> {
    let start = Instant::now();
    let progress = IndicatifProgress::stage_bar(multi, "Extracting");
    let summary = pefa_pipeline::extract::run(config, options, &progress)?;
    log::info!("Extract done in {:.1}s", start.elapsed().as_secs_f64());
    Ok(summary)
}

/// Prints every language profile with its aliases and pattern counts.
///
/// # Errors
///
/// Returns [`PipelineError`] if a profile fails to compile.
pub fn list_profiles(config: &PipelineConfig) -> Result<(), PipelineError> {
    let registry = config.profile_registry()?;

    println!("{:<12} {:<24} SECONDARY TERTIARY", "LANGUAGE", "ALIASES");
    println!("{}", "-".repeat(56));
    for profile in registry.profiles() {
        let (_, secondary, tertiary) = profile.pattern_counts();
        println!(
            "{:<12} {:<24} {secondary:<9} {tertiary}",
            profile.name(),
            profile.aliases().join(", ")
        );
    }

    Ok(())
}
