#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Terminal plumbing shared by the PEFA table binaries.
//!
//! [`IndicatifProgress`] renders a pipeline stage's [`ProgressCallback`]
//! updates as an `indicatif` bar. [`init_logger`] installs
//! `pretty_env_logger` behind `indicatif-log-bridge`, so log lines are
//! printed above the bars instead of through them.

use std::sync::Arc;
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use pefa_pipeline::progress::ProgressCallback;

pub use indicatif::MultiProgress;

/// A stage progress bar.
///
/// Starts as a spinner while the stage is still listing its documents and
/// switches to a bar with position and ETA once the total is known.
pub struct IndicatifProgress {
    bar: ProgressBar,
    bar_style: ProgressStyle,
}

impl IndicatifProgress {
    /// Adds a stage bar labelled `message` to `multi`.
    #[must_use]
    pub fn stage_bar(multi: &MultiProgress, message: &str) -> Arc<dyn ProgressCallback> {
        let bar = multi.add(ProgressBar::new_spinner());
        bar.enable_steady_tick(Duration::from_millis(100));
        bar.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {prefix} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        bar.set_prefix(message.to_owned());

        let bar_style = ProgressStyle::with_template(
            "{prefix} {wide_bar:.cyan/dim} {pos}/{len} [{eta}] {msg}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("##-");

        Arc::new(Self { bar, bar_style })
    }
}

impl ProgressCallback for IndicatifProgress {
    fn set_total(&self, total: u64) {
        self.bar.set_length(total);
        self.bar.set_position(0);
        self.bar.set_style(self.bar_style.clone());
    }

    fn inc(&self, delta: u64) {
        self.bar.inc(delta);
    }

    fn set_message(&self, msg: String) {
        self.bar.set_message(msg);
    }

    fn finish(&self, msg: String) {
        self.bar.finish_with_message(msg);
    }
}

/// Installs the global logger and returns the [`MultiProgress`] every
/// progress bar must be added to.
///
/// The level comes from `RUST_LOG` (default `error`, as with
/// `pretty_env_logger`).
#[must_use]
pub fn init_logger() -> MultiProgress {
    let multi = MultiProgress::new();

    let logger = pretty_env_logger::formatted_builder()
        .parse_env("RUST_LOG")
        .build();
    let level = logger.filter();

    // Already set when called twice in one process.
    indicatif_log_bridge::LogWrapper::new(multi.clone(), logger)
        .try_init()
        .ok();

    log::set_max_level(level);

    multi
}
