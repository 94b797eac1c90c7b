//! Per-document progress for the batch stages.
//!
//! A stage announces how many documents it will visit, names each document
//! as it reaches it, and closes with its [`BatchSummary`] through
//! [`finish_stage`]. The CLI draws this as an `indicatif` bar; tests pass
//! [`null_progress`].

use std::sync::Arc;

use crate::BatchSummary;

/// Receiver of a stage's progress updates.
pub trait ProgressCallback: Send + Sync {
    /// Sets the number of documents the stage will visit.
    fn set_total(&self, total: u64);

    /// Advances by `delta` documents.
    fn inc(&self, delta: u64);

    /// Names the document being worked on.
    fn set_message(&self, msg: String);

    /// Closes the indicator with a final line.
    fn finish(&self, msg: String);
}

/// Ignores every update.
pub struct NullProgress;

impl ProgressCallback for NullProgress {
    fn set_total(&self, _total: u64) {}
    fn inc(&self, _delta: u64) {}
    fn set_message(&self, _msg: String) {}
    fn finish(&self, _msg: String) {}
}

#[must_use]
pub fn null_progress() -> Arc<dyn ProgressCallback> {
    Arc::new(NullProgress)
}

/// Converts a document count for [`ProgressCallback::set_total`].
#[must_use]
pub fn as_total(count: usize) -> u64 {
    u64::try_from(count).unwrap_or(u64::MAX)
}

/// Closes `stage`'s indicator with its counts and logs them.
pub fn finish_stage(progress: &dyn ProgressCallback, stage: &str, summary: &BatchSummary) {
    progress.finish(format!("{stage}: {summary}"));
    log::info!("{stage} stage finished: {summary}");
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;

    #[derive(Default)]
    struct Recorded {
        total: Mutex<u64>,
        done: Mutex<u64>,
        lines: Mutex<Vec<String>>,
    }

    impl ProgressCallback for Recorded {
        fn set_total(&self, total: u64) {
            *self.total.lock().unwrap() = total;
        }

        fn inc(&self, delta: u64) {
            *self.done.lock().unwrap() += delta;
        }

        fn set_message(&self, msg: String) {
            self.lines.lock().unwrap().push(msg);
        }

        fn finish(&self, msg: String) {
            self.lines.lock().unwrap().push(msg);
        }
    }

    #[test]
    fn finish_stage_reports_the_counts() {
        let progress = Recorded::default();
        progress.set_total(as_total(3));
        progress.inc(1);
        progress.set_message("English_Testland_42".to_owned());
        progress.inc(2);

        let summary = BatchSummary {
            processed: 1,
            skipped: 1,
            failed: 1,
        };
        finish_stage(&progress, "Extract", &summary);

        assert_eq!(*progress.total.lock().unwrap(), 3);
        assert_eq!(*progress.done.lock().unwrap(), 3);
        assert_eq!(
            *progress.lines.lock().unwrap(),
            vec![
                "English_Testland_42".to_owned(),
                "Extract: 1 processed, 1 skipped, 1 failed".to_owned(),
            ]
        );
    }
}
