use std::sync::Mutex;

use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};

/// Bar of finished workers on stderr. Workers mostly finish together, so the message carries the
/// running request and error counts as well.
pub(crate) struct HumanProgress {
    bar: Mutex<Option<ProgressBar>>,
}

impl HumanProgress {
    pub(crate) fn new() -> Self {
        Self {
            bar: Mutex::new(None),
        }
    }

    pub(crate) fn start(&self, workers: u64) {
        let pb = ProgressBar::with_draw_target(Some(workers), ProgressDrawTarget::stderr_with_hz(5));
        pb.set_style(bar_style());
        pb.set_prefix("workers");

        let mut bar = self.bar.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        if let Some(old) = bar.replace(pb) {
            old.finish_and_clear();
        }
    }

    pub(crate) fn update(&self, completed: u64, message: String) {
        let bar = self.bar.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        if let Some(pb) = bar.as_ref() {
            pb.set_position(completed);
            pb.set_message(message);
        }
    }

    pub(crate) fn finish(&self) {
        let mut bar = self.bar.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        if let Some(pb) = bar.take() {
            pb.finish_and_clear();
        }
    }
}

fn bar_style() -> ProgressStyle {
    ProgressStyle::with_template("{prefix} [ {bar:20.cyan/blue} ] {pos}/{len} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█░")
}
