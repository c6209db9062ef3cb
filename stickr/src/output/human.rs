use std::sync::Arc;

mod duration;
mod format;
mod progress;
mod summary;

use progress::HumanProgress;
use summary::{render, render_header};

use super::OutputFormatter;

pub(crate) struct HumanReadableOutput {
    progress: Arc<HumanProgress>,
}

impl HumanReadableOutput {
    pub(crate) fn new() -> Self {
        Self {
            progress: Arc::new(HumanProgress::new()),
        }
    }
}

impl OutputFormatter for HumanReadableOutput {
    fn print_header(&self, config: &stickr_core::RunConfig) {
        print!("{}", render_header(config));
        println!();
        self.progress.start(config.workers as u64);
    }

    fn progress(&self) -> Option<stickr_core::ProgressFn> {
        let progress = self.progress.clone();

        Some(Arc::new(move |u| {
            let message = format!(
                "requests={} error_kinds={} elapsed={:.1}s",
                u.requests_total,
                u.error_kinds,
                u.elapsed.as_secs_f64()
            );
            progress.update(u.completed as u64, message);
        }))
    }

    fn print_summary(&self, summary: &stickr_core::RunSummary) -> anyhow::Result<()> {
        self.progress.finish();
        print!("{}", render(summary));
        Ok(())
    }
}
