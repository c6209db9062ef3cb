mod barrier;
mod progress;
mod run;
mod worker;

pub use barrier::StartBarrier;
pub use progress::{ProgressFn, ProgressUpdate};
pub use run::{RunSummary, run, run_http};
pub use worker::Worker;
