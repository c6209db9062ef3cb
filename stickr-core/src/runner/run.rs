use std::sync::Arc;
use std::time::Duration;

use tokio::task::{JoinError, JoinSet};

use crate::config::RunConfig;
use crate::error::Result;
use crate::probe::{ClientProbe, HttpProbe};
use crate::report::Report;

use super::barrier::StartBarrier;
use super::progress::{ProgressFn, ProgressUpdate};
use super::worker::Worker;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub report: Report,
    /// From the start barrier release until the last worker handed back its result.
    pub elapsed: Duration,
}

impl RunSummary {
    pub fn requests_per_sec(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs > 0.0 {
            self.report.requests_total() as f64 / secs
        } else {
            0.0
        }
    }
}

/// Runs every worker to completion and folds their results into one report.
///
/// `make_probe` is called once per worker (ids start at 1) before any task is spawned. Results
/// are merged in completion order. A panicking worker does not stop the others; the run still
/// drains every task and then reports the first join failure.
pub async fn run<P, F>(
    config: RunConfig,
    mut make_probe: F,
    progress: Option<ProgressFn>,
) -> Result<RunSummary>
where
    P: HttpProbe + 'static,
    F: FnMut(usize, &RunConfig) -> P,
{
    config.validate()?;

    let config = Arc::new(config);
    let total = config.workers;
    let start = Arc::new(StartBarrier::new(total));

    let mut tasks: JoinSet<crate::report::WorkerResult> = JoinSet::new();
    for worker_id in 1..=total {
        let probe = make_probe(worker_id, config.as_ref());
        let worker = Worker::new(worker_id, probe, &config);
        let config = config.clone();
        let start = start.clone();
        tasks.spawn(async move { worker.run(&config, &start).await });
    }

    tracing::info!(
        target_url = %config.target.url(),
        workers = total,
        requests_per_worker = config.requests_per_worker,
        delay = ?config.request_delay,
        reuse_connection = config.reuse_connection,
        check_stickiness = config.check_stickiness,
        "workers spawned"
    );

    let mut report = Report::default();
    let mut completed = 0usize;
    let mut first_failure: Option<JoinError> = None;

    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok(result) => {
                tracing::debug!(
                    worker = result.worker_id,
                    token = ?result.affinity_token,
                    errors = result.errors.len(),
                    "worker finished"
                );
                report = report.merge(result.into());
                completed += 1;

                if let Some(progress) = &progress {
                    progress(ProgressUpdate {
                        completed,
                        total,
                        elapsed: elapsed_since_release(&start),
                        requests_total: report.requests_total(),
                        error_kinds: report.error_kinds(),
                    });
                }
            }
            Err(err) => {
                tracing::error!(error = %err, "worker task failed");
                first_failure.get_or_insert(err);
            }
        }
    }

    if let Some(err) = first_failure {
        return Err(err.into());
    }

    let elapsed = elapsed_since_release(&start);
    tracing::info!(
        elapsed = ?elapsed,
        requests = report.requests_total(),
        error_kinds = report.error_kinds(),
        "run finished"
    );

    Ok(RunSummary { report, elapsed })
}

/// [`run`] with one [`ClientProbe`] per worker.
pub async fn run_http(config: RunConfig, progress: Option<ProgressFn>) -> Result<RunSummary> {
    run(config, |_, cfg| ClientProbe::new(cfg), progress).await
}

fn elapsed_since_release(start: &StartBarrier) -> Duration {
    start
        .released_at()
        .map(|at| at.elapsed())
        .unwrap_or_default()
}
