use std::collections::BTreeMap;
use std::time::{Duration, Instant};

use crate::affinity;
use crate::config::RunConfig;
use crate::latency::LatencySummary;
use crate::probe::{ErrorKind, HttpProbe, Outcome};
use crate::report::WorkerResult;

use super::barrier::StartBarrier;

/// One simulated client. Owns its probe and all of its accumulation state; nothing here is
/// shared with other workers.
#[derive(Debug)]
pub struct Worker<P> {
    id: usize,
    probe: P,
    check_stickiness: bool,

    /// Token replayed on every request once adopted. Never replaced after a break, so the
    /// balancer keeps being asked for the original node.
    session: Option<String>,

    statuses: BTreeMap<u16, u64>,
    errors: BTreeMap<ErrorKind, u64>,
    nodes: BTreeMap<String, u64>,
    samples: Vec<Duration>,
}

impl<P: HttpProbe> Worker<P> {
    pub fn new(id: usize, probe: P, config: &RunConfig) -> Self {
        Self {
            id,
            probe,
            check_stickiness: config.check_stickiness,
            session: None,
            statuses: BTreeMap::new(),
            errors: BTreeMap::new(),
            nodes: BTreeMap::new(),
            samples: Vec::with_capacity(
                usize::try_from(config.requests_per_worker).unwrap_or(usize::MAX).min(1 << 20),
            ),
        }
    }

    /// Waits at the start barrier, then issues `requests_per_worker` strictly sequential GETs.
    pub async fn run(mut self, config: &RunConfig, start: &StartBarrier) -> WorkerResult {
        start.wait().await;

        let path = config.target.path.as_str();
        for _ in 0..config.requests_per_worker {
            self.request_once(path).await;

            if !config.request_delay.is_zero() {
                tokio::time::sleep(config.request_delay).await;
            }
        }

        self.finish()
    }

    async fn request_once(&mut self, path: &str) {
        let cookie = self.session.as_deref().map(affinity::cookie_header);

        let started = Instant::now();
        let outcome = self.probe.get(path, cookie.as_deref()).await;
        self.samples.push(started.elapsed());

        self.record(outcome);
    }

    fn record(&mut self, outcome: Outcome) {
        match outcome {
            Outcome::Success { status, headers } => {
                *self.statuses.entry(status).or_insert(0) += 1;
                if self.check_stickiness {
                    self.track_affinity(&headers);
                }
            }
            // No cookies to look at without a response.
            Outcome::TransportError { kind } => {
                *self.errors.entry(kind).or_insert(0) += 1;
            }
        }
    }

    fn track_affinity(&mut self, headers: &[(String, String)]) {
        let Some(token) = affinity::session_token(headers) else {
            return;
        };

        match &self.session {
            None => self.session = Some(token.clone()),
            Some(expected) if *expected != token => {
                tracing::warn!(
                    worker = self.id,
                    expected = %expected,
                    observed = %token,
                    "stickiness break"
                );
                *self.errors.entry(ErrorKind::StickinessViolation).or_insert(0) += 1;
            }
            Some(_) => {}
        }

        if let Some(node) = affinity::node_id(&token) {
            *self.nodes.entry(node.to_string()).or_insert(0) += 1;
        }
    }

    fn finish(self) -> WorkerResult {
        WorkerResult {
            worker_id: self.id,
            statuses: self.statuses,
            errors: self.errors,
            nodes: self.nodes,
            latency: LatencySummary::from_samples(self.samples),
            affinity_token: self.session,
        }
    }
}
