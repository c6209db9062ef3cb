use std::collections::BTreeMap;

use super::latency::LatencySummary;
use super::probe::ErrorKind;

/// Everything one worker observed. Handed to the orchestrator exactly once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkerResult {
    pub worker_id: usize,
    pub statuses: BTreeMap<u16, u64>,
    pub errors: BTreeMap<ErrorKind, u64>,
    /// Requests per backend node, keyed by the suffix of the affinity token.
    pub nodes: BTreeMap<String, u64>,
    pub latency: Option<LatencySummary>,
    /// The first affinity token this worker adopted, if any.
    pub affinity_token: Option<String>,
}

/// Merge accumulator and final output of a run.
///
/// `Report::default()` is the identity of [`Report::merge`]. Histograms and counters combine
/// exactly, so any fold order or grouping yields the same counts; the latency scalars combine
/// pairwise as described on [`LatencySummary::merge`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Report {
    /// Number of worker results folded in.
    pub workers: u64,
    /// Workers that established an affinity token.
    pub sessions: u64,
    pub statuses: BTreeMap<u16, u64>,
    pub errors: BTreeMap<ErrorKind, u64>,
    pub nodes: BTreeMap<String, u64>,
    pub latency: Option<LatencySummary>,
}

impl Report {
    #[must_use]
    pub fn merge(mut self, other: Self) -> Self {
        self.workers += other.workers;
        self.sessions += other.sessions;
        add_counts(&mut self.statuses, other.statuses);
        add_counts(&mut self.errors, other.errors);
        add_counts(&mut self.nodes, other.nodes);
        self.latency = match (self.latency, other.latency) {
            (Some(a), Some(b)) => Some(a.merge(b)),
            (a, b) => a.or(b),
        };
        self
    }

    /// Requests that produced a status code or a transport error.
    ///
    /// Stickiness violations annotate a response that is already counted under its status.
    pub fn requests_total(&self) -> u64 {
        let responses: u64 = self.statuses.values().sum();
        let failures: u64 = self
            .errors
            .iter()
            .filter(|(kind, _)| matches!(kind, ErrorKind::Transport(_)))
            .map(|(_, count)| count)
            .sum();
        responses + failures
    }

    /// Number of distinct error buckets observed, which is also the process exit code.
    pub fn error_kinds(&self) -> usize {
        self.errors.values().filter(|count| **count > 0).count()
    }

    pub fn is_clean(&self) -> bool {
        self.error_kinds() == 0
    }
}

/// Free-standing form of [`Report::merge`], handy as a fold operand.
#[must_use]
pub fn merge(a: Report, b: Report) -> Report {
    a.merge(b)
}

impl From<WorkerResult> for Report {
    fn from(r: WorkerResult) -> Self {
        Self {
            workers: 1,
            sessions: u64::from(r.affinity_token.is_some()),
            statuses: r.statuses,
            errors: r.errors,
            nodes: r.nodes,
            latency: r.latency,
        }
    }
}

impl FromIterator<WorkerResult> for Report {
    fn from_iter<I: IntoIterator<Item = WorkerResult>>(iter: I) -> Self {
        iter.into_iter()
            .map(Report::from)
            .fold(Report::default(), merge)
    }
}

fn add_counts<K: Ord>(into: &mut BTreeMap<K, u64>, from: BTreeMap<K, u64>) {
    for (k, v) in from {
        *into.entry(k).or_insert(0) += v;
    }
}
