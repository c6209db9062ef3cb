use serde::Serialize;
use std::collections::BTreeMap;
use std::io::Write as _;
use std::time::Duration;

use super::OutputFormatter;

/// One NDJSON summary line on stdout; nothing is printed while the run is in flight.
pub(crate) struct JsonOutput;

impl OutputFormatter for JsonOutput {
    fn print_header(&self, _config: &stickr_core::RunConfig) {}

    fn progress(&self) -> Option<stickr_core::ProgressFn> {
        None
    }

    fn print_summary(&self, summary: &stickr_core::RunSummary) -> anyhow::Result<()> {
        let line = build_summary_line(summary);
        let mut out = std::io::stdout().lock();
        serde_json::to_writer(&mut out, &line)?;
        writeln!(out)?;
        Ok(())
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct JsonSummaryLine {
    pub kind: &'static str,
    pub elapsed_secs: f64,
    pub workers: u64,
    pub sessions: u64,
    pub requests_total: u64,
    pub requests_per_sec: f64,
    pub error_kinds: usize,

    pub statuses: BTreeMap<u16, u64>,
    pub errors: BTreeMap<String, u64>,
    pub distribution: BTreeMap<String, u64>,

    pub latency: Option<JsonLatencySummary>,
}

/// Latencies in microseconds.
#[derive(Debug, Serialize)]
pub(crate) struct JsonLatencySummary {
    pub average: f64,
    pub min: f64,
    pub max: f64,
    pub median: f64,
    pub p90: f64,
}

fn micros(d: Duration) -> f64 {
    d.as_nanos() as f64 / 1_000.0
}

fn build_summary_line(summary: &stickr_core::RunSummary) -> JsonSummaryLine {
    let report = &summary.report;

    JsonSummaryLine {
        kind: "summary",
        elapsed_secs: summary.elapsed.as_secs_f64(),
        workers: report.workers,
        sessions: report.sessions,
        requests_total: report.requests_total(),
        requests_per_sec: summary.requests_per_sec(),
        error_kinds: report.error_kinds(),
        statuses: report.statuses.clone(),
        errors: report
            .errors
            .iter()
            .map(|(kind, count)| (kind.to_string(), *count))
            .collect(),
        distribution: report.nodes.clone(),
        latency: report.latency.as_ref().map(|l| JsonLatencySummary {
            average: micros(l.average),
            min: micros(l.min),
            max: micros(l.max),
            median: micros(l.median),
            p90: micros(l.p90),
        }),
    }
}
