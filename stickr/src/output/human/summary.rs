use std::fmt::Write as _;

use super::duration::format_duration;
use super::format::format_rate;

pub(crate) fn render_header(config: &stickr_core::RunConfig) -> String {
    let mut out = String::new();
    writeln!(
        out,
        "url: {} clients: {} requests: {} delay: {}",
        config.target,
        config.workers,
        config.requests_per_worker,
        format_duration(config.request_delay)
    )
    .ok();
    writeln!(
        out,
        "reuse connections: {} check stickiness: {}",
        yes_no(config.reuse_connection),
        yes_no(config.check_stickiness)
    )
    .ok();
    out
}

pub(crate) fn render(summary: &stickr_core::RunSummary) -> String {
    let report = &summary.report;
    let mut out = String::new();

    out.push_str("statuses:\n");
    for (status, count) in &report.statuses {
        writeln!(out, "  {status}: {count}").ok();
    }

    if !report.errors.is_empty() {
        out.push_str("errors:\n");
        for (kind, count) in &report.errors {
            writeln!(out, "  {kind}: {count}").ok();
        }
    }

    if !report.nodes.is_empty() {
        out.push_str("distribution:\n");
        for (node, count) in &report.nodes {
            writeln!(out, "  {node}: {count}").ok();
        }
        writeln!(out, "sessions: {}/{}", report.sessions, report.workers).ok();
    }

    match &report.latency {
        Some(l) => {
            writeln!(
                out,
                "latency: avg={} min={} max={} median={} p90-max={}",
                format_duration(l.average),
                format_duration(l.min),
                format_duration(l.max),
                format_duration(l.median),
                format_duration(l.p90)
            )
            .ok();
        }
        None => out.push_str("latency: n/a\n"),
    }

    writeln!(
        out,
        "requests: {} in {:.2}s ({} req/s)",
        report.requests_total(),
        summary.elapsed.as_secs_f64(),
        format_rate(summary.requests_per_sec())
    )
    .ok();

    out
}

fn yes_no(v: bool) -> &'static str {
    if v { "yes" } else { "no" }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;
    use std::time::Duration;
    use stickr_core::{
        ErrorKind, LatencySummary, Report, RunConfig, RunSummary, Target, TransportErrorKind,
    };

    fn summary(report: Report) -> RunSummary {
        RunSummary {
            report,
            elapsed: Duration::from_secs(4),
        }
    }

    #[test]
    fn header_names_target_and_parameters() {
        let target = match Target::parse("http://lb:8080/app") {
            Ok(t) => t,
            Err(err) => panic!("target: {err}"),
        };
        let mut cfg = RunConfig::new(target);
        cfg.workers = 4;
        cfg.requests_per_worker = 10;
        let text = render_header(&cfg);
        assert!(text.starts_with("url: lb:8080/app clients: 4 requests: 10 delay: 1.00ms\n"));
        assert!(text.contains("check stickiness: yes"));
    }

    #[test]
    fn sections_list_histograms() {
        let report = Report {
            workers: 2,
            sessions: 2,
            statuses: BTreeMap::from([(200, 38), (503, 2)]),
            errors: BTreeMap::from([
                (ErrorKind::Transport(TransportErrorKind::Timeout), 1),
                (ErrorKind::StickinessViolation, 3),
            ]),
            nodes: BTreeMap::from([("node1".to_string(), 20), ("node2".to_string(), 20)]),
            latency: LatencySummary::from_samples(vec![Duration::from_millis(2); 4]),
        };
        let text = render(&summary(report));

        assert!(text.contains("statuses:\n  200: 38\n  503: 2\n"));
        assert!(text.contains("errors:\n  timeout: 1\n  stickiness_violation: 3\n"));
        assert!(text.contains("distribution:\n  node1: 20\n  node2: 20\n"));
        assert!(text.contains(
            "latency: avg=2.00ms min=2.00ms max=2.00ms median=2.00ms p90-max=2.00ms"
        ));
        // Violations annotate responses already counted under a status.
        assert!(text.contains("requests: 41 in 4.00s (10 req/s)"));
    }

    #[test]
    fn empty_sections_are_omitted() {
        let text = render(&summary(Report::default()));
        assert!(text.starts_with("statuses:\nlatency: n/a\n"));
        assert!(!text.contains("errors:"));
        assert!(!text.contains("distribution:"));
        assert!(text.contains("latency: n/a"));
    }
}
