use std::collections::BTreeMap;
use std::time::Duration;

use stickr_core::{ErrorKind, RunConfig, Target, TransportErrorKind, run_http};
use stickr_testserver::{PATH_HELLO, PATH_STICKY, PATH_UNSTICKY, TestServer};

fn config(target: &str, workers: usize, requests: u64) -> anyhow::Result<RunConfig> {
    let mut cfg = RunConfig::new(Target::parse(target)?);
    cfg.workers = workers;
    cfg.requests_per_worker = requests;
    cfg.request_delay = Duration::ZERO;
    Ok(cfg)
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn hello_counts_every_request_as_200() -> anyhow::Result<()> {
    let server = TestServer::start().await?;

    let summary = run_http(config(&server.target(PATH_HELLO), 4, 10)?, None).await?;

    assert_eq!(summary.report.statuses, BTreeMap::from([(200, 40)]));
    assert!(summary.report.is_clean());
    assert_eq!(summary.report.workers, 4);
    assert_eq!(summary.report.sessions, 0);
    assert!(summary.report.latency.is_some());
    assert_eq!(server.stats().requests_total(), 40);

    server.shutdown().await;
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn sticky_sessions_are_replayed_without_violations() -> anyhow::Result<()> {
    let server = TestServer::start().await?;

    let summary = run_http(config(&server.target(PATH_STICKY), 3, 5)?, None).await?;

    assert_eq!(summary.report.statuses, BTreeMap::from([(200, 15)]));
    assert!(summary.report.is_clean());
    assert_eq!(summary.report.sessions, 3);
    // One Set-Cookie per worker, on the first response only.
    assert_eq!(summary.report.nodes.values().sum::<u64>(), 3);
    assert!(summary.report.nodes.keys().all(|n| n.starts_with("node")));
    assert_eq!(server.stats().sessions_issued(), 3);
    assert_eq!(server.stats().requests_with_session(), 12);

    server.shutdown().await;
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn rotating_sessions_are_counted_as_violations() -> anyhow::Result<()> {
    let server = TestServer::start().await?;

    let summary = run_http(config(&server.target(PATH_UNSTICKY), 2, 4)?, None).await?;

    assert_eq!(summary.report.statuses, BTreeMap::from([(200, 8)]));
    // Every response after the first carries a token the worker did not adopt.
    assert_eq!(
        summary.report.errors,
        BTreeMap::from([(ErrorKind::StickinessViolation, 6)])
    );
    assert_eq!(summary.report.error_kinds(), 1);
    assert_eq!(summary.report.requests_total(), 8);
    assert_eq!(summary.report.nodes.values().sum::<u64>(), 8);

    server.shutdown().await;
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn disabled_stickiness_ignores_rotating_sessions() -> anyhow::Result<()> {
    let server = TestServer::start().await?;

    let mut cfg = config(&server.target(PATH_UNSTICKY), 2, 4)?;
    cfg.check_stickiness = false;
    let summary = run_http(cfg, None).await?;

    assert!(summary.report.is_clean());
    assert!(summary.report.nodes.is_empty());
    assert_eq!(server.stats().requests_with_session(), 0);

    server.shutdown().await;
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn error_statuses_are_responses_not_errors() -> anyhow::Result<()> {
    let server = TestServer::start().await?;

    let summary = run_http(config(&server.target("/status/503"), 2, 3)?, None).await?;

    assert_eq!(summary.report.statuses, BTreeMap::from([(503, 6)]));
    assert!(summary.report.is_clean());

    server.shutdown().await;
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn closed_connections_still_complete() -> anyhow::Result<()> {
    let server = TestServer::start().await?;

    let mut cfg = config(&server.target(PATH_STICKY), 2, 5)?;
    cfg.reuse_connection = false;
    let summary = run_http(cfg, None).await?;

    assert_eq!(summary.report.statuses, BTreeMap::from([(200, 10)]));
    assert!(summary.report.is_clean());
    // A fresh connection per request.
    assert_eq!(server.stats().connections_accepted(), 10);

    server.shutdown().await;
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn reused_connections_stay_per_worker() -> anyhow::Result<()> {
    let server = TestServer::start().await?;

    let summary = run_http(config(&server.target(PATH_HELLO), 2, 5)?, None).await?;

    assert_eq!(summary.report.statuses, BTreeMap::from([(200, 10)]));
    // Each worker owns its client, so at least one connection per worker.
    let accepted = server.stats().connections_accepted();
    assert!((2..10).contains(&accepted), "accepted {accepted} connections");

    server.shutdown().await;
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn refused_port_is_a_transport_error() -> anyhow::Result<()> {
    // Bind and drop to get a port nothing listens on.
    let listener = std::net::TcpListener::bind("127.0.0.1:0")?;
    let addr = listener.local_addr()?;
    drop(listener);

    let summary = run_http(config(&format!("{addr}/"), 2, 3)?, None).await?;

    assert!(summary.report.statuses.is_empty());
    assert_eq!(
        summary.report.errors,
        BTreeMap::from([(
            ErrorKind::Transport(TransportErrorKind::ConnectionRefused),
            6
        )])
    );
    assert_eq!(summary.report.error_kinds(), 1);
    Ok(())
}
