use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use axum::Router;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::serve::Listener;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::oneshot;
use tokio::time::{Duration, sleep};

pub const PATH_HELLO: &str = "/hello";
pub const PATH_SLOW: &str = "/slow";
/// Issues a session on first contact and honors it afterwards.
pub const PATH_STICKY: &str = "/sticky";
/// Issues a fresh session on another node for every request.
pub const PATH_UNSTICKY: &str = "/unsticky";
pub const PATH_STATUS: &str = "/status/{code}";

/// Number of simulated backend nodes sessions are spread over (`node1`..`nodeN`).
pub const NODES: u64 = 3;

#[derive(Debug, Clone, Default)]
pub struct TestServerStats {
    requests_total: Arc<AtomicU64>,
    requests_with_session: Arc<AtomicU64>,
    sessions_issued: Arc<AtomicU64>,
    connections_accepted: Arc<AtomicU64>,
}

impl TestServerStats {
    fn observe(&self, headers: &HeaderMap) -> Option<String> {
        self.requests_total.fetch_add(1, Ordering::Relaxed);
        let session = request_session(headers);
        if session.is_some() {
            self.requests_with_session.fetch_add(1, Ordering::Relaxed);
        }
        session
    }

    fn issue_session(&self) -> String {
        let n = self.sessions_issued.fetch_add(1, Ordering::Relaxed);
        format!("{:08X}.node{}", n + 1, n % NODES + 1)
    }

    pub fn requests_total(&self) -> u64 {
        self.requests_total.load(Ordering::Relaxed)
    }

    pub fn requests_with_session(&self) -> u64 {
        self.requests_with_session.load(Ordering::Relaxed)
    }

    pub fn sessions_issued(&self) -> u64 {
        self.sessions_issued.load(Ordering::Relaxed)
    }

    /// TCP connections accepted by a listener wrapped through [`TestServerStats::listener`].
    pub fn connections_accepted(&self) -> u64 {
        self.connections_accepted.load(Ordering::Relaxed)
    }

    pub fn listener(&self, inner: TcpListener) -> CountingListener {
        CountingListener {
            inner,
            accepted: self.connections_accepted.clone(),
        }
    }
}

/// `TcpListener` that bumps the shared accept counter for every connection it hands to axum.
#[derive(Debug)]
pub struct CountingListener {
    inner: TcpListener,
    accepted: Arc<AtomicU64>,
}

impl Listener for CountingListener {
    type Io = TcpStream;
    type Addr = SocketAddr;

    async fn accept(&mut self) -> (Self::Io, Self::Addr) {
        let conn = Listener::accept(&mut self.inner).await;
        self.accepted.fetch_add(1, Ordering::Relaxed);
        conn
    }

    fn local_addr(&self) -> std::io::Result<Self::Addr> {
        self.inner.local_addr()
    }
}

fn request_session(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .find_map(|pair| {
            let (name, value) = pair.trim().split_once('=')?;
            (name == "JSESSIONID").then(|| value.to_string())
        })
}

fn with_session(body: &'static str, session: &str) -> Response {
    let cookie = format!("JSESSIONID={session}; Path=/; HttpOnly");
    match HeaderValue::from_str(&cookie) {
        Ok(v) => ([(header::SET_COOKIE, v)], body).into_response(),
        Err(_) => (StatusCode::INTERNAL_SERVER_ERROR, "bad cookie").into_response(),
    }
}

async fn handle_hello(State(stats): State<TestServerStats>, headers: HeaderMap) -> &'static str {
    stats.observe(&headers);
    "Hello World!"
}

async fn handle_slow(State(stats): State<TestServerStats>, headers: HeaderMap) -> &'static str {
    stats.observe(&headers);
    sleep(Duration::from_millis(50)).await;
    "slow"
}

async fn handle_sticky(State(stats): State<TestServerStats>, headers: HeaderMap) -> Response {
    match stats.observe(&headers) {
        Some(_) => "sticky".into_response(),
        None => with_session("sticky", &stats.issue_session()),
    }
}

async fn handle_unsticky(State(stats): State<TestServerStats>, headers: HeaderMap) -> Response {
    stats.observe(&headers);
    with_session("unsticky", &stats.issue_session())
}

async fn handle_status(
    State(stats): State<TestServerStats>,
    Path(code): Path<u16>,
    headers: HeaderMap,
) -> StatusCode {
    stats.observe(&headers);
    StatusCode::from_u16(code).unwrap_or(StatusCode::BAD_REQUEST)
}

pub fn router(stats: TestServerStats) -> Router {
    Router::new()
        .route(PATH_HELLO, get(handle_hello))
        .route(PATH_SLOW, get(handle_slow))
        .route(PATH_STICKY, get(handle_sticky))
        .route(PATH_UNSTICKY, get(handle_unsticky))
        .route(PATH_STATUS, get(handle_status))
        .with_state(stats)
}

pub struct TestServer {
    addr: SocketAddr,
    stats: TestServerStats,
    shutdown_tx: Option<oneshot::Sender<()>>,
    task: Option<tokio::task::JoinHandle<()>>,
}

impl TestServer {
    pub async fn start() -> std::io::Result<Self> {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;

        let stats = TestServerStats::default();
        let app = router(stats.clone());
        let listener = stats.listener(listener);

        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
        let task = tokio::spawn(async move {
            let serve = axum::serve(listener, app).with_graceful_shutdown(async move {
                let _ = shutdown_rx.await;
            });
            let _ = serve.await;
        });

        Ok(Self {
            addr,
            stats,
            shutdown_tx: Some(shutdown_tx),
            task: Some(task),
        })
    }

    /// Target string for a path, e.g. `127.0.0.1:4000/sticky`.
    pub fn target(&self, path: &str) -> String {
        format!("{}{path}", self.addr)
    }

    pub fn stats(&self) -> &TestServerStats {
        &self.stats
    }

    pub async fn shutdown(mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }

        if let Some(task) = self.task.take() {
            let _ = task.await;
        }
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        if self.shutdown_tx.is_some()
            && let Some(task) = self.task.take()
        {
            task.abort();
        }
    }
}
