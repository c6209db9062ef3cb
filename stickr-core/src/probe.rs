use std::fmt;
use std::future::Future;

use stickr_http::{ClientOptions, HttpClient, HttpRequest, TransportErrorKind};

use super::config::RunConfig;

/// Error-histogram bucket.
///
/// `StickinessViolation` is not a transport failure. It is tallied next to them so a broken
/// affinity shows up in the same histogram and counts toward the exit code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ErrorKind {
    Transport(TransportErrorKind),
    StickinessViolation,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Transport(kind) => fmt::Display::fmt(kind, f),
            Self::StickinessViolation => f.write_str("stickiness_violation"),
        }
    }
}

impl From<TransportErrorKind> for ErrorKind {
    fn from(kind: TransportErrorKind) -> Self {
        Self::Transport(kind)
    }
}

/// Classification of one request attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The exchange completed. Any status code, 4xx and 5xx included.
    Success {
        status: u16,
        /// Lowercased header names, repeated headers kept as separate entries.
        headers: Vec<(String, String)>,
    },
    TransportError { kind: ErrorKind },
}

/// The one capability a worker needs from the transport: a GET against the bound target.
pub trait HttpProbe: Send {
    /// `cookie` is sent verbatim as the `Cookie` header value when present.
    fn get(&mut self, path: &str, cookie: Option<&str>) -> impl Future<Output = Outcome> + Send;
}

/// Production probe backed by [`HttpClient`]. Each worker owns one, and with it one pool.
#[derive(Debug, Clone)]
pub struct ClientProbe {
    client: HttpClient,
    base_url: String,
}

impl ClientProbe {
    pub fn new(config: &RunConfig) -> Self {
        let client = HttpClient::new(ClientOptions {
            keep_alive: config.reuse_connection,
            connect_timeout: config.connect_timeout,
            request_timeout: config.request_timeout,
        });

        Self {
            client,
            base_url: config.target.base_url(),
        }
    }
}

impl HttpProbe for ClientProbe {
    async fn get(&mut self, path: &str, cookie: Option<&str>) -> Outcome {
        let mut req = HttpRequest::get_owned(format!("{}{path}", self.base_url));
        if let Some(cookie) = cookie {
            req = req.with_header("cookie", cookie);
        }

        match self.client.request(req).await {
            Ok(res) => Outcome::Success {
                status: res.status,
                headers: res.headers,
            },
            Err(err) => {
                tracing::debug!(error = %err, "request failed");
                Outcome::TransportError {
                    kind: err.transport_error_kind().into(),
                }
            }
        }
    }
}
