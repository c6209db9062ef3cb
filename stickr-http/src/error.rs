use std::time::Duration;

pub type Result<T> = std::result::Result<T, Error>;

/// Transport-level failure category. HTTP responses with 4xx/5xx status codes are not
/// transport failures and never map to one of these.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, strum::Display, strum::EnumString,
)]
#[strum(serialize_all = "snake_case")]
pub enum TransportErrorKind {
    InvalidUrl,
    UnsupportedScheme,
    RequestBuild,
    ConnectionRefused,
    ConnectionReset,
    Connect,
    Timeout,
    Tls,
    MalformedResponse,
    BodyRead,
    Unknown,
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid url: {0}")]
    InvalidUrl(String),

    #[error("only http:// and https:// URLs are supported: {0}")]
    UnsupportedScheme(String),

    #[error("http request build failed: {0}")]
    RequestBuild(#[from] http::Error),

    #[error("invalid http header name: {0}")]
    HeaderName(#[from] http::header::InvalidHeaderName),

    #[error("invalid http header value: {0}")]
    HeaderValue(#[from] http::header::InvalidHeaderValue),

    #[error("http request failed: {0}")]
    Request(#[from] hyper_util::client::legacy::Error),

    #[error("http request timed out after {0:?}")]
    Timeout(Duration),

    #[error("failed to read response body: {0}")]
    BodyRead(#[from] hyper::Error),
}

impl Error {
    #[must_use]
    pub fn transport_error_kind(&self) -> TransportErrorKind {
        match self {
            Self::InvalidUrl(_) => TransportErrorKind::InvalidUrl,
            Self::UnsupportedScheme(_) => TransportErrorKind::UnsupportedScheme,
            Self::RequestBuild(_) | Self::HeaderName(_) | Self::HeaderValue(_) => {
                TransportErrorKind::RequestBuild
            }
            Self::Request(err) => {
                classify_chain(err).unwrap_or(if err.is_connect() {
                    TransportErrorKind::Connect
                } else {
                    TransportErrorKind::Unknown
                })
            }
            Self::Timeout(_) => TransportErrorKind::Timeout,
            Self::BodyRead(err) => classify_chain(err).unwrap_or(TransportErrorKind::BodyRead),
        }
    }
}

/// Walks the `source()` chain looking for the first error we know how to categorize.
fn classify_chain(err: &(dyn std::error::Error + 'static)) -> Option<TransportErrorKind> {
    let mut cur: Option<&(dyn std::error::Error + 'static)> = Some(err);
    while let Some(e) = cur {
        if let Some(io) = e.downcast_ref::<std::io::Error>()
            && let Some(kind) = classify_io(io.kind())
        {
            return Some(kind);
        }
        if let Some(h) = e.downcast_ref::<hyper::Error>() {
            if h.is_timeout() {
                return Some(TransportErrorKind::Timeout);
            }
            if h.is_parse() || h.is_parse_status() {
                return Some(TransportErrorKind::MalformedResponse);
            }
            if h.is_incomplete_message() || h.is_closed() || h.is_canceled() {
                return Some(TransportErrorKind::ConnectionReset);
            }
        }
        cur = e.source();
    }
    None
}

fn classify_io(kind: std::io::ErrorKind) -> Option<TransportErrorKind> {
    use std::io::ErrorKind;

    match kind {
        ErrorKind::ConnectionRefused => Some(TransportErrorKind::ConnectionRefused),
        ErrorKind::TimedOut => Some(TransportErrorKind::Timeout),
        ErrorKind::ConnectionReset
        | ErrorKind::ConnectionAborted
        | ErrorKind::BrokenPipe
        | ErrorKind::UnexpectedEof => Some(TransportErrorKind::ConnectionReset),
        // rustls surfaces handshake and certificate failures as InvalidData.
        ErrorKind::InvalidData => Some(TransportErrorKind::Tls),
        _ => None,
    }
}
