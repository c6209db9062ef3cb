use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use super::error::{Error, Result};

/// Presence of this variable (any value) disables connection reuse.
pub const CLOSE_CONN_ENV: &str = "CLOSE_CONN";

/// Stickiness checking stays enabled while this variable is absent or falsy.
pub const SHUTDOWN_RANDOMLY_ENV: &str = "SHUTDOWN_RANDOMLY";

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, strum::Display, strum::EnumString,
)]
#[strum(serialize_all = "lowercase")]
pub enum Scheme {
    #[default]
    Http,
    Https,
}

/// The single endpoint every worker hits, parsed from `[scheme://]host[/path]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    pub scheme: Scheme,
    /// `host` or `host:port`.
    pub host: String,
    /// Always starts with `/`.
    pub path: String,
}

impl Target {
    pub fn parse(input: &str) -> Result<Self> {
        let raw = input.trim();

        let (scheme, rest) = if let Some(rest) = strip_prefix_ignore_case(raw, "https://") {
            (Scheme::Https, rest)
        } else if let Some(rest) = strip_prefix_ignore_case(raw, "http://") {
            (Scheme::Http, rest)
        } else {
            (Scheme::Http, raw)
        };

        let (host, path) = match rest.find('/') {
            Some(pos) => rest.split_at(pos),
            None => (rest, "/"),
        };

        if host.is_empty() || host.chars().any(char::is_whitespace) {
            return Err(Error::InvalidTarget(input.to_string()));
        }

        Ok(Self {
            scheme,
            host: host.to_string(),
            path: path.to_string(),
        })
    }

    #[must_use]
    pub fn base_url(&self) -> String {
        format!("{}://{}", self.scheme, self.host)
    }

    #[must_use]
    pub fn url(&self) -> String {
        format!("{}{}", self.base_url(), self.path)
    }
}

impl FromStr for Target {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.host, self.path)
    }
}

fn strip_prefix_ignore_case<'a>(s: &'a str, prefix: &str) -> Option<&'a str> {
    let head = s.get(..prefix.len())?;
    head.eq_ignore_ascii_case(prefix)
        .then(|| &s[prefix.len()..])
}

/// Toggles that deployments flip through the environment rather than through flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnvToggles {
    pub reuse_connection: bool,
    pub check_stickiness: bool,
}

impl Default for EnvToggles {
    fn default() -> Self {
        Self {
            reuse_connection: true,
            check_stickiness: true,
        }
    }
}

impl EnvToggles {
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let reuse_connection = lookup(CLOSE_CONN_ENV).is_none();
        let check_stickiness = lookup(SHUTDOWN_RANDOMLY_ENV).is_none_or(|v| is_falsy(&v));

        Self {
            reuse_connection,
            check_stickiness,
        }
    }

    /// The one place the process environment is consulted.
    pub fn from_process_env() -> Self {
        Self::from_lookup(|key| {
            std::env::var_os(key).map(|v| v.to_string_lossy().into_owned())
        })
    }
}

fn is_falsy(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "" | "0" | "false" | "no" | "off"
    )
}

/// Resolved parameters for one run. Built once at startup and shared read-only by all workers.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub target: Target,
    pub workers: usize,
    pub requests_per_worker: u64,
    /// Pause between two requests of the same worker. Not part of the measured latency.
    pub request_delay: Duration,
    pub reuse_connection: bool,
    pub check_stickiness: bool,
    pub connect_timeout: Option<Duration>,
    pub request_timeout: Option<Duration>,
}

impl RunConfig {
    pub const DEFAULT_WORKERS: usize = 100;
    pub const DEFAULT_REQUESTS_PER_WORKER: u64 = 1000;
    pub const DEFAULT_REQUEST_DELAY: Duration = Duration::from_millis(1);
    pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(3);
    pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

    pub fn new(target: Target) -> Self {
        let toggles = EnvToggles::default();
        Self {
            target,
            workers: Self::DEFAULT_WORKERS,
            requests_per_worker: Self::DEFAULT_REQUESTS_PER_WORKER,
            request_delay: Self::DEFAULT_REQUEST_DELAY,
            reuse_connection: toggles.reuse_connection,
            check_stickiness: toggles.check_stickiness,
            connect_timeout: Some(Self::DEFAULT_CONNECT_TIMEOUT),
            request_timeout: Some(Self::DEFAULT_REQUEST_TIMEOUT),
        }
    }

    #[must_use]
    pub fn with_toggles(mut self, toggles: EnvToggles) -> Self {
        self.reuse_connection = toggles.reuse_connection;
        self.check_stickiness = toggles.check_stickiness;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.workers == 0 {
            return Err(Error::InvalidWorkers);
        }
        if self.requests_per_worker == 0 {
            return Err(Error::InvalidRequests);
        }
        Ok(())
    }
}
