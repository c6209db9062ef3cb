#![forbid(unsafe_code)]

pub mod affinity;
mod config;
mod error;
mod latency;
mod probe;
mod report;
pub mod runner;

pub use config::{CLOSE_CONN_ENV, EnvToggles, RunConfig, SHUTDOWN_RANDOMLY_ENV, Scheme, Target};
pub use error::{Error, Result};
pub use latency::LatencySummary;
pub use probe::{ClientProbe, ErrorKind, HttpProbe, Outcome};
pub use report::{Report, WorkerResult, merge};
pub use runner::{ProgressFn, ProgressUpdate, RunSummary, StartBarrier, Worker, run, run_http};
pub use stickr_http::TransportErrorKind;
