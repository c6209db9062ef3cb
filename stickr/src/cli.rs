use clap::Parser;
use std::time::Duration;

const DURATION_HINT: &str = "expected e.g. 10s, 250ms, 500us, 1m";

/// Parses `<number><unit>`; a bare number is read in `bare_unit`.
fn parse_duration_in(input: &str, bare_unit: fn(u64) -> Duration) -> Result<Duration, String> {
    let s = input.trim();
    if s.is_empty() {
        return Err(format!("duration cannot be empty ({DURATION_HINT})"));
    }

    let number_end = s
        .char_indices()
        .find(|(_, ch)| !ch.is_ascii_digit())
        .map_or(s.len(), |(idx, _)| idx);

    if number_end == 0 {
        return Err(format!("invalid duration '{s}' ({DURATION_HINT})"));
    }

    let (number_str, unit_str) = s.split_at(number_end);
    let value: u64 = number_str
        .parse()
        .map_err(|_| format!("invalid duration '{s}' ({DURATION_HINT})"))?;

    match unit_str.trim() {
        "" => Ok(bare_unit(value)),
        "s" | "sec" | "secs" => Ok(Duration::from_secs(value)),
        "ms" | "msec" | "msecs" => Ok(Duration::from_millis(value)),
        "us" | "µs" | "usec" | "usecs" => Ok(Duration::from_micros(value)),
        "m" | "min" | "mins" => {
            let secs = value
                .checked_mul(60)
                .ok_or_else(|| format!("duration '{s}' is too large"))?;
            Ok(Duration::from_secs(secs))
        }
        _ => Err(format!("invalid duration '{s}' ({DURATION_HINT})")),
    }
}

/// Inter-request delay: a bare number is milliseconds.
fn parse_delay(input: &str) -> Result<Duration, String> {
    parse_duration_in(input, Duration::from_millis)
}

/// Timeouts: a bare number is seconds.
fn parse_timeout(input: &str) -> Result<Duration, String> {
    let d = parse_duration_in(input, Duration::from_secs)?;
    if d.is_zero() {
        return Err("timeout must be greater than zero".to_string());
    }
    Ok(d)
}

fn parse_positive<T>(input: &str) -> Result<T, String>
where
    T: std::str::FromStr + PartialEq + Default,
{
    let v: T = input
        .trim()
        .parse()
        .map_err(|_| format!("invalid number '{input}'"))?;
    if v == T::default() {
        return Err("must be at least 1".to_string());
    }
    Ok(v)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable summary.
    HumanReadable,
    /// Emit one JSON summary line (NDJSON) to stdout.
    Json,
}

#[derive(Debug, Parser)]
#[command(
    name = "stickr",
    author,
    version,
    about = "Load generator that checks cookie-based session stickiness",
    long_about = "stickr drives concurrent simulated clients against one URL and verifies that a load balancer keeps each client pinned to the backend node that issued its JSESSIONID.\n\nEvery client adopts the first JSESSIONID it receives and replays it on each request. A response carrying a different session token is counted as a stickiness violation.\n\nEnvironment:\n  CLOSE_CONN          when set, every request uses a fresh connection\n  SHUTDOWN_RANDOMLY   when set to a truthy value, stickiness is not checked\n\nThe exit code is the number of distinct error kinds observed (0 when clean).",
    after_help = "Examples:\n  stickr 127.0.0.1:8080/app\n  stickr lb.internal/app 50 200 10ms\n  stickr https://lb.internal/app 10 100 0 --output json\n  CLOSE_CONN=1 stickr lb.internal/app"
)]
pub struct Cli {
    /// Target as host[:port][/path]; `http://` or `https://` may be prefixed
    pub url: String,

    /// Number of concurrent simulated clients
    #[arg(default_value_t = 100, value_parser = parse_positive::<usize>)]
    pub workers: usize,

    /// Requests issued by each client
    #[arg(default_value_t = 1000, value_parser = parse_positive::<u64>)]
    pub requests: u64,

    /// Pause between two requests of one client (bare number = milliseconds)
    #[arg(default_value = "1", value_parser = parse_delay)]
    pub delay: Duration,

    /// Open a new connection for every request
    #[arg(long)]
    pub close_connections: bool,

    /// Do not track JSESSIONID affinity
    #[arg(long)]
    pub no_stickiness: bool,

    /// TCP connect timeout (bare number = seconds)
    #[arg(long, value_name = "DURATION", default_value = "3s", value_parser = parse_timeout)]
    pub connect_timeout: Duration,

    /// Whole-request timeout (bare number = seconds)
    #[arg(long, value_name = "DURATION", default_value = "5s", value_parser = parse_timeout)]
    pub timeout: Duration,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::HumanReadable)]
    pub output: OutputFormat,

    /// Log filter directive (e.g. `debug`, `stickr_core=trace`); overrides RUST_LOG
    #[arg(long, value_name = "FILTER")]
    pub log_level: Option<String>,
}
