use std::time::Duration;

const NS_PER_US: u128 = 1_000;
const NS_PER_MS: u128 = 1_000_000;
const NS_PER_S: u128 = 1_000_000_000;

/// Renders a latency in the largest unit that keeps it >= 1: whole microseconds below a
/// millisecond, two decimals above.
pub(crate) fn format_duration(d: Duration) -> String {
    let ns = d.as_nanos();

    if ns >= NS_PER_S {
        return format!("{:.2}s", d.as_secs_f64());
    }
    if ns >= NS_PER_MS {
        return format!("{:.2}ms", ns as f64 / NS_PER_MS as f64);
    }

    // Ties round up.
    format!("{}us", (ns + NS_PER_US / 2) / NS_PER_US)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn picks_unit_by_magnitude() {
        assert_eq!(format_duration(Duration::ZERO), "0us");
        assert_eq!(format_duration(Duration::from_nanos(1_500)), "2us");
        assert_eq!(format_duration(Duration::from_micros(999)), "999us");
        assert_eq!(format_duration(Duration::from_micros(12_345)), "12.35ms");
        assert_eq!(format_duration(Duration::from_millis(1_250)), "1.25s");
    }
}
