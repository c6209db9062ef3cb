use std::time::Duration;

/// Five-number latency digest of one worker, or the pairwise approximation of several.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LatencySummary {
    pub average: Duration,
    pub min: Duration,
    pub max: Duration,
    pub median: Duration,
    pub p90: Duration,
}

impl LatencySummary {
    /// Summarizes raw samples. Returns `None` only for an empty input.
    ///
    /// The median of an even count is the element at `n/2`; for an odd count it is the mean of
    /// the elements at `n/2` and `(n+1)/2`, the upper index clamped to the last sample. `p90` is
    /// the element at `floor(n * 9 / 10)` with no interpolation.
    pub fn from_samples(mut samples: Vec<Duration>) -> Option<Self> {
        if samples.is_empty() {
            return None;
        }

        samples.sort_unstable();
        let n = samples.len();
        let last = n - 1;

        let total: u128 = samples.iter().map(Duration::as_nanos).sum();
        let average = nanos_to_duration(total / n as u128);

        let median = if n % 2 == 0 {
            samples[n / 2]
        } else {
            mean_of_two(samples[n / 2], samples[((n + 1) / 2).min(last)])
        };

        let p90 = samples[(n * 9 / 10).min(last)];

        Some(Self {
            average,
            min: samples[0],
            max: samples[last],
            median,
            p90,
        })
    }

    /// Pairwise combination used when folding reports.
    ///
    /// `average` and `median` are the plain mean of both sides regardless of sample counts,
    /// `min` takes the smaller value, `max` and `p90` the larger. This is an approximation and
    /// consumers of the report rely on exactly this behavior.
    #[must_use]
    pub fn merge(self, other: Self) -> Self {
        Self {
            average: mean_of_two(self.average, other.average),
            min: self.min.min(other.min),
            max: self.max.max(other.max),
            median: mean_of_two(self.median, other.median),
            p90: self.p90.max(other.p90),
        }
    }
}

fn mean_of_two(a: Duration, b: Duration) -> Duration {
    nanos_to_duration((a.as_nanos() + b.as_nanos()) / 2)
}

fn nanos_to_duration(nanos: u128) -> Duration {
    Duration::from_nanos(u64::try_from(nanos).unwrap_or(u64::MAX))
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use proptest::prelude::*;

    fn ms(v: &[u64]) -> Vec<Duration> {
        v.iter().copied().map(Duration::from_millis).collect()
    }

    #[test]
    fn empty_samples_have_no_summary() {
        assert_eq!(LatencySummary::from_samples(Vec::new()), None);
    }

    #[test]
    fn p90_selects_rank_index() {
        let s =
            LatencySummary::from_samples(ms(&[10, 20, 30, 40, 50, 60, 70, 80, 90, 100])).unwrap();
        assert_eq!(s.p90, Duration::from_millis(100));
        assert_eq!(s.min, Duration::from_millis(10));
        assert_eq!(s.max, Duration::from_millis(100));
        assert_eq!(s.average, Duration::from_millis(55));
    }

    #[test]
    fn even_count_median_takes_upper_middle() {
        let s = LatencySummary::from_samples(ms(&[40, 10, 30, 20])).unwrap();
        assert_eq!(s.median, Duration::from_millis(30));
    }

    #[test]
    fn odd_count_median_averages_upper_pair() {
        let s = LatencySummary::from_samples(ms(&[30, 10, 20])).unwrap();
        assert_eq!(s.median, Duration::from_millis(25));
    }

    #[test]
    fn single_sample_is_every_statistic() {
        let s = LatencySummary::from_samples(ms(&[7])).unwrap();
        let d = Duration::from_millis(7);
        assert_eq!(
            s,
            LatencySummary {
                average: d,
                min: d,
                max: d,
                median: d,
                p90: d,
            }
        );
    }

    fn summary() -> impl Strategy<Value = LatencySummary> {
        prop::collection::vec(0u64..50_000, 1..64).prop_map(|micros| {
            let samples = micros.into_iter().map(Duration::from_micros).collect();
            LatencySummary::from_samples(samples).unwrap()
        })
    }

    proptest! {
        #[test]
        fn summary_stays_within_bounds(micros in prop::collection::vec(0u64..50_000, 1..64)) {
            let samples: Vec<Duration> = micros.into_iter().map(Duration::from_micros).collect();
            let s = LatencySummary::from_samples(samples).unwrap();
            prop_assert!(s.min <= s.median && s.median <= s.max, "{s:?}");
            prop_assert!(s.min <= s.average && s.average <= s.max, "{s:?}");
            prop_assert!(s.min <= s.p90 && s.p90 <= s.max, "{s:?}");
        }

        #[test]
        fn merge_is_commutative(a in summary(), b in summary()) {
            prop_assert_eq!(a.merge(b), b.merge(a));
        }

        #[test]
        fn merge_extremes_are_associative(a in summary(), b in summary(), c in summary()) {
            let left = a.merge(b).merge(c);
            let right = a.merge(b.merge(c));
            prop_assert_eq!(left.min, right.min);
            prop_assert_eq!(left.max, right.max);
            prop_assert_eq!(left.p90, right.p90);
        }
    }

    #[test]
    fn merge_combines_scalars_pairwise() {
        let a = LatencySummary::from_samples(ms(&[10, 20, 30, 40])).unwrap();
        let b = LatencySummary::from_samples(ms(&[100])).unwrap();
        let m = a.merge(b);

        // Plain mean of the two averages, not weighted by the five samples.
        assert_eq!(m.average, Duration::from_millis(62) + Duration::from_micros(500));
        assert_eq!(m.median, Duration::from_millis(65));
        assert_eq!(m.min, Duration::from_millis(10));
        assert_eq!(m.max, Duration::from_millis(100));
        assert_eq!(m.p90, Duration::from_millis(100));
        assert_eq!(m, b.merge(a));
    }
}
