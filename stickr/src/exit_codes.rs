use stickr_core::Report;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
    Success,

    /// The run completed but observed this many distinct error kinds (1..=29).
    ErrorKinds(u8),

    /// Invalid CLI/config (bad flags, unparsable target, zero workers, etc.).
    InvalidInput,

    /// Internal/runtime error (worker task panicked, runtime failure).
    RuntimeError,
}

impl ExitCode {
    /// Highest error-kind count reported as-is; larger counts saturate here so they never collide
    /// with the fixed codes below.
    pub const MAX_ERROR_KINDS: u8 = 29;

    #[must_use]
    pub fn as_i32(self) -> i32 {
        match self {
            Self::Success => 0,
            Self::ErrorKinds(n) => i32::from(n.min(Self::MAX_ERROR_KINDS)),
            Self::InvalidInput => 30,
            Self::RuntimeError => 40,
        }
    }

    #[must_use]
    pub fn from_report(report: &Report) -> Self {
        match report.error_kinds() {
            0 => Self::Success,
            n => Self::ErrorKinds(
                u8::try_from(n)
                    .unwrap_or(Self::MAX_ERROR_KINDS)
                    .min(Self::MAX_ERROR_KINDS),
            ),
        }
    }
}
