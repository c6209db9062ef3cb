use std::sync::OnceLock;
use std::time::Instant;

use tokio::sync::Barrier;

/// One-shot start line: every worker registers here and none proceeds until all have arrived,
/// so the first requests are not skewed by task start-up jitter.
#[derive(Debug)]
pub struct StartBarrier {
    barrier: Barrier,
    released_at: OnceLock<Instant>,
}

impl StartBarrier {
    pub fn new(parties: usize) -> Self {
        Self {
            barrier: Barrier::new(parties),
            released_at: OnceLock::new(),
        }
    }

    /// Registers arrival and waits for the release. Returns the release instant, which is the
    /// same for every party.
    pub async fn wait(&self) -> Instant {
        self.barrier.wait().await;
        *self.released_at.get_or_init(Instant::now)
    }

    /// `None` until the barrier has released.
    pub fn released_at(&self) -> Option<Instant> {
        self.released_at.get().copied()
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    #[tokio::test]
    async fn nobody_passes_before_everyone_arrives() {
        let barrier = Arc::new(StartBarrier::new(3));
        let passed = Arc::new(AtomicUsize::new(0));

        let mut handles = Vec::new();
        for _ in 0..2 {
            let barrier = barrier.clone();
            let passed = passed.clone();
            handles.push(tokio::spawn(async move {
                let at = barrier.wait().await;
                passed.fetch_add(1, Ordering::SeqCst);
                at
            }));
        }

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(passed.load(Ordering::SeqCst), 0);
        assert!(barrier.released_at().is_none());

        let last = barrier.wait().await;
        for h in handles {
            assert_eq!(h.await.unwrap(), last);
        }
        assert_eq!(passed.load(Ordering::SeqCst), 2);
        assert_eq!(barrier.released_at(), Some(last));
    }

    #[tokio::test]
    async fn single_party_releases_immediately() {
        let barrier = StartBarrier::new(1);
        let at = barrier.wait().await;
        assert_eq!(barrier.released_at(), Some(at));
    }
}
