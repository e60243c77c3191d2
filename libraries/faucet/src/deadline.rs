use std::{future::Future, time::Duration};

use anyhow::anyhow;
use tokio::time::{timeout_at, Instant};

use crate::Error;

/// Absolute point in time after which an in-progress submission must be
/// abandoned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use]
pub struct Deadline {
    expires_at: Instant,
}

impl Deadline {
    #[inline]
    pub const fn at(expires_at: Instant) -> Self {
        Self { expires_at }
    }

    #[inline]
    pub fn after(duration: Duration) -> Self {
        Self::at(Instant::now() + duration)
    }

    #[must_use]
    #[inline]
    pub fn has_elapsed(&self) -> bool {
        Instant::now() >= self.expires_at
    }

    #[must_use]
    #[inline]
    pub fn remaining(&self) -> Duration {
        self.expires_at.saturating_duration_since(Instant::now())
    }

    pub fn check(&self) -> Result<(), Error> {
        if self.has_elapsed() {
            Err(Error::DeadlineExceeded)
        } else {
            Ok(())
        }
    }

    /// Runs `future` to completion unless the deadline passes first. In the
    /// latter case the future is dropped, aborting the remote call, and a
    /// transport error naming `operation` is returned.
    pub async fn bound<F, T>(
        self,
        operation: &'static str,
        future: F,
    ) -> Result<T, Error>
    where
        F: Future<Output = Result<T, Error>>,
    {
        timeout_at(self.expires_at, future).await.unwrap_or_else(|_| {
            Err(Error::transport(anyhow!(
                "Deadline elapsed while waiting for {operation}!"
            )))
        })
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use tokio::time::{sleep, Instant};

    use crate::Error;

    use super::Deadline;

    #[tokio::test(start_paused = true)]
    async fn deadline_at_now_has_elapsed() {
        let deadline = Deadline::at(Instant::now());

        assert!(deadline.has_elapsed());
        assert_eq!(deadline.remaining(), Duration::ZERO);
        assert!(matches!(deadline.check(), Err(Error::DeadlineExceeded)));
    }

    #[tokio::test(start_paused = true)]
    async fn future_deadline_elapses_with_time() {
        let deadline = Deadline::after(Duration::from_secs(5));

        assert!(deadline.check().is_ok());
        assert_eq!(deadline.remaining(), Duration::from_secs(5));

        sleep(Duration::from_secs(5)).await;

        assert!(deadline.has_elapsed());
    }

    #[tokio::test(start_paused = true)]
    async fn bound_completes_in_time() {
        let result = Deadline::after(Duration::from_secs(5))
            .bound("test", async {
                sleep(Duration::from_secs(1)).await;

                Ok(42)
            })
            .await;

        assert_eq!(result.unwrap(), 42);
    }

    #[tokio::test(start_paused = true)]
    async fn bound_aborts_as_transport_error() {
        let result = Deadline::after(Duration::from_secs(1))
            .bound("test", async {
                sleep(Duration::from_secs(5)).await;

                Ok(())
            })
            .await;

        assert!(matches!(result, Err(Error::Transport(_))));
    }
}
