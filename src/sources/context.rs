// Cancellation and deadline handling for resolution calls

use crate::error::ResolveError;
use std::future::Future;
use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

/// Caller-supplied signal that bounds a resolution call.
///
/// Cloning is cheap; clones share the same cancellation token and deadline,
/// so one context can be handed to every request in a batch.
#[derive(Debug, Clone, Default)]
pub struct ResolveContext {
    cancel: CancellationToken,
    deadline: Option<Instant>,
}

impl ResolveContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Context that times out `timeout` from now
    pub fn with_timeout(timeout: Duration) -> Self {
        Self::new().deadline(Instant::now() + timeout)
    }

    /// Set an absolute deadline. An earlier existing deadline is kept.
    pub fn deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(match self.deadline {
            Some(existing) if existing < deadline => existing,
            _ => deadline,
        });
        self
    }

    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Drive `fut` to completion unless the token fires or the deadline
    /// passes first; the in-flight future is dropped in that case.
    pub async fn run<F, T>(&self, fut: F) -> Result<T, ResolveError>
    where
        F: Future<Output = Result<T, ResolveError>>,
    {
        if self.cancel.is_cancelled() {
            return Err(ResolveError::Cancelled);
        }

        let bounded = async {
            match self.deadline {
                Some(deadline) => tokio::time::timeout_at(deadline, fut)
                    .await
                    .map_err(|_| ResolveError::TimedOut)?,
                None => fut.await,
            }
        };

        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => Err(ResolveError::Cancelled),
            result = bounded => result,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn slow() -> Result<u32, ResolveError> {
        tokio::time::sleep(Duration::from_secs(5)).await;
        Ok(1)
    }

    #[tokio::test]
    async fn test_run_passes_result_through() {
        let ctx = ResolveContext::new();
        let value = ctx.run(async { Ok::<_, ResolveError>(7) }).await.unwrap();
        assert_eq!(value, 7);
    }

    #[tokio::test]
    async fn test_deadline_surfaces_timed_out() {
        let ctx = ResolveContext::with_timeout(Duration::from_millis(20));
        let err = ctx.run(slow()).await.unwrap_err();
        assert!(matches!(err, ResolveError::TimedOut));
    }

    #[tokio::test]
    async fn test_cancel_mid_call() {
        let ctx = ResolveContext::new();
        let handle = ctx.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            handle.cancel();
        });

        let err = ctx.run(slow()).await.unwrap_err();
        assert!(matches!(err, ResolveError::Cancelled));
    }

    #[tokio::test]
    async fn test_already_cancelled_skips_call() {
        let ctx = ResolveContext::new();
        ctx.cancel();
        let err = ctx
            .run(async { Err::<(), _>(ResolveError::upstream("http://x", "polled")) })
            .await
            .unwrap_err();
        assert!(matches!(err, ResolveError::Cancelled));
    }

    #[test]
    fn test_clones_share_cancellation() {
        let ctx = ResolveContext::new();
        let handle = ctx.clone();
        assert!(!ctx.is_cancelled());
        handle.cancel();
        assert!(ctx.is_cancelled());
    }

    #[test]
    fn test_deadline_keeps_earliest() {
        let now = Instant::now();
        let ctx = ResolveContext::new()
            .deadline(now + Duration::from_secs(1))
            .deadline(now + Duration::from_secs(10));
        assert_eq!(ctx.deadline, Some(now + Duration::from_secs(1)));
    }
}
