//! Per-call deadline and cancellation for cache operations

use std::future::Future;
use std::time::Duration;

use thiserror::Error;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

/// Why a cache call was abandoned
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Interrupted {
    #[error("deadline exceeded")]
    DeadlineExceeded,

    #[error("cancelled by caller")]
    Cancelled,
}

/// Caller-supplied budget for a cache operation
///
/// Every store operation is bounded by the earlier of this deadline and the store's own
/// per-operation timeout. An interrupted call degrades like an unavailable backend.
#[derive(Debug, Clone, Default)]
pub struct CacheContext {
    deadline: Option<Instant>,
    cancellation: Option<CancellationToken>,
}

impl CacheContext {
    /// A context with no caller deadline
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    pub fn with_timeout(self, timeout: Duration) -> Self {
        self.with_deadline(Instant::now() + timeout)
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = Some(token);
        self
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancellation
            .as_ref()
            .is_some_and(CancellationToken::is_cancelled)
    }

    /// Runs `fut` until it completes, the budget runs out, or the caller cancels
    pub async fn run<F>(&self, cap: Duration, fut: F) -> Result<F::Output, Interrupted>
    where
        F: Future,
    {
        let capped = Instant::now() + cap;
        let deadline = match self.deadline {
            Some(deadline) => deadline.min(capped),
            None => capped,
        };

        let cancelled = async {
            match &self.cancellation {
                Some(token) => token.cancelled().await,
                None => std::future::pending::<()>().await,
            }
        };

        tokio::select! {
            biased;
            _ = cancelled => Err(Interrupted::Cancelled),
            result = tokio::time::timeout_at(deadline, fut) => {
                result.map_err(|_| Interrupted::DeadlineExceeded)
            }
        }
    }
}
