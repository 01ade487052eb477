//! Caller-controlled cancellation and deadlines for API calls.
//!
//! Every terminal builder call takes a [`Context`]. The context is consulted
//! only while a network round trip (or a retry backoff sleep) is in flight:
//! cancelling it, or letting its deadline pass, aborts that await point and
//! surfaces as [`TransportError::Cancelled`] or
//! [`TransportError::DeadlineExceeded`].
//!
//! # Example
//!
//! ```
//! use std::time::Duration;
//! use outline_core::Context;
//!
//! let ctx = Context::background().with_timeout(Duration::from_secs(5));
//! let child = ctx.clone();
//! ctx.cancel();
//! assert!(child.is_cancelled());
//! ```

use std::future::Future;
use std::time::Duration;

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::request::TransportError;

/// Cancellation token plus an optional deadline.
///
/// Cloning a context shares the same token, so cancelling any clone cancels
/// all of them.
#[derive(Debug, Clone, Default)]
pub struct Context {
    token: CancellationToken,
    deadline: Option<Instant>,
}

impl Context {
    /// A context that is never cancelled and has no deadline.
    #[must_use]
    pub fn background() -> Self {
        Self::default()
    }

    /// Wraps an existing token, e.g. one cancelled by a shutdown handler.
    #[must_use]
    pub fn with_token(token: CancellationToken) -> Self {
        Self {
            token,
            deadline: None,
        }
    }

    /// Returns a copy that additionally expires `timeout` from now.
    ///
    /// An earlier deadline already present on `self` is kept.
    #[must_use]
    pub fn with_timeout(&self, timeout: Duration) -> Self {
        let candidate = Instant::now() + timeout;
        let deadline = match self.deadline {
            Some(existing) if existing <= candidate => existing,
            _ => candidate,
        };
        Self {
            token: self.token.clone(),
            deadline: Some(deadline),
        }
    }

    /// Returns a context whose token is a child of this one: cancelling the
    /// parent cancels the child, not the other way around.
    #[must_use]
    pub fn child(&self) -> Self {
        Self {
            token: self.token.child_token(),
            deadline: self.deadline,
        }
    }

    /// Cancels this context and every clone and child of it.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    #[must_use]
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Drives `fut` to completion unless the context is cancelled or its
    /// deadline passes first, in which case `fut` is dropped.
    ///
    /// Cancellation is checked first so an already-cancelled context never
    /// polls `fut` at all.
    pub(crate) async fn run<F, T>(&self, fut: F) -> Result<T, TransportError>
    where
        F: Future<Output = T>,
    {
        if self.token.is_cancelled() {
            return Err(TransportError::Cancelled);
        }

        let deadline = async {
            match self.deadline {
                Some(at) => tokio::time::sleep_until(at).await,
                None => std::future::pending::<()>().await,
            }
        };

        tokio::select! {
            biased;
            () = self.token.cancelled() => Err(TransportError::Cancelled),
            () = deadline => Err(TransportError::DeadlineExceeded),
            out = fut => Ok(out),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_run_completes_without_cancellation() {
        let ctx = Context::background();
        let out = ctx.run(async { 7 }).await.unwrap();
        assert_eq!(out, 7);
    }

    #[tokio::test]
    async fn test_run_on_cancelled_context_never_polls_future() {
        let ctx = Context::background();
        ctx.cancel();
        let polled = std::sync::atomic::AtomicBool::new(false);
        let result = ctx
            .run(async { polled.store(true, std::sync::atomic::Ordering::SeqCst) })
            .await;
        assert!(matches!(result, Err(TransportError::Cancelled)));
        assert!(!polled.load(std::sync::atomic::Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_cancel_mid_flight_returns_cancelled() {
        let ctx = Context::background();
        let canceller = ctx.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            canceller.cancel();
        });

        let result = ctx.run(std::future::pending::<()>()).await;
        assert!(matches!(result, Err(TransportError::Cancelled)));
    }

    #[tokio::test]
    async fn test_deadline_expiry_returns_deadline_exceeded() {
        let ctx = Context::background().with_timeout(Duration::from_millis(50));
        let result = ctx.run(std::future::pending::<()>()).await;
        assert!(matches!(result, Err(TransportError::DeadlineExceeded)));
    }

    #[test]
    fn test_with_timeout_keeps_earlier_deadline() {
        let ctx = Context::background().with_timeout(Duration::from_secs(1));
        let later = ctx.with_timeout(Duration::from_secs(60));
        assert_eq!(ctx.deadline(), later.deadline());
    }

    #[test]
    fn test_child_cancellation_does_not_reach_parent() {
        let parent = Context::background();
        let child = parent.child();
        child.cancel();
        assert!(child.is_cancelled());
        assert!(!parent.is_cancelled());

        let child = parent.child();
        parent.cancel();
        assert!(child.is_cancelled());
    }
}
