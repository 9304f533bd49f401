//! Cancellation token for aborting an in-flight resolution

use std::fmt;
use std::sync::Arc;

use once_cell::sync::OnceCell;
use tokio::sync::Notify;

const DEFAULT_REASON: &str = "cancelled by caller";

/// Token for cancelling a resolution from outside
///
/// Clones share state. The first cancellation wins and its reason is what
/// the aborted resolution reports.
#[derive(Clone, Default)]
pub struct CancellationToken {
    shared: Arc<Shared>,
}

#[derive(Default)]
struct Shared {
    reason: OnceCell<String>,
    notify: Notify,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_cancelled(&self) -> bool {
        self.shared.reason.get().is_some()
    }

    /// Why the token was cancelled, if it was
    pub fn reason(&self) -> Option<&str> {
        self.shared.reason.get().map(String::as_str)
    }

    pub fn cancel(&self) {
        self.cancel_with_reason(DEFAULT_REASON);
    }

    /// Cancel, recording a reason; later calls are ignored
    pub fn cancel_with_reason(&self, reason: impl Into<String>) {
        if self.shared.reason.set(reason.into()).is_ok() {
            self.shared.notify.notify_waiters();
        }
    }

    /// Wait until the token is cancelled, yielding the reason
    pub async fn cancelled(&self) -> &str {
        // Register before checking so a concurrent cancel is not missed
        let notified = self.shared.notify.notified();
        if let Some(reason) = self.reason() {
            return reason;
        }
        notified.await;
        self.reason().unwrap_or(DEFAULT_REASON)
    }
}

impl fmt::Debug for CancellationToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CancellationToken")
            .field("reason", &self.reason())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_reason_wins() {
        let token = CancellationToken::new();
        assert!(!token.is_cancelled());
        assert_eq!(token.reason(), None);

        token.cancel_with_reason("interrupted");
        token.cancel();
        assert!(token.is_cancelled());
        assert_eq!(token.reason(), Some("interrupted"));
    }

    #[test]
    fn test_clones_share_state() {
        let token = CancellationToken::new();
        let other = token.clone();
        other.cancel();
        assert_eq!(token.reason(), Some(DEFAULT_REASON));
    }

    #[tokio::test]
    async fn test_waiter_wakes_with_reason() {
        let token = CancellationToken::new();
        let waiter = token.clone();

        let handle = tokio::spawn(async move { waiter.cancelled().await.to_string() });
        tokio::task::yield_now().await;
        token.cancel_with_reason("deadline");

        assert_eq!(handle.await.unwrap(), "deadline");
    }

    #[tokio::test]
    async fn test_already_cancelled_returns_immediately() {
        let token = CancellationToken::new();
        token.cancel();
        assert_eq!(token.cancelled().await, DEFAULT_REASON);
    }
}
