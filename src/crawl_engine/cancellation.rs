//! Cooperative cancellation shared by every render task of one invocation.
//!
//! A [`CrawlCancellation`] combines an external signal (caller disconnect,
//! work exhausted) with an optional wall-clock deadline. Both triggers are
//! observed through the same [`CrawlCancellation::is_cancelled`] check, and
//! the first trigger to fire is recorded as the [`CancelReason`].

use log::debug;
use std::sync::{Arc, OnceLock};
use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use super::crawl_types::CancelReason;

#[derive(Debug, Clone)]
pub struct CrawlCancellation {
    token: CancellationToken,
    reason: Arc<OnceLock<CancelReason>>,
    deadline: Option<Instant>,
}

impl Default for CrawlCancellation {
    fn default() -> Self {
        Self::new()
    }
}

impl CrawlCancellation {
    /// Cancellation without a deadline, fired only by [`Self::cancel`]
    #[must_use]
    pub fn new() -> Self {
        Self {
            token: CancellationToken::new(),
            reason: Arc::new(OnceLock::new()),
            deadline: None,
        }
    }

    /// Cancellation that also fires once `budget` has elapsed from now
    #[must_use]
    pub fn with_deadline(budget: Duration) -> Self {
        Self {
            deadline: Some(Instant::now() + budget),
            ..Self::new()
        }
    }

    /// Handle on the same signal with a deadline `budget` from now.
    ///
    /// Cancelling either handle cancels both, and both report the same
    /// reason. `None` keeps the current deadline. Used to start the crawl
    /// clock only once the browser is up.
    #[must_use]
    pub fn deadline_after(&self, budget: Option<Duration>) -> Self {
        Self {
            deadline: budget.map(|budget| Instant::now() + budget).or(self.deadline),
            ..self.clone()
        }
    }

    /// Checkpoint test. Promotes an expired deadline into a recorded
    /// cancellation so later callers see a stable reason.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        if self.token.is_cancelled() {
            return true;
        }
        if self.deadline.is_some_and(|deadline| Instant::now() >= deadline) {
            self.cancel(CancelReason::Deadline);
            return true;
        }
        false
    }

    /// Fire the signal. Only the first reason is kept.
    pub fn cancel(&self, reason: CancelReason) {
        if self.reason.set(reason).is_ok() {
            debug!(target: "sitemapper::cancel", "Cancellation requested: {reason:?}");
        }
        self.token.cancel();
    }

    #[must_use]
    pub fn reason(&self) -> Option<CancelReason> {
        self.reason.get().copied()
    }

    /// Time left before the deadline, `None` when there is no deadline
    #[must_use]
    pub fn time_remaining(&self) -> Option<Duration> {
        self.deadline
            .map(|deadline| deadline.saturating_duration_since(Instant::now()))
    }

    /// Resolves when either trigger fires
    pub async fn cancelled(&self) {
        match self.deadline {
            Some(deadline) => {
                tokio::select! {
                    () = self.token.cancelled() => {}
                    () = tokio::time::sleep_until(deadline) => {
                        self.cancel(CancelReason::Deadline);
                    }
                }
            }
            None => self.token.cancelled().await,
        }
    }

    /// Guard that cancels with [`CancelReason::Disconnected`] when dropped
    /// unless [`DisconnectGuard::disarm`] was called first.
    ///
    /// Handlers hold one for the lifetime of the request future; the future
    /// is dropped when the client goes away.
    #[must_use]
    pub fn disconnect_guard(&self) -> DisconnectGuard {
        DisconnectGuard {
            cancel: Some(self.clone()),
        }
    }
}

#[derive(Debug)]
pub struct DisconnectGuard {
    cancel: Option<CrawlCancellation>,
}

impl DisconnectGuard {
    /// The request finished normally; dropping no longer cancels
    pub fn disarm(mut self) {
        self.cancel = None;
    }
}

impl Drop for DisconnectGuard {
    fn drop(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel.cancel(CancelReason::Disconnected);
        }
    }
}
