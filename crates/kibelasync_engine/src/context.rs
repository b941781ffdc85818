//! Cancellation and deadline carried through every remote call.

use crate::error::{SyncError, SyncResult};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Cancellation flag plus optional deadline.
///
/// Clones share the same flag, so a clone handed to another thread can
/// cancel a running pull or push.
#[derive(Debug, Clone, Default)]
pub struct CallContext {
    cancelled: Arc<AtomicBool>,
    deadline: Option<Instant>,
}

impl CallContext {
    /// Creates a context with no deadline.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a context sharing this flag that expires after `timeout`.
    pub fn with_timeout(&self, timeout: Duration) -> Self {
        self.with_deadline(Instant::now() + timeout)
    }

    /// Returns a context sharing this flag that expires at `deadline`.
    ///
    /// An earlier existing deadline wins.
    pub fn with_deadline(&self, deadline: Instant) -> Self {
        let deadline = match self.deadline {
            Some(existing) if existing < deadline => existing,
            _ => deadline,
        };
        Self {
            cancelled: Arc::clone(&self.cancelled),
            deadline: Some(deadline),
        }
    }

    /// Requests cancellation.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    /// Returns true once cancellation was requested.
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// Time left before the deadline, `None` without one.
    pub fn remaining(&self) -> Option<Duration> {
        self.deadline
            .map(|d| d.saturating_duration_since(Instant::now()))
    }

    /// Fails if cancelled or past the deadline.
    pub fn check(&self) -> SyncResult<()> {
        if self.is_cancelled() {
            return Err(SyncError::Cancelled);
        }
        match self.remaining() {
            Some(left) if left.is_zero() => Err(SyncError::Timeout),
            _ => Ok(()),
        }
    }

    /// Clamps a request timeout to the time left.
    pub fn request_timeout(&self, configured: Duration) -> Duration {
        match self.remaining() {
            Some(left) => left.min(configured),
            None => configured,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_context_passes() {
        let ctx = CallContext::new();
        assert!(ctx.check().is_ok());
        assert!(ctx.remaining().is_none());
        assert_eq!(
            ctx.request_timeout(Duration::from_secs(30)),
            Duration::from_secs(30)
        );
    }

    #[test]
    fn cancel_is_shared() {
        let ctx = CallContext::new();
        let child = ctx.with_timeout(Duration::from_secs(60));
        ctx.cancel();
        assert!(matches!(child.check(), Err(SyncError::Cancelled)));
    }

    #[test]
    fn expired_deadline() {
        let ctx = CallContext::new().with_deadline(Instant::now());
        assert!(matches!(ctx.check(), Err(SyncError::Timeout)));
    }

    #[test]
    fn earlier_deadline_wins() {
        let ctx = CallContext::new().with_timeout(Duration::from_secs(1));
        let child = ctx.with_timeout(Duration::from_secs(3600));
        assert!(child.remaining().unwrap() <= Duration::from_secs(1));
        assert!(child.request_timeout(Duration::from_secs(30)) <= Duration::from_secs(1));
    }
}
