//! # Run record: per-service execution state.
//!
//! One [`RunRecord`] is created for every registered service during the init phase.
//!
//! ## Lifecycle
//! ```text
//! created (init phase) ──► launched (run phase) ──► resolved (run returned)
//!        │
//!        └─► resolved with Ok(()) when init fails (never launched)
//! ```
//!
//! ## Rules
//! - A record is resolved **exactly once**; later resolutions are ignored.
//! - `running` means launched and not yet resolved.
//! - Waiting on a record that was never launched returns immediately.
//! - Any number of waiters may observe the resolution (`watch` channel).

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::watch;

use crate::error::ServiceError;
use crate::services::ServiceRef;

/// Terminal result of a service's run operation.
pub(crate) type Outcome = Result<(), ServiceError>;

/// Supervisor-internal bookkeeping for one service.
pub(crate) struct RunRecord {
    name: String,
    service: ServiceRef,
    launched: AtomicBool,
    done: watch::Sender<Option<Outcome>>,
}

impl RunRecord {
    /// Creates an unresolved, not yet launched record.
    pub(crate) fn new(name: impl Into<String>, service: ServiceRef) -> Arc<Self> {
        let (done, _rx) = watch::channel(None);
        Arc::new(Self {
            name: name.into(),
            service,
            launched: AtomicBool::new(false),
            done,
        })
    }

    pub(crate) fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn service(&self) -> &ServiceRef {
        &self.service
    }

    /// Marks the record as launched. Returns `false` if it already was.
    pub(crate) fn mark_launched(&self) -> bool {
        !self.launched.swap(true, Ordering::AcqRel)
    }

    pub(crate) fn is_launched(&self) -> bool {
        self.launched.load(Ordering::Acquire)
    }

    pub(crate) fn is_resolved(&self) -> bool {
        self.done.borrow().is_some()
    }

    /// Returns true if the service was launched and its run has not returned yet.
    pub(crate) fn is_running(&self) -> bool {
        self.is_launched() && !self.is_resolved()
    }

    /// Stores the terminal outcome. Returns `false` if the record was already resolved.
    pub(crate) fn resolve(&self, outcome: Outcome) -> bool {
        self.done.send_if_modified(|slot| {
            if slot.is_some() {
                return false;
            }
            *slot = Some(outcome);
            true
        })
    }

    /// Returns the terminal error, if the record resolved with one.
    pub(crate) fn error(&self) -> Option<ServiceError> {
        match self.done.borrow().as_ref() {
            Some(Err(e)) => Some(e.clone()),
            _ => None,
        }
    }

    /// Waits until the record resolves and returns its terminal error.
    ///
    /// Returns immediately for records that were never launched.
    pub(crate) async fn wait(&self) -> Option<ServiceError> {
        let mut rx = self.done.subscribe();
        if !self.is_launched() {
            return self.error();
        }
        match rx.wait_for(Option::is_some).await {
            Ok(slot) => slot.as_ref().and_then(|outcome| outcome.as_ref().err().cloned()),
            // The sender lives as long as `self`.
            Err(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::ServiceFn;
    use std::time::Duration;
    use tokio_util::sync::CancellationToken;

    fn record(name: &'static str) -> Arc<RunRecord> {
        let svc = ServiceFn::new(name, |_ctx: CancellationToken| async {
            Ok::<_, ServiceError>(())
        })
        .into_ref();
        RunRecord::new(name, svc)
    }

    #[test]
    fn test_resolves_exactly_once() {
        let rec = record("a");
        assert!(rec.resolve(Err(ServiceError::fail("first"))));
        assert!(!rec.resolve(Ok(())));
        assert_eq!(rec.error(), Some(ServiceError::fail("first")));
    }

    #[test]
    fn test_running_tracks_launch_and_resolution() {
        let rec = record("a");
        assert!(!rec.is_running());
        assert!(rec.mark_launched());
        assert!(!rec.mark_launched());
        assert!(rec.is_running());
        rec.resolve(Ok(()));
        assert!(!rec.is_running());
        assert!(rec.is_launched());
    }

    #[tokio::test]
    async fn test_wait_on_unlaunched_returns_immediately() {
        let rec = record("a");
        let res = tokio::time::timeout(Duration::from_millis(50), rec.wait()).await;
        assert_eq!(res.unwrap(), None);
    }

    #[tokio::test]
    async fn test_many_waiters_observe_resolution() {
        let rec = record("a");
        rec.mark_launched();

        let w1 = tokio::spawn({
            let rec = rec.clone();
            async move { rec.wait().await }
        });
        let w2 = tokio::spawn({
            let rec = rec.clone();
            async move { rec.wait().await }
        });

        tokio::time::sleep(Duration::from_millis(10)).await;
        rec.resolve(Err(ServiceError::fail("boom")));

        assert_eq!(w1.await.unwrap(), Some(ServiceError::fail("boom")));
        assert_eq!(w2.await.unwrap(), Some(ServiceError::fail("boom")));
        // Late waiter sees the stored value.
        assert_eq!(rec.wait().await, Some(ServiceError::fail("boom")));
    }
}
