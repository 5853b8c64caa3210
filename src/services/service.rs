//! # Service abstraction.
//!
//! This module defines the [`Service`] trait (async, cancelable, long-running) and
//! the optional [`Init`] capability. The common handle type is [`ServiceRef`], an
//! `Arc<dyn Service>` suitable for sharing across the runtime.
//!
//! A service receives the group's [`CancellationToken`] and is expected to run
//! until that token is cancelled, then return promptly. The supervisor never
//! aborts a service; cancellation is the only stop signal.

use std::sync::Arc;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::error::ServiceError;

/// Shared handle to a registered service.
pub type ServiceRef = Arc<dyn Service>;

/// # Long-running, cancelable unit of background work.
///
/// A `Service` has a unique [`name`](Service::name) within its supervisor and an
/// async [`run`](Service::run) method that blocks until the service stops.
///
/// Services that need setup before running expose it through
/// [`as_init`](Service::as_init).
///
/// # Example
/// ```
/// use async_trait::async_trait;
/// use tokio_util::sync::CancellationToken;
/// use servicevisor::{Init, Service, ServiceError};
///
/// struct Poller;
///
/// #[async_trait]
/// impl Init for Poller {
///     async fn init(&self, _ctx: CancellationToken) -> Result<(), ServiceError> {
///         // open connections...
///         Ok(())
///     }
/// }
///
/// #[async_trait]
/// impl Service for Poller {
///     fn name(&self) -> &str { "poller" }
///
///     fn as_init(&self) -> Option<&dyn Init> { Some(self) }
///
///     async fn run(&self, ctx: CancellationToken) -> Result<(), ServiceError> {
///         ctx.cancelled().await;
///         Ok(())
///     }
/// }
/// ```
#[async_trait]
pub trait Service: Send + Sync + 'static {
    /// Returns the service name used for registration and logging.
    ///
    /// The default is the type name of the implementor, which is stable but verbose.
    /// Override it when a service can identify itself.
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }

    /// Returns the init capability of this service, if it has one.
    fn as_init(&self) -> Option<&dyn Init> {
        None
    }

    /// Runs the service until `ctx` is cancelled or it fails.
    ///
    /// Returning `Err` stops the whole group. Returning `Ok(())` before
    /// cancellation is logged as an anomaly.
    async fn run(&self, ctx: CancellationToken) -> Result<(), ServiceError>;
}

/// # One-shot setup executed before [`Service::run`].
///
/// Init calls are sequential in registration order. A failing init aborts
/// startup of the whole group.
#[async_trait]
pub trait Init: Send + Sync {
    /// Prepares the service. `ctx` is the same token later passed to `run`.
    async fn init(&self, ctx: CancellationToken) -> Result<(), ServiceError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Anonymous;

    #[async_trait]
    impl Service for Anonymous {
        async fn run(&self, _ctx: CancellationToken) -> Result<(), ServiceError> {
            Ok(())
        }
    }

    struct Labeled;

    #[async_trait]
    impl Init for Labeled {
        async fn init(&self, _ctx: CancellationToken) -> Result<(), ServiceError> {
            Err(ServiceError::fail("no"))
        }
    }

    #[async_trait]
    impl Service for Labeled {
        fn name(&self) -> &str {
            "labeled"
        }

        fn as_init(&self) -> Option<&dyn Init> {
            Some(self)
        }

        async fn run(&self, _ctx: CancellationToken) -> Result<(), ServiceError> {
            Ok(())
        }
    }

    #[test]
    fn test_default_name_is_type_name() {
        let svc: ServiceRef = Arc::new(Anonymous);
        assert!(svc.name().ends_with("Anonymous"));
        assert!(svc.as_init().is_none());
    }

    #[tokio::test]
    async fn test_explicit_name_and_init_capability() {
        let svc: ServiceRef = Arc::new(Labeled);
        assert_eq!(svc.name(), "labeled");

        let init = svc.as_init().expect("init capability");
        let res = init.init(CancellationToken::new()).await;
        assert_eq!(res, Err(ServiceError::fail("no")));
    }
}
