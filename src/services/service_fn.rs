//! # Function-backed service (`ServiceFn`)
//!
//! [`ServiceFn`] wraps a closure `F: Fn(CancellationToken) -> Fut`, producing a fresh
//! future per call. An optional init closure can be attached with
//! [`ServiceFn::with_init`]; only then does the service expose the [`Init`] capability.
//!
//! If the closures need shared state, capture an `Arc<...>` explicitly.
//!
//! ## Example
//! ```rust
//! use tokio_util::sync::CancellationToken;
//! use servicevisor::{ServiceError, ServiceFn, ServiceRef};
//!
//! let s: ServiceRef = ServiceFn::new("worker", |ctx: CancellationToken| async move {
//!     ctx.cancelled().await;
//!     Ok::<_, ServiceError>(())
//! })
//! .with_init(|_ctx: CancellationToken| async { Ok(()) })
//! .into_ref();
//!
//! assert_eq!(s.name(), "worker");
//! assert!(s.as_init().is_some());
//! ```

use std::borrow::Cow;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::error::ServiceError;
use crate::services::service::{Init, Service, ServiceRef};

type BoxServiceFuture = Pin<Box<dyn Future<Output = Result<(), ServiceError>> + Send + 'static>>;
type InitFn = Box<dyn Fn(CancellationToken) -> BoxServiceFuture + Send + Sync + 'static>;

/// Function-backed service implementation.
pub struct ServiceFn<F> {
    name: Cow<'static, str>,
    run: F,
    init: Option<InitFn>,
}

impl<F> ServiceFn<F> {
    /// Creates a new function-backed service without init.
    pub fn new(name: impl Into<Cow<'static, str>>, run: F) -> Self {
        Self {
            name: name.into(),
            run,
            init: None,
        }
    }

    /// Creates the service and returns it as an `Arc`.
    ///
    /// The result coerces to [`ServiceRef`] wherever one is expected.
    pub fn arc(name: impl Into<Cow<'static, str>>, run: F) -> Arc<Self> {
        Arc::new(Self::new(name, run))
    }

    /// Attaches an init closure, executed once before `run`.
    pub fn with_init<G, Fut>(mut self, init: G) -> Self
    where
        G: Fn(CancellationToken) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), ServiceError>> + Send + 'static,
    {
        self.init = Some(Box::new(move |ctx| Box::pin(init(ctx))));
        self
    }
}

impl<F, Fut> ServiceFn<F>
where
    F: Fn(CancellationToken) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<(), ServiceError>> + Send + 'static,
{
    /// Converts into a shared [`ServiceRef`].
    pub fn into_ref(self) -> ServiceRef {
        Arc::new(self)
    }
}

impl<F> fmt::Debug for ServiceFn<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceFn")
            .field("name", &self.name)
            .field("init", &self.init.is_some())
            .finish()
    }
}

#[async_trait]
impl<F, Fut> Init for ServiceFn<F>
where
    F: Fn(CancellationToken) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<(), ServiceError>> + Send + 'static,
{
    async fn init(&self, ctx: CancellationToken) -> Result<(), ServiceError> {
        match &self.init {
            Some(init) => init(ctx).await,
            None => Ok(()),
        }
    }
}

#[async_trait]
impl<F, Fut> Service for ServiceFn<F>
where
    F: Fn(CancellationToken) -> Fut + Send + Sync + 'static, // Fn, not FnMut
    Fut: Future<Output = Result<(), ServiceError>> + Send + 'static,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn as_init(&self) -> Option<&dyn Init> {
        self.init.as_ref().map(|_| self as &dyn Init)
    }

    async fn run(&self, ctx: CancellationToken) -> Result<(), ServiceError> {
        (self.run)(ctx).await
    }
}
