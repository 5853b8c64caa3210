//! # servicevisor
//!
//! **Servicevisor** supervises a fixed group of long-running async services inside
//! one process: they are registered up front, started together, and stopped together.
//!
//! A failure anywhere stops everything. There are no restarts; the caller decides
//! what happens after the group is down (usually: log the errors and exit).
//!
//! ## Architecture
//! ### Overview
//! ```text
//!     ┌──────────────┐   ┌──────────────┐   ┌──────────────┐
//!     │   Service    │   │   Service    │   │   Service    │
//!     │  (init+run)  │   │    (run)     │   │  (init+run)  │
//!     └──────┬───────┘   └──────┬───────┘   └──────┬───────┘
//!            ▼ register         ▼ register         ▼ register
//! ┌───────────────────────────────────────────────────────────────────┐
//! │  Supervisor                                                       │
//! │  - ordered registry (unique names)                                │
//! │  - RunRecord per service (running flag, resolve-once outcome)     │
//! │  - one group CancellationToken (child of the caller's token)      │
//! └──────┬──────────────────┬──────────────────┬──────────────────────┘
//!        ▼                  ▼                  ▼
//!     tokio task         tokio task         tokio task
//!     run(group)         run(group)         run(group)
//!        │                  │                  │
//!        └───── Err ────────┴──► group.cancel() ──► every run observes it
//! ```
//!
//! ### Lifecycle
//! ```text
//! register(..)*  ──►  start_all(parent)
//!                       ├─► init phase (sequential, registration order)
//!                       │     └─ first Err ─► cancel group, return InitFailed
//!                       └─► run phase (launch in order, run concurrently)
//!
//! any run returns Err  ──► stop_all()   (cancel group)
//! caller               ──► stop_all()
//!
//! wait_all_stopped(grace)  ──► true when all runs returned, false on deadline (logged)
//! service_errors()         ──► name → error for every run that failed
//! ```
//!
//! ## Features
//! | Area              | Description                                              | Key types / traits                      |
//! |-------------------|----------------------------------------------------------|-----------------------------------------|
//! | **Services**      | Define services as trait impls or closures.              | [`Service`], [`Init`], [`ServiceFn`]    |
//! | **Supervision**   | Start, stop, drain and report a group of services.       | [`Supervisor`]                          |
//! | **Errors**        | Typed errors for startup and service failures.           | [`SupervisorError`], [`ServiceError`]   |
//! | **Configuration** | Heartbeat, grace and early-exit behavior.                | [`SupervisorConfig`]                    |
//! | **Default group** | Process-wide instance behind a one-time guard.           | [`global`], [`try_init_global`]         |
//!
//! Logging goes through [`tracing`]; install any subscriber to see it.
//!
//! ## Example
//! ```rust
//! use std::time::Duration;
//! use tokio_util::sync::CancellationToken;
//! use servicevisor::{ServiceError, ServiceFn, Supervisor};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let sup = Supervisor::new();
//!
//!     sup.register(ServiceFn::arc("api", |ctx: CancellationToken| async move {
//!         ctx.cancelled().await;
//!         Ok::<_, ServiceError>(())
//!     }));
//!     sup.register(ServiceFn::arc("broken", |_ctx: CancellationToken| async move {
//!         Err::<(), _>(ServiceError::fail("boom"))
//!     }));
//!
//!     sup.start_all(&CancellationToken::new()).await?;
//!
//!     // "broken" fails, which stops "api" as well.
//!     sup.wait_all_stopped(Duration::from_secs(5)).await;
//!     let errors = sup.service_errors();
//!     assert_eq!(errors["broken"].to_string(), "boom");
//!     assert!(!errors.contains_key("api"));
//!     Ok(())
//! }
//! ```
mod core;
mod error;
mod services;

// ---- Public re-exports ----

pub use crate::core::{Supervisor, SupervisorConfig, global, try_init_global};
pub use error::{ServiceError, SupervisorError};
pub use services::{Init, Service, ServiceFn, ServiceRef};
