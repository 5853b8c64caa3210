//! Runtime core: registration, lifecycle and shutdown.
//!
//! The public API from this module is [`Supervisor`], its [`SupervisorConfig`],
//! and the process-wide default instance ([`global`], [`try_init_global`]).
//!
//! Internal modules:
//! - [`supervisor`]: registers services, runs init/run phases, drains and reports;
//! - [`record`]: per-service run state resolved exactly once;
//! - [`config`]: supervisor settings;
//! - [`default_instance`]: one-time guarded process-wide instance;
//! - [`shutdown`]: cross-platform termination signal handling.

mod config;
mod default_instance;
mod record;
mod shutdown;
mod supervisor;

pub use config::SupervisorConfig;
pub use default_instance::{global, try_init_global};
pub use supervisor::Supervisor;
