//! # Process-wide default supervisor.
//!
//! Convenience for wiring services from anywhere in the program without passing a
//! [`Supervisor`] around. Creation is guarded by a [`OnceLock`], so concurrent first
//! accesses observe the same instance.
//!
//! Prefer an explicitly constructed [`Supervisor`] where it can be passed down.

use std::sync::OnceLock;

use crate::core::{config::SupervisorConfig, supervisor::Supervisor};
use crate::error::SupervisorError;

static GLOBAL: OnceLock<Supervisor> = OnceLock::new();

/// Returns the process-wide supervisor, creating it with the default config on first access.
pub fn global() -> &'static Supervisor {
    GLOBAL.get_or_init(Supervisor::new)
}

/// Creates the process-wide supervisor with `cfg`.
///
/// Must run before the first [`global`] call; afterwards the instance exists and
/// [`SupervisorError::GlobalAlreadyInitialized`] is returned.
pub fn try_init_global(cfg: SupervisorConfig) -> Result<&'static Supervisor, SupervisorError> {
    GLOBAL
        .set(Supervisor::with_config(cfg))
        .map_err(|_| SupervisorError::GlobalAlreadyInitialized)?;
    Ok(global())
}
