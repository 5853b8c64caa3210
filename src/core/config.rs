//! # Supervisor configuration.
//!
//! Provides [`SupervisorConfig`] centralized settings for the supervisor runtime.
//!
//! ## Sentinel values
//! - `heartbeat = 0s` → clamped to 1ms (the drain heartbeat never spins)

use std::time::Duration;

/// Configuration for a [`Supervisor`](crate::Supervisor).
///
/// ## Field semantics
/// - `heartbeat`: Interval at which a draining supervisor logs the services still running
/// - `grace`: Drain bound used by [`Supervisor::run_until_signal`](crate::Supervisor::run_until_signal)
/// - `stop_on_clean_exit`: Whether a service returning `Ok(())` before cancellation stops the group
///
/// ## Notes
/// All fields are public. Prefer the helper accessors to avoid sprinkling
/// sentinel checks across the codebase.
#[derive(Clone, Debug)]
pub struct SupervisorConfig {
    /// Interval between "still running" log lines while draining.
    pub heartbeat: Duration,

    /// Maximum time to wait for services to stop when the supervisor drives shutdown itself.
    ///
    /// Callers of [`Supervisor::wait_all_stopped`](crate::Supervisor::wait_all_stopped)
    /// pass their own bound.
    pub grace: Duration,

    /// Stop the whole group when a service returns `Ok(())` before cancellation.
    ///
    /// Services are expected to run until cancelled. By default such an early
    /// clean return is only logged as an anomaly and the rest of the group keeps running.
    pub stop_on_clean_exit: bool,
}

impl SupervisorConfig {
    /// Returns the heartbeat interval clamped to a minimum of 1ms.
    #[inline]
    pub fn heartbeat_clamped(&self) -> Duration {
        self.heartbeat.max(Duration::from_millis(1))
    }
}

impl Default for SupervisorConfig {
    /// Default configuration:
    ///
    /// - `heartbeat = 1s`
    /// - `grace = 60s`
    /// - `stop_on_clean_exit = false`
    fn default() -> Self {
        Self {
            heartbeat: Duration::from_secs(1),
            grace: Duration::from_secs(60),
            stop_on_clean_exit: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cfg = SupervisorConfig::default();
        assert_eq!(cfg.heartbeat, Duration::from_secs(1));
        assert_eq!(cfg.grace, Duration::from_secs(60));
        assert!(!cfg.stop_on_clean_exit);
    }

    #[test]
    fn test_heartbeat_clamped() {
        let cfg = SupervisorConfig {
            heartbeat: Duration::ZERO,
            ..SupervisorConfig::default()
        };
        assert_eq!(cfg.heartbeat_clamped(), Duration::from_millis(1));
    }
}
