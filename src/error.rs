//! Error types used by the servicevisor runtime and services.
//!
//! This module defines two main error enums:
//!
//! - [`SupervisorError`] — errors raised by the supervisor while starting the group.
//! - [`ServiceError`] — errors returned by individual services from `init` or `run`.
//!
//! Both types provide a stable [`as_label`](ServiceError::as_label) for logs.
//!
//! Usage errors (duplicate registration, calling `start_all` twice, calling
//! `stop_all` before `start_all`) are not represented here: they are programming
//! mistakes and panic at the call site.

use std::fmt::Display;

use thiserror::Error;

/// # Errors produced by the supervisor runtime.
///
/// Returned from [`Supervisor::start_all`](crate::Supervisor::start_all) when the
/// group could not be brought up. Every variant is accompanied by cancellation of
/// the shared group token.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum SupervisorError {
    /// A service's `init` returned an error; later services were never initialized.
    #[error("failed to init service {name}: {source}")]
    InitFailed {
        /// Name of the service that failed.
        name: String,
        /// Error returned by the service.
        source: ServiceError,
    },

    /// A run record already exists for this service.
    #[error("service '{name}' already started")]
    AlreadyStarted {
        /// Name of the service.
        name: String,
    },

    /// The run phase found no run record for this service.
    #[error("service '{name}' not initialized")]
    NotInitialized {
        /// Name of the service.
        name: String,
    },

    /// The run phase found the service already launched.
    #[error("service '{name}' already running")]
    AlreadyRunning {
        /// Name of the service.
        name: String,
    },

    /// The process-wide supervisor was already created.
    #[error("global supervisor already initialized")]
    GlobalAlreadyInitialized,
}

impl SupervisorError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use servicevisor::{ServiceError, SupervisorError};
    ///
    /// let err = SupervisorError::InitFailed {
    ///     name: "db".into(),
    ///     source: ServiceError::fail("bad config"),
    /// };
    /// assert_eq!(err.as_label(), "supervisor_init_failed");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            SupervisorError::InitFailed { .. } => "supervisor_init_failed",
            SupervisorError::AlreadyStarted { .. } => "supervisor_already_started",
            SupervisorError::NotInitialized { .. } => "supervisor_not_initialized",
            SupervisorError::AlreadyRunning { .. } => "supervisor_already_running",
            SupervisorError::GlobalAlreadyInitialized => "supervisor_global_initialized",
        }
    }

    /// Returns the name of the service this error refers to, if any.
    pub fn service(&self) -> Option<&str> {
        match self {
            SupervisorError::InitFailed { name, .. }
            | SupervisorError::AlreadyStarted { name }
            | SupervisorError::NotInitialized { name }
            | SupervisorError::AlreadyRunning { name } => Some(name),
            SupervisorError::GlobalAlreadyInitialized => None,
        }
    }
}

/// # Errors produced by services.
///
/// Any error a service returns from `run` stops the whole group.
/// The error is kept in the service's run record and reported by
/// [`Supervisor::service_errors`](crate::Supervisor::service_errors).
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ServiceError {
    /// Service failed with a message.
    #[error("{error}")]
    Fail {
        /// The underlying error message.
        error: String,
    },

    /// Service panicked while running.
    #[error("panicked: {info}")]
    Panicked {
        /// Panic payload, if it was a string.
        info: String,
    },
}

impl ServiceError {
    /// Builds a [`ServiceError::Fail`] from anything printable.
    ///
    /// # Example
    /// ```
    /// use servicevisor::ServiceError;
    ///
    /// let err = ServiceError::fail("boom");
    /// assert_eq!(err.to_string(), "boom");
    /// ```
    pub fn fail(error: impl Display) -> Self {
        ServiceError::Fail {
            error: error.to_string(),
        }
    }

    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            ServiceError::Fail { .. } => "service_failed",
            ServiceError::Panicked { .. } => "service_panicked",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            ServiceError::Fail { error } => format!("error: {error}"),
            ServiceError::Panicked { info } => format!("panic: {info}"),
        }
    }

    /// Converts a panic payload caught from a service future.
    pub(crate) fn from_panic(payload: &(dyn std::any::Any + Send)) -> Self {
        let info = if let Some(s) = payload.downcast_ref::<&str>() {
            (*s).to_string()
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else {
            "unknown".to_string()
        };
        ServiceError::Panicked { info }
    }
}
