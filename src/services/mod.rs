//! # Service abstractions.
//!
//! This module provides the service-related types:
//! - [`Service`] - trait for implementing long-running, cancelable services
//! - [`Init`] - optional one-shot setup capability, run before [`Service::run`]
//! - [`ServiceFn`] - function-backed service implementation
//! - [`ServiceRef`] - shared reference to a service (`Arc<dyn Service>`)

mod service;
mod service_fn;

pub use service::{Init, Service, ServiceRef};
pub use service_fn::ServiceFn;
