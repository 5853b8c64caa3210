//! # Supervisor: registers services, starts them in order, stops them together.
//!
//! The [`Supervisor`] owns an ordered list of registered services, one
//! [`RunRecord`] per service once started, and a single group
//! [`CancellationToken`] shared by every service.
//!
//! ## Key responsibilities
//! - reject duplicate service names at registration (panic)
//! - run every `init` sequentially, in registration order
//! - launch every `run` in registration order, each on its own tokio task
//! - cancel the whole group when any service fails
//! - wait (bounded) for all services to stop and report their errors
//!
//! ## High-level architecture
//! ```text
//! register(A) register(B) register(C)        (before start_all)
//!
//! start_all(parent):
//!   group = parent.child_token()
//!   init phase:  A.init(group) ─► B.init(group) ─► C.init(group)
//!                  └─ Err/panic ─► resolve record Ok(()), group.cancel(), return InitFailed
//!   run phase:   spawn A.run(group), spawn B.run(group), spawn C.run(group)
//!
//! per service task:
//!   run(group) ──► Err(e) ─► record.resolve(Err(e)) ─► group.cancel()   (stop all)
//!              └─► Ok(())  ─► record.resolve(Ok(()))  (warn if group not cancelled)
//!
//! wait_all_stopped(grace):
//!   ┌─ waiter per record ─► record.wait()            ┐
//!   ├─ heartbeat tick     ─► log still-running names ├─ until all resolved or grace elapsed
//!   └─ deadline           ─► warn "did not stop gracefully"
//! ```
//!
//! ## Usage errors
//! The following are programming mistakes and panic:
//! - registering two services with the same name;
//! - registering after `start_all`;
//! - calling `start_all` twice;
//! - calling `stop_all` before `start_all`.
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
//!     sup.register(ServiceFn::arc("ticker", |ctx: CancellationToken| async move {
//!         while !ctx.is_cancelled() {
//!             tokio::time::sleep(Duration::from_millis(10)).await;
//!         }
//!         Ok::<_, ServiceError>(())
//!     }));
//!
//!     sup.start_all(&CancellationToken::new()).await?;
//!     sup.stop_all();
//!     assert!(sup.wait_all_stopped(Duration::from_secs(1)).await);
//!     assert!(sup.service_errors().is_empty());
//!     Ok(())
//! }
//! ```

use std::collections::HashMap;
use std::panic::AssertUnwindSafe;
use std::sync::{Arc, Mutex, MutexGuard, OnceLock, PoisonError};
use std::time::Duration;

use futures::{FutureExt, StreamExt, stream::FuturesUnordered};
use tokio::time::{self, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::core::{config::SupervisorConfig, record::RunRecord, shutdown};
use crate::error::{ServiceError, SupervisorError};
use crate::services::ServiceRef;

/// A service as registered, before start.
#[derive(Clone)]
struct Registration {
    name: String,
    service: ServiceRef,
}

/// Coordinates the lifecycle of a fixed group of services.
pub struct Supervisor {
    cfg: SupervisorConfig,
    /// Registered services in registration order.
    services: Mutex<Vec<Registration>>,
    /// Run records by service name, filled during the init phase.
    records: Mutex<HashMap<String, Arc<RunRecord>>>,
    /// Group token; set exactly once by `start_all`.
    token: OnceLock<CancellationToken>,
}

impl Default for Supervisor {
    fn default() -> Self {
        Self::new()
    }
}

impl Supervisor {
    /// Creates a supervisor with [`SupervisorConfig::default`].
    pub fn new() -> Self {
        Self::with_config(SupervisorConfig::default())
    }

    /// Creates a supervisor with the given configuration.
    pub fn with_config(cfg: SupervisorConfig) -> Self {
        Self {
            cfg,
            services: Mutex::new(Vec::new()),
            records: Mutex::new(HashMap::new()),
            token: OnceLock::new(),
        }
    }

    /// Returns the configuration this supervisor was built with.
    pub fn config(&self) -> &SupervisorConfig {
        &self.cfg
    }

    /// Adds a service to the group.
    ///
    /// # Panics
    /// - if a service with the same [`name`](crate::Service::name) is already registered;
    /// - if called after [`start_all`](Self::start_all).
    pub fn register(&self, service: ServiceRef) {
        let name = service.name().to_string();
        // `start_all` sets the token under this lock, so the check cannot race it.
        let mut services = lock(&self.services);
        if self.is_started() {
            drop(services);
            panic!("service '{name}' registered after Supervisor::start_all");
        }
        if services.iter().any(|s| s.name == name) {
            drop(services);
            panic!("service '{name}' already registered");
        }

        debug!(service = %name, "service registered");
        services.push(Registration { name, service });
    }

    /// Returns registered service names in registration order.
    pub fn services(&self) -> Vec<String> {
        lock(&self.services)
            .iter()
            .map(|s| s.name.clone())
            .collect()
    }

    /// Returns true once [`start_all`](Self::start_all) has been called.
    pub fn is_started(&self) -> bool {
        self.token.get().is_some()
    }

    /// Initializes, then launches, every registered service.
    ///
    /// The group token is derived from `parent`, so cancelling `parent` stops the group too.
    ///
    /// ### Flow
    /// 1. Init phase: call `init` (if the service has one) for each service in order.
    ///    The first failure cancels the group and returns [`SupervisorError::InitFailed`];
    ///    later services are neither initialized nor launched.
    /// 2. Run phase: spawn `run` for each service in order.
    ///
    /// # Panics
    /// If called more than once.
    pub async fn start_all(&self, parent: &CancellationToken) -> Result<(), SupervisorError> {
        let token = parent.child_token();
        let services = {
            let guard = lock(&self.services);
            if self.token.set(token.clone()).is_err() {
                drop(guard);
                panic!("Supervisor::start_all can only be called once");
            }
            guard.clone()
        };
        let total = services.len();

        for (i, reg) in services.iter().enumerate() {
            info!(service = %reg.name, "initialize service {}/{}", i + 1, total);
            if let Err(err) = self.init_one(&token, reg).await {
                error!(service = %reg.name, error = %err, "failed to initialize service");
                token.cancel();
                return Err(err);
            }
        }

        for (i, reg) in services.iter().enumerate() {
            info!(service = %reg.name, "run service {}/{}", i + 1, total);
            if let Err(err) = self.run_one(&token, reg) {
                error!(service = %reg.name, error = %err, "failed to start service");
                token.cancel();
                return Err(err);
            }
        }

        info!(count = total, "all services running");
        Ok(())
    }

    /// Creates the run record and executes the optional init.
    async fn init_one(
        &self,
        token: &CancellationToken,
        reg: &Registration,
    ) -> Result<(), SupervisorError> {
        let record = RunRecord::new(reg.name.clone(), reg.service.clone());
        {
            let mut records = lock(&self.records);
            if records.contains_key(&reg.name) {
                return Err(SupervisorError::AlreadyStarted {
                    name: reg.name.clone(),
                });
            }
            records.insert(reg.name.clone(), Arc::clone(&record));
        }

        if let Some(init) = reg.service.as_init() {
            info!(service = %reg.name, "execute service init");
            let outcome = match AssertUnwindSafe(init.init(token.clone()))
                .catch_unwind()
                .await
            {
                Ok(res) => res,
                Err(panic) => Err(ServiceError::from_panic(panic.as_ref())),
            };
            if let Err(source) = outcome {
                // Never runs: release waiters with a clean outcome.
                record.resolve(Ok(()));
                return Err(SupervisorError::InitFailed {
                    name: reg.name.clone(),
                    source,
                });
            }
        }
        Ok(())
    }

    /// Marks the record running and spawns the service's run.
    fn run_one(
        &self,
        token: &CancellationToken,
        reg: &Registration,
    ) -> Result<(), SupervisorError> {
        let record = lock(&self.records).get(&reg.name).cloned().ok_or_else(|| {
            SupervisorError::NotInitialized {
                name: reg.name.clone(),
            }
        })?;

        if !record.mark_launched() {
            return Err(SupervisorError::AlreadyRunning {
                name: reg.name.clone(),
            });
        }

        tokio::spawn(run_service(
            record,
            token.clone(),
            self.cfg.stop_on_clean_exit,
        ));
        Ok(())
    }

    /// Cancels the group token; every service is expected to observe it and return.
    ///
    /// Repeated calls are harmless.
    ///
    /// # Panics
    /// If called before [`start_all`](Self::start_all).
    pub fn stop_all(&self) {
        let Some(token) = self.token.get() else {
            panic!("call Supervisor::start_all() before stop_all()");
        };
        if !token.is_cancelled() {
            info!("stopping all services");
        }
        token.cancel();
    }

    /// Completes once the group has been asked to stop, for any reason.
    ///
    /// # Panics
    /// If called before [`start_all`](Self::start_all).
    pub async fn stopped(&self) {
        let Some(token) = self.token.get() else {
            panic!("call Supervisor::start_all() before stopped()");
        };
        token.cancelled().await;
    }

    /// Waits until every service has stopped or `grace` elapses.
    ///
    /// Logs the services still running once per [`SupervisorConfig::heartbeat`].
    /// This never cancels anything and never fails: on deadline it logs a warning
    /// listing the services that did not stop.
    ///
    /// Returns `true` if every service stopped within `grace`.
    pub async fn wait_all_stopped(&self, grace: Duration) -> bool {
        let records = self.records_in_order();
        info!(count = records.len(), "waiting for all services to stop");

        let mut waiters: FuturesUnordered<_> = records
            .iter()
            .map(|rec| async move {
                debug!(service = rec.name(), "waiting for service to stop");
                if let Some(err) = rec.wait().await {
                    warn!(service = rec.name(), error = %err, "service stopped with error");
                }
            })
            .collect();

        let period = self.cfg.heartbeat_clamped();
        let mut heartbeat = time::interval_at(Instant::now() + period, period);
        heartbeat.set_missed_tick_behavior(MissedTickBehavior::Delay);

        let drained = time::timeout(grace, async {
            loop {
                tokio::select! {
                    next = waiters.next() => {
                        if next.is_none() {
                            break;
                        }
                    }
                    _ = heartbeat.tick() => {
                        let running = self.running_services();
                        info!(
                            count = running.len(),
                            services = %running.join(","),
                            "waiting for services to stop"
                        );
                    }
                }
            }
        })
        .await
        .is_ok();

        if drained {
            info!("all services stopped");
        } else {
            let running = self.running_services();
            warn!(
                count = running.len(),
                services = %running.join(","),
                "services did not stop gracefully"
            );
        }
        drained
    }

    /// Returns names of services launched and not yet stopped, in registration order.
    pub fn running_services(&self) -> Vec<String> {
        self.records_in_order()
            .into_iter()
            .filter(|rec| rec.is_running())
            .map(|rec| rec.name().to_string())
            .collect()
    }

    /// Returns the terminal error of every service that stopped with one.
    ///
    /// A snapshot: services still running are absent until they resolve.
    pub fn service_errors(&self) -> HashMap<String, ServiceError> {
        lock(&self.records)
            .iter()
            .filter_map(|(name, rec)| rec.error().map(|err| (name.clone(), err)))
            .collect()
    }

    /// Runs the group until a termination signal arrives or the group stops on its own.
    ///
    /// ### Flow
    /// 1. [`start_all`](Self::start_all) (errors are returned as-is)
    /// 2. wait for SIGINT/SIGTERM/SIGQUIT (Ctrl-C off unix) or group cancellation
    /// 3. [`stop_all`](Self::stop_all), then [`wait_all_stopped`](Self::wait_all_stopped)
    ///    bounded by [`SupervisorConfig::grace`]
    /// 4. return [`service_errors`](Self::service_errors)
    pub async fn run_until_signal(
        &self,
        parent: &CancellationToken,
    ) -> Result<HashMap<String, ServiceError>, SupervisorError> {
        self.start_all(parent).await?;

        let signal = async {
            match shutdown::wait_for_signal().await {
                Ok(()) => info!("termination signal received"),
                Err(err) => {
                    warn!(error = %err, "cannot listen for termination signals");
                    std::future::pending::<()>().await;
                }
            }
        };

        tokio::select! {
            _ = signal => {}
            _ = self.stopped() => {}
        }

        self.stop_all();
        self.wait_all_stopped(self.cfg.grace).await;
        Ok(self.service_errors())
    }

    /// Returns run records in registration order.
    fn records_in_order(&self) -> Vec<Arc<RunRecord>> {
        let names = self.services();
        let records = lock(&self.records);
        names
            .iter()
            .filter_map(|name| records.get(name).cloned())
            .collect()
    }
}

/// Body of the tokio task owning one service's run.
async fn run_service(record: Arc<RunRecord>, token: CancellationToken, stop_on_clean_exit: bool) {
    let service = Arc::clone(record.service());
    info!(service = record.name(), "execute service run");

    let outcome = match AssertUnwindSafe(service.run(token.clone()))
        .catch_unwind()
        .await
    {
        Ok(res) => res,
        Err(panic) => Err(ServiceError::from_panic(panic.as_ref())),
    };

    let stop = match &outcome {
        Err(err) => {
            error!(
                service = record.name(),
                error = %err,
                "service stopped with error, stopping all services"
            );
            true
        }
        Ok(()) if token.is_cancelled() => {
            info!(service = record.name(), "service stopped");
            false
        }
        Ok(()) => {
            warn!(service = record.name(), "service stopped before cancellation");
            stop_on_clean_exit
        }
    };

    record.resolve(outcome);
    if stop {
        token.cancel();
    }
}

/// Locks a registry mutex, ignoring poisoning from a panicked registration.
fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}
