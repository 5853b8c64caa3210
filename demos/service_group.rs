//! # Example: service_group
//!
//! Runs three services under one supervisor until Ctrl-C, or until one fails.
//!
//! Shows how to:
//! - Register a trait-based service with an init step
//! - Register closure-based services with [`ServiceFn`]
//! - Let a failing service bring the whole group down
//! - Report per-service errors after draining
//!
//! ## Flow
//! ```text
//! main()
//!   ├─► register cache (init + run), ticker, flaky
//!   ├─► run_until_signal()
//!   │     ├─► cache.init()
//!   │     ├─► spawn cache.run, ticker.run, flaky.run
//!   │     ├─► flaky fails after 3s ─► group cancelled
//!   │     └─► wait_all_stopped(grace)
//!   └─► print service errors
//! ```
//!
//! ## Run
//! ```bash
//! RUST_LOG=info cargo run --example service_group
//! ```

use std::time::Duration;

use async_trait::async_trait;
use servicevisor::{Init, Service, ServiceError, ServiceFn, Supervisor, SupervisorConfig};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

struct Cache {
    entries: usize,
}

#[async_trait]
impl Init for Cache {
    async fn init(&self, _ctx: CancellationToken) -> Result<(), ServiceError> {
        tracing::info!(entries = self.entries, "warming cache");
        tokio::time::sleep(Duration::from_millis(200)).await;
        Ok(())
    }
}

#[async_trait]
impl Service for Cache {
    fn name(&self) -> &str {
        "cache"
    }

    fn as_init(&self) -> Option<&dyn Init> {
        Some(self)
    }

    async fn run(&self, ctx: CancellationToken) -> Result<(), ServiceError> {
        ctx.cancelled().await;
        tracing::info!("cache flushed");
        Ok(())
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let sup = Supervisor::with_config(SupervisorConfig {
        grace: Duration::from_secs(5),
        ..SupervisorConfig::default()
    });

    sup.register(std::sync::Arc::new(Cache { entries: 128 }));

    sup.register(ServiceFn::arc("ticker", |ctx: CancellationToken| async move {
        let mut n = 0u32;
        while !ctx.is_cancelled() {
            n += 1;
            tracing::info!(tick = n, "tick");
            tokio::select! {
                _ = ctx.cancelled() => {}
                _ = tokio::time::sleep(Duration::from_millis(500)) => {}
            }
        }
        Ok::<_, ServiceError>(())
    }));

    sup.register(ServiceFn::arc("flaky", |ctx: CancellationToken| async move {
        tokio::select! {
            _ = ctx.cancelled() => Ok(()),
            _ = tokio::time::sleep(Duration::from_secs(3)) => {
                Err(ServiceError::fail("lost upstream connection"))
            }
        }
    }));

    let errors = sup.run_until_signal(&CancellationToken::new()).await?;
    for (name, err) in &errors {
        println!("{name}: {err}");
    }
    Ok(())
}
