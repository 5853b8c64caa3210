//! # OS termination signals.
//!
//! [`wait_for_signal`] completes when the process is asked to terminate.
//!
//! [`Supervisor::run_until_signal`](crate::Supervisor::run_until_signal) races it
//! against the group token: whichever fires first leads to `stop_all` and a drain
//! bounded by `SupervisorConfig::grace`. A listener that cannot be installed is
//! logged there and the supervisor keeps waiting on the group token alone.
//!
//! - **Unix**: `SIGINT`, `SIGTERM`, `SIGQUIT`
//! - **Other platforms**: Ctrl-C

/// Waits for a termination signal.
///
/// Returns `Err` if a signal listener cannot be installed.
#[cfg(unix)]
pub(crate) async fn wait_for_signal() -> std::io::Result<()> {
    use tokio::signal::unix::{SignalKind, signal};

    let mut interrupt = signal(SignalKind::interrupt())?;
    let mut terminate = signal(SignalKind::terminate())?;
    let mut quit = signal(SignalKind::quit())?;

    tokio::select! {
        _ = interrupt.recv() => {},
        _ = terminate.recv() => {},
        _ = quit.recv() => {},
    }
    Ok(())
}

/// Waits for a termination signal.
///
/// Returns `Err` if the Ctrl-C listener cannot be installed.
#[cfg(not(unix))]
pub(crate) async fn wait_for_signal() -> std::io::Result<()> {
    tokio::signal::ctrl_c().await
}
