//! # Refresh Loop
//!
//! ```text
//! RENDER ──ok──▶ WAIT ──interval elapsed──▶ RENDER
//!   │             │
//!   error         canceled
//!   ▼             ▼
//!  DONE (Err)    DONE (Ok(Canceled))
//! ```
//!
//! The wait is a single `select!` between a timer and a [`CancellationToken`].
//! The token is cancelled by [`spawn_interrupt_listener`] when the process gets
//! SIGINT or SIGTERM. A signal that arrives while a render is running is seen
//! at the next wait; renders themselves are never interrupted.

use crate::error::Result;
use std::future::Future;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Which source woke a [`wait_for`] up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Wakeup {
    Elapsed,
    Canceled,
}

/// How a watch session ended without error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchOutcome {
    Canceled,
}

/// Passed to the render function so it knows whether to clear the screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cycle {
    Initial,
    Refresh,
}

/// Sleeps for `interval` unless `token` is cancelled first.
pub async fn wait_for(interval: Duration, token: &CancellationToken) -> Wakeup {
    tokio::select! {
        biased;
        _ = token.cancelled() => Wakeup::Canceled,
        _ = tokio::time::sleep(interval) => Wakeup::Elapsed,
    }
}

/// Renders, then re-renders every `interval` until `token` is cancelled.
///
/// The first error returned by `render` ends the loop and is returned as is.
pub async fn watch<F, Fut>(
    interval: Duration,
    token: &CancellationToken,
    mut render: F,
) -> Result<WatchOutcome>
where
    F: FnMut(Cycle) -> Fut,
    Fut: Future<Output = Result<()>>,
{
    let mut cycle = Cycle::Initial;
    loop {
        render(cycle).await?;
        match wait_for(interval, token).await {
            Wakeup::Canceled => {
                tracing::debug!("watch canceled");
                return Ok(WatchOutcome::Canceled);
            }
            Wakeup::Elapsed => cycle = Cycle::Refresh,
        }
    }
}

/// Cancels `token` on the first SIGINT or SIGTERM (Ctrl+C elsewhere).
///
/// Must be called from inside a tokio runtime.
pub fn spawn_interrupt_listener(token: CancellationToken) -> JoinHandle<()> {
    tokio::spawn(async move {
        match wait_for_interrupt().await {
            Ok(()) => {
                tracing::debug!("interrupt received");
                token.cancel();
            }
            Err(e) => tracing::warn!(error = %e, "cannot listen for interrupt signals"),
        }
    })
}

#[cfg(unix)]
async fn wait_for_interrupt() -> std::io::Result<()> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut interrupt = signal(SignalKind::interrupt())?;
    let mut terminate = signal(SignalKind::terminate())?;
    tokio::select! {
        _ = interrupt.recv() => {}
        _ = terminate.recv() => {}
    }
    Ok(())
}

#[cfg(not(unix))]
async fn wait_for_interrupt() -> std::io::Result<()> {
    tokio::signal::ctrl_c().await
}
