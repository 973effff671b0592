//! Shutdown coordination between the interrupt path and the accept loop
//!
//! The notification path only performs an atomic store and a waker
//! round-trip; the server loop observes the flag at its accept boundary
//! and nowhere else.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::signal;
use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tracing::info;

/// Process-wide cancellation flag for the accept loop
///
/// Cloning shares the same underlying flag.
#[derive(Debug, Clone, Default)]
pub struct ShutdownFlag {
    stopped: Arc<AtomicBool>,
    notify: Arc<Notify>,
}

impl ShutdownFlag {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Request shutdown. Safe to call from any task; does nothing beyond
    /// an atomic store and waking waiters.
    pub fn trigger(&self) {
        self.stopped.store(true, Ordering::Release);
        self.notify.notify_waiters();
    }

    /// Whether shutdown has been requested
    #[must_use]
    pub fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::Acquire)
    }

    /// Resolve once shutdown has been requested
    ///
    /// Interest is registered before the flag is re-checked, so a trigger
    /// racing with this call is never missed.
    pub async fn stopped(&self) {
        let notified = self.notify.notified();
        tokio::pin!(notified);
        notified.as_mut().enable();
        if self.is_stopped() {
            return;
        }
        notified.await;
    }
}

/// Wait for an interrupt (ctrl-c, or SIGTERM on unix)
async fn interrupt_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

/// Spawn the task that converts an interrupt into a flag trigger
pub fn spawn_interrupt_listener(flag: ShutdownFlag) -> JoinHandle<()> {
    tokio::spawn(async move {
        interrupt_signal().await;
        info!("interrupt received, shutting down after current relay");
        flag.trigger();
    })
}
