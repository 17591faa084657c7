//! Cooperative shutdown flag for the governance node.
//!
//! Block-event handlers are never interrupted mid-update — a half-applied
//! poll mutation would diverge the in-memory and on-disk images. Instead the
//! node carries one shared flag: the consensus loop and the persistence
//! layer check [`is_triggered`](ShutdownSignal::is_triggered) between units
//! of work, async tasks await [`triggered`](ShutdownSignal::triggered), and
//! the daemon raises the flag on SIGINT/SIGTERM.

use tokio::signal;
use tokio::sync::watch;

/// A single cooperative shutdown flag shared across subsystems.
///
/// Cloneable via `subscribe`-free sharing: hand out `&ShutdownSignal` (or an
/// `Arc`) and every holder sees the same flag.
pub struct ShutdownSignal {
    flag: watch::Sender<bool>,
}

impl ShutdownSignal {
    pub fn new() -> Self {
        let (flag, _) = watch::channel(false);
        Self { flag }
    }

    /// Raise the flag. Idempotent.
    pub fn trigger(&self) {
        let _ = self.flag.send(true);
    }

    /// Synchronous check, for loops that sit between blocking store writes.
    pub fn is_triggered(&self) -> bool {
        *self.flag.borrow()
    }

    /// Wait until the flag is raised. Resolves immediately if it already is.
    pub async fn triggered(&self) {
        let mut rx = self.flag.subscribe();
        while !*rx.borrow_and_update() {
            if rx.changed().await.is_err() {
                return;
            }
        }
    }

    /// Raise the flag when the process receives SIGINT or SIGTERM.
    pub async fn listen_for_signals(&self) {
        let ctrl_c = signal::ctrl_c();

        #[cfg(unix)]
        let terminate = async {
            signal::unix::signal(signal::unix::SignalKind::terminate())
                .expect("failed to install SIGTERM handler")
                .recv()
                .await;
        };

        #[cfg(not(unix))]
        let terminate = std::future::pending::<()>();

        tokio::select! {
            _ = ctrl_c => { tracing::info!("received SIGINT, shutting down"); }
            _ = terminate => { tracing::info!("received SIGTERM, shutting down"); }
        }

        self.trigger();
    }
}

impl Default for ShutdownSignal {
    fn default() -> Self {
        Self::new()
    }
}
