//! Process-wide shutdown hooks.
//!
//! Every outbound resource (database pool, event log, gRPC channel, background
//! task) registers a hook with the [`Closer`]. On SIGINT/SIGTERM the binary
//! calls [`Closer::close_all`], which runs the hooks in reverse registration
//! order under a single deadline.

use std::fmt::Display;
use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::{info, warn};

type HookFuture = Pin<Box<dyn Future<Output = Result<(), String>> + Send>>;
type Hook = Box<dyn FnOnce() -> HookFuture + Send>;

/// Outcome of [`Closer::close_all`].
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CloseReport {
    pub closed: usize,
    pub failed: usize,
    /// Hooks that never ran because the deadline elapsed.
    pub skipped: usize,
}

/// Registry of shutdown hooks.
#[derive(Default)]
pub struct Closer {
    hooks: Mutex<Vec<(String, Hook)>>,
}

impl Closer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a named shutdown hook.
    pub async fn add<F, Fut, E>(&self, name: impl Into<String>, hook: F)
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = Result<(), E>> + Send + 'static,
        E: Display,
    {
        let boxed: Hook = Box::new(move || {
            Box::pin(async move { hook().await.map_err(|e| e.to_string()) })
        });
        self.hooks.lock().await.push((name.into(), boxed));
    }

    /// Number of hooks still registered.
    pub async fn len(&self) -> usize {
        self.hooks.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.hooks.lock().await.is_empty()
    }

    /// Run every registered hook in reverse order of registration.
    ///
    /// Failures are logged and do not stop the remaining hooks. Once the
    /// deadline elapses the hook in flight is abandoned and the rest are
    /// skipped.
    pub async fn close_all(&self, timeout: Duration) -> CloseReport {
        let hooks = std::mem::take(&mut *self.hooks.lock().await);
        let deadline = Instant::now() + timeout;
        let mut report = CloseReport::default();
        let total = hooks.len();

        for (index, (name, hook)) in hooks.into_iter().rev().enumerate() {
            match tokio::time::timeout_at(deadline, hook()).await {
                Ok(Ok(())) => {
                    info!(hook = %name, "Shutdown hook completed");
                    report.closed += 1;
                }
                Ok(Err(e)) => {
                    warn!(hook = %name, error = %e, "Shutdown hook failed");
                    report.failed += 1;
                }
                Err(_) => {
                    report.skipped = total - index;
                    warn!(
                        hook = %name,
                        skipped = report.skipped,
                        "Shutdown deadline elapsed, abandoning remaining hooks"
                    );
                    break;
                }
            }
        }

        report
    }
}

/// Resolve when the process receives SIGINT or SIGTERM.
pub async fn wait_for_signal() -> std::io::Result<()> {
    #[cfg(unix)]
    {
        let mut sigterm =
            tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())?;
        tokio::select! {
            result = tokio::signal::ctrl_c() => {
                result?;
                info!("Received Ctrl+C shutdown signal");
            }
            _ = sigterm.recv() => {
                info!("Received SIGTERM shutdown signal");
            }
        }
    }
    #[cfg(not(unix))]
    {
        tokio::signal::ctrl_c().await?;
        info!("Received Ctrl+C shutdown signal");
    }
    Ok(())
}
