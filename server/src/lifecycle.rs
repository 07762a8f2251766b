//! Server lifecycle: `Starting -> Serving -> Draining -> Stopped`.
//!
//! # Design
//! The server runs in its own task with axum's graceful shutdown wired to a
//! oneshot channel. When the external shutdown future resolves the lifecycle
//! fires that channel, which stops the accept loop, and then races the server
//! task against the grace period. When the grace period ends first the accept
//! task is aborted and any connection still being served is left to die with
//! the runtime.

use std::{future::Future, net::SocketAddr, time::Duration};

use axum::Router;
use tokio::{
    net::{TcpListener, ToSocketAddrs},
    sync::{oneshot, watch},
    task::JoinHandle,
};
use tracing::{error, info, warn};

use crate::error::ServeError;

/// Default time in-flight requests get to finish once draining starts.
pub const DEFAULT_GRACE_PERIOD: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Starting,
    Serving,
    Draining,
    Stopped,
}

/// How draining ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrainOutcome {
    /// Every in-flight request finished within the grace period.
    Completed,
    /// The grace period elapsed and remaining requests were dropped.
    Abandoned,
}

/// Drives one server instance through its phases.
#[derive(Debug)]
pub struct Lifecycle {
    grace: Duration,
    phase: watch::Sender<Phase>,
}

impl Lifecycle {
    pub fn new(grace: Duration) -> Self {
        let (phase, _) = watch::channel(Phase::Starting);
        Self { grace, phase }
    }

    /// Receiver that observes every phase transition.
    pub fn subscribe(&self) -> watch::Receiver<Phase> {
        self.phase.subscribe()
    }

    pub fn phase(&self) -> Phase {
        *self.phase.borrow()
    }

    fn enter(&self, phase: Phase) {
        self.phase.send_replace(phase);
    }

    /// Binds `addr` and serves `app` until `shutdown` resolves.
    pub async fn bind_and_serve<A, F>(
        self,
        addr: A,
        app: Router,
        shutdown: F,
    ) -> Result<DrainOutcome, ServeError>
    where
        A: ToSocketAddrs + ToString,
        F: Future<Output = ()> + Send + 'static,
    {
        let listener = TcpListener::bind(&addr)
            .await
            .map_err(|source| ServeError::Bind {
                addr: addr.to_string(),
                source,
            })?;
        self.serve(listener, app, shutdown).await
    }

    /// Serves `app` on an already bound listener until `shutdown` resolves,
    /// then drains for at most the grace period.
    ///
    /// # Errors
    /// Returns [`ServeError::Serve`] if the server stops on its own with an
    /// I/O error before shutdown was requested.
    pub async fn serve<F>(
        self,
        listener: TcpListener,
        app: Router,
        shutdown: F,
    ) -> Result<DrainOutcome, ServeError>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let addr = local_addr(&listener);
        let (stop_tx, stop_rx) = oneshot::channel::<()>();

        let mut server: JoinHandle<std::io::Result<()>> = tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async move {
                    let _ = stop_rx.await;
                })
                .await
        });
        self.enter(Phase::Serving);
        info!(%addr, version = crate::VERSION, "server listening");

        tokio::select! {
            result = &mut server => {
                self.enter(Phase::Stopped);
                let source = match result {
                    Ok(Ok(())) => std::io::Error::other("server exited before shutdown"),
                    Ok(Err(err)) => err,
                    Err(join) => std::io::Error::other(join),
                };
                error!(%addr, error = %source, "server stopped unexpectedly");
                return Err(ServeError::Serve { addr, source });
            }
            () = shutdown => {
                info!("shutdown signal received, draining");
            }
        }

        self.enter(Phase::Draining);
        let _ = stop_tx.send(());

        let outcome = match tokio::time::timeout(self.grace, &mut server).await {
            Ok(Ok(Ok(()))) => DrainOutcome::Completed,
            Ok(Ok(Err(err))) => {
                // The listener was closed on purpose; an error here only
                // means some connection failed while draining.
                warn!(error = %err, "error while draining");
                DrainOutcome::Completed
            }
            Ok(Err(join)) => {
                warn!(error = %join, "server task failed while draining");
                DrainOutcome::Completed
            }
            Err(_) => {
                server.abort();
                warn!(grace = ?self.grace, "grace period elapsed, abandoning in-flight requests");
                DrainOutcome::Abandoned
            }
        };

        self.enter(Phase::Stopped);
        info!(?outcome, "server stopped");
        Ok(outcome)
    }
}

impl Default for Lifecycle {
    fn default() -> Self {
        Self::new(DEFAULT_GRACE_PERIOD)
    }
}

fn local_addr(listener: &TcpListener) -> SocketAddr {
    listener
        .local_addr()
        .unwrap_or_else(|_| SocketAddr::from(([0, 0, 0, 0], 0)))
}

/// Resolves on Ctrl+C, or SIGTERM on unix.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            error!(error = %err, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                error!(error = %err, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
}
