pub mod http;
pub mod routes;
pub mod static_files;

use crate::domain::ports::MarketDataSource;
use crate::utils::error::Result;
use http::HttpResponse;
use routes::AppState;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::io::{AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinSet;

const REQUEST_READ_TIMEOUT: Duration = Duration::from_secs(10);
const DEFAULT_SHUTDOWN_GRACE: Duration = Duration::from_secs(30);

pub struct Server<S: MarketDataSource> {
    listener: TcpListener,
    state: Arc<AppState<S>>,
    shutdown_grace: Duration,
}

impl<S: MarketDataSource + 'static> Server<S> {
    pub async fn bind(addr: &str, state: AppState<S>) -> Result<Self> {
        let listener = TcpListener::bind(addr).await?;
        Ok(Self {
            listener,
            state: Arc::new(state),
            shutdown_grace: DEFAULT_SHUTDOWN_GRACE,
        })
    }

    /// How long in-flight requests may keep running after shutdown is requested.
    pub fn with_shutdown_grace(mut self, grace: Duration) -> Self {
        self.shutdown_grace = grace;
        self
    }

    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Serves until Ctrl-C or SIGTERM.
    pub async fn run(self) -> Result<()> {
        self.run_until(shutdown_signal()).await
    }

    /// Accepts connections until `shutdown` resolves, then waits up to the
    /// shutdown grace period for in-flight requests before returning.
    pub async fn run_until<F>(self, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);
        tracing::info!("🚀 Listening on http://{}", self.local_addr()?);

        let mut connections = JoinSet::new();
        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    tracing::info!("Shutdown signal received, no longer accepting connections");
                    break;
                }
                accepted = self.listener.accept() => match accepted {
                    Ok((stream, peer)) => {
                        let state = Arc::clone(&self.state);
                        connections.spawn(handle_connection(stream, peer, state));
                    }
                    Err(e) => tracing::warn!("Connection error: {}", e),
                },
                // 回收已結束的連線
                Some(_) = connections.join_next(), if !connections.is_empty() => {}
            }
        }

        drop(self.listener);
        drain(connections, self.shutdown_grace).await;
        Ok(())
    }
}

async fn drain(mut connections: JoinSet<()>, grace: Duration) {
    if connections.is_empty() {
        return;
    }

    tracing::info!(
        "Waiting up to {:?} for {} in-flight request(s)",
        grace,
        connections.len()
    );
    let finished = tokio::time::timeout(grace, async {
        while connections.join_next().await.is_some() {}
    })
    .await;

    if finished.is_err() {
        tracing::warn!(
            "⚠️ Aborting {} request(s) still running after {:?}",
            connections.len(),
            grace
        );
        connections.shutdown().await;
    }
}

async fn handle_connection<S: MarketDataSource + 'static>(
    stream: TcpStream,
    peer: SocketAddr,
    state: Arc<AppState<S>>,
) {
    let started = Instant::now();
    let (read_half, mut write_half) = stream.into_split();
    let mut reader = BufReader::new(read_half);

    let (response, summary) =
        match tokio::time::timeout(REQUEST_READ_TIMEOUT, http::read_request(&mut reader)).await {
            Ok(Ok(Some(request))) => {
                tracing::debug!(
                    "{} {} from {} ({})",
                    request.method,
                    request.path,
                    peer,
                    request.header("user-agent").unwrap_or("-")
                );
                let response = routes::route(&state, &request).await;
                (response, format!("{} {}", request.method, request.path))
            }
            Ok(Ok(None)) => return,
            Ok(Err(e)) => {
                tracing::debug!("Bad request from {}: {}", peer, e);
                (
                    HttpResponse::error(400, "bad_request", &e.to_string()),
                    "<malformed>".to_string(),
                )
            }
            Err(_) => {
                tracing::debug!("Request from {} timed out", peer);
                return;
            }
        };

    if let Err(e) = write_half.write_all(&response.to_bytes()).await {
        tracing::warn!("Failed to write response to {}: {}", peer, e);
        return;
    }
    let _ = write_half.shutdown().await;

    tracing::info!(
        "{} -> {} ({} ms)",
        summary,
        response.status,
        started.elapsed().as_millis()
    );
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
