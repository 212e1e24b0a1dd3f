//! RPC server and its lifecycle.
//!
//! # Responsibilities
//! - Bind the listener and serve registered operations over HTTP/1.1 and HTTP/2
//! - Race the serve loop against the shutdown signal
//! - On shutdown, drain in-flight calls inside a bounded window, then force-stop
//!
//! # Design Decisions
//! - The serve loop owns every connection task; aborting it abandons them all
//! - A forced stop is reported as a warning, never as an error
//! - One `start` per server; `Stopped` and `Failed` are terminal

use std::io;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, OnceLock};
use std::time::{Duration, Instant};

use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use hyper_util::rt::{TokioExecutor, TokioIo};
use hyper_util::server::conn::auto;
use hyper_util::server::graceful::GracefulShutdown;
use hyper_util::service::TowerToHyperService;
use serde_json::{json, Value};
use thiserror::Error;
use tokio::sync::watch;
use tokio::task::JoinSet;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing::instrument::WithSubscriber;
use uuid::Uuid;

use crate::config::ServerConfig;
use crate::lifecycle::shutdown::ShutdownSignal;
use crate::lifecycle::state::{ServerState, ShutdownOutcome};
use crate::net::{ConnectionId, InFlightCalls, Listener, ListenerError};
use crate::observability::Logger;
use crate::rpc::registry::ServiceRegistry;
use crate::rpc::status::{Code, Status};

/// Header carrying the per-call correlation ID.
pub const X_REQUEST_ID: &str = "x-request-id";

#[derive(Debug, Error)]
pub enum ServerError {
    /// The listener could not be bound. The server stays `Created`.
    #[error("failed to start RPC server: {0}")]
    Bind(#[source] ListenerError),

    /// The accept loop failed after a successful bind.
    #[error("RPC serve loop failed: {0}")]
    Serve(#[source] io::Error),

    #[error("RPC server was already started")]
    AlreadyStarted,
}

/// Application state injected into handlers.
#[derive(Clone)]
struct AppState {
    registry: Arc<ServiceRegistry>,
    in_flight: InFlightCalls,
    draining: watch::Receiver<bool>,
}

/// Network server for the registered RPC services.
pub struct RpcServer {
    bind_address: String,
    max_connections: usize,
    shutdown_timeout: Duration,
    request_timeout: Option<Duration>,
    registry: Arc<ServiceRegistry>,
    logger: Logger,
    in_flight: InFlightCalls,
    state: watch::Sender<ServerState>,
    local_addr: OnceLock<SocketAddr>,
    prebound: Mutex<Option<Listener>>,
    started: AtomicBool,
}

impl RpcServer {
    /// Create a server in the `Created` state. Nothing is bound yet.
    pub fn new(config: &ServerConfig, registry: ServiceRegistry, logger: Logger) -> Self {
        let (state, _) = watch::channel(ServerState::Created);
        Self {
            bind_address: config.bind_address(),
            max_connections: config.max_connections,
            shutdown_timeout: config.shutdown_timeout(),
            request_timeout: config.request_timeout(),
            registry: Arc::new(registry),
            logger,
            in_flight: InFlightCalls::new(),
            state,
            local_addr: OnceLock::new(),
            prebound: Mutex::new(None),
            started: AtomicBool::new(false),
        }
    }

    /// Override the graceful shutdown window.
    pub fn with_shutdown_timeout(mut self, timeout: Duration) -> Self {
        self.shutdown_timeout = timeout;
        self
    }

    /// Serve on an already bound listener instead of binding
    /// `host:port` at start.
    pub fn with_listener(self, listener: Listener) -> Self {
        if let Ok(mut slot) = self.prebound.lock() {
            *slot = Some(listener);
        }
        self
    }

    pub fn state(&self) -> ServerState {
        *self.state.borrow()
    }

    /// Receiver that observes every state transition.
    pub fn watch_state(&self) -> watch::Receiver<ServerState> {
        self.state.subscribe()
    }

    /// Address actually bound, once `Listening`.
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.local_addr.get().copied()
    }

    /// Calls currently executing in a handler.
    pub fn in_flight(&self) -> u64 {
        self.in_flight.active_count()
    }

    pub fn shutdown_timeout(&self) -> Duration {
        self.shutdown_timeout
    }

    /// Bind and serve until `shutdown` fires or the serve loop fails.
    ///
    /// Returns how the graceful window ended. A bind failure leaves the
    /// server `Created`; a serve failure leaves it `Failed`.
    pub async fn start(&self, shutdown: ShutdownSignal) -> Result<ShutdownOutcome, ServerError> {
        if self.started.swap(true, Ordering::SeqCst) {
            return Err(ServerError::AlreadyStarted);
        }

        self.run(shutdown)
            .with_subscriber(self.logger.dispatch().clone())
            .await
    }

    async fn run(&self, shutdown: ShutdownSignal) -> Result<ShutdownOutcome, ServerError> {
        let prebound = self.prebound.lock().ok().and_then(|mut slot| slot.take());
        let listener = match prebound {
            Some(listener) => listener,
            None => Listener::bind(&self.bind_address, self.max_connections)
                .await
                .map_err(|e| {
                    tracing::error!(error = %e, "Failed to bind RPC listener");
                    ServerError::Bind(e)
                })?,
        };
        let addr = listener.local_addr().map_err(|source| {
            ServerError::Bind(ListenerError::Bind {
                address: self.bind_address.clone(),
                source,
            })
        })?;
        let _ = self.local_addr.set(addr);

        let (drain_tx, drain_rx) = watch::channel(false);
        let router = build_router(
            AppState {
                registry: Arc::clone(&self.registry),
                in_flight: self.in_flight.clone(),
                draining: drain_rx.clone(),
            },
            self.request_timeout,
        );

        let mut serving = tokio::spawn(serve(listener, router, drain_rx).with_current_subscriber());
        self.transition(ServerState::Listening);
        tracing::info!(
            address = %addr,
            operations = ?self.registry.operations(),
            "RPC server started"
        );

        tokio::select! {
            joined = &mut serving => {
                let error = match joined {
                    Ok(Ok(())) => io::Error::other("accept loop exited without a shutdown request"),
                    Ok(Err(e)) => e,
                    Err(join_error) => io::Error::other(join_error),
                };
                tracing::error!(error = %error, "RPC serve loop failed");
                self.transition(ServerState::Failed);
                Err(ServerError::Serve(error))
            }
            reason = shutdown => {
                self.transition(ServerState::ShuttingDownGraceful);
                tracing::info!(
                    reason = %reason,
                    in_flight = self.in_flight.active_count(),
                    timeout = ?self.shutdown_timeout,
                    "Shutdown requested, draining RPC server"
                );
                drain_tx.send_replace(true);

                let outcome = match tokio::time::timeout(self.shutdown_timeout, &mut serving).await {
                    Ok(joined) => {
                        match joined {
                            Ok(Ok(())) => {}
                            Ok(Err(e)) => tracing::warn!(error = %e, "RPC serve loop errored while draining"),
                            Err(e) => tracing::warn!(error = %e, "RPC serve task ended abnormally while draining"),
                        }
                        tracing::info!("RPC server stopped gracefully");
                        ShutdownOutcome::Graceful
                    }
                    Err(_) => {
                        tracing::warn!(
                            timeout = ?self.shutdown_timeout,
                            in_flight = self.in_flight.active_count(),
                            "Timeout reached, forcing RPC server stop"
                        );
                        serving.abort();
                        let _ = serving.await;
                        ShutdownOutcome::Forced
                    }
                };

                self.transition(ServerState::Stopped);
                Ok(outcome)
            }
        }
    }

    fn transition(&self, next: ServerState) {
        let previous = self.state.send_replace(next);
        tracing::debug!(from = %previous, to = %next, "RPC server state changed");
    }
}

/// Build the Axum router with all middleware layers.
fn build_router(state: AppState, request_timeout: Option<Duration>) -> Router {
    let mut router = Router::new()
        .route("/rpc/{service}/{method}", post(rpc_handler))
        .route("/health", get(health_handler))
        .with_state(state);

    if let Some(timeout) = request_timeout {
        #[allow(deprecated)]
        let layer = TimeoutLayer::new(timeout);
        router = router.layer(layer);
    }

    router
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(TraceLayer::new_for_http())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
}

/// Accept connections until draining starts, then let open connections
/// finish their in-flight calls.
async fn serve(listener: Listener, router: Router, mut drain: watch::Receiver<bool>) -> io::Result<()> {
    let builder = auto::Builder::new(TokioExecutor::new());
    let graceful = GracefulShutdown::new();
    let mut connections = JoinSet::new();

    loop {
        tokio::select! {
            biased;
            _ = drain.wait_for(|draining| *draining) => break,
            Some(_) = connections.join_next(), if !connections.is_empty() => {}
            accepted = listener.accept() => {
                let (stream, peer, permit) = match accepted {
                    Ok(accepted) => accepted,
                    Err(e) if e.is_transient() => {
                        tracing::debug!(error = %e, "Transient accept error");
                        continue;
                    }
                    Err(ListenerError::Accept(e)) => return Err(e),
                    Err(e) => return Err(io::Error::other(e)),
                };

                let id = ConnectionId::new();
                let service = TowerToHyperService::new(router.clone());
                let conn = builder.serve_connection_with_upgrades(TokioIo::new(stream), service);
                let conn = graceful.watch(conn.into_owned());

                connections.spawn(
                    async move {
                        if let Err(e) = conn.await {
                            tracing::debug!(connection_id = %id, peer_addr = %peer, error = %e, "Connection ended with error");
                        }
                        drop(permit);
                    }
                    .with_current_subscriber(),
                );
            }
        }
    }

    drop(listener);
    tracing::debug!(connections = connections.len(), "Listener closed, draining connections");
    graceful.shutdown().await;
    while connections.join_next().await.is_some() {}
    Ok(())
}

/// `POST /rpc/{service}/{method}` with a JSON body.
async fn rpc_handler(
    State(state): State<AppState>,
    Path((service, method)): Path<(String, String)>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    if *state.draining.borrow() {
        return Status::unavailable("server is shutting down").into_response();
    }
    let _call = state.in_flight.track();
    let started = Instant::now();
    let request_id = headers
        .get(X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
        .unwrap_or_else(|| Uuid::new_v4().to_string());

    let result = match decode_payload(&body) {
        Ok(payload) => state.registry.dispatch(&service, &method, payload).await,
        Err(status) => Err(status),
    };
    let elapsed = started.elapsed();

    match result {
        Ok(reply) => {
            tracing::info!(
                request_id = %request_id,
                service = %service,
                method = %method,
                code = "OK",
                elapsed = ?elapsed,
                "RPC call"
            );
            (StatusCode::OK, Json(reply)).into_response()
        }
        Err(status) => {
            if status.code == Code::Internal {
                tracing::error!(
                    request_id = %request_id,
                    service = %service,
                    method = %method,
                    code = status.code.as_str(),
                    message = %status.message,
                    elapsed = ?elapsed,
                    "RPC call failed"
                );
            } else {
                tracing::info!(
                    request_id = %request_id,
                    service = %service,
                    method = %method,
                    code = status.code.as_str(),
                    elapsed = ?elapsed,
                    "RPC call"
                );
            }
            status.into_response()
        }
    }
}

fn decode_payload(body: &Bytes) -> Result<Value, Status> {
    if body.is_empty() {
        return Ok(Value::Null);
    }
    serde_json::from_slice(body).map_err(|e| Status::invalid_argument(format!("invalid JSON payload: {e}")))
}

/// `GET /health`.
async fn health_handler(State(state): State<AppState>) -> Response {
    if *state.draining.borrow() {
        (StatusCode::SERVICE_UNAVAILABLE, Json(json!({ "status": "NOT_SERVING" }))).into_response()
    } else {
        (StatusCode::OK, Json(json!({ "status": "SERVING" }))).into_response()
    }
}
