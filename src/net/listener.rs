//! TCP listener implementation with backpressure.
//!
//! # Responsibilities
//! - Bind to the configured address
//! - Accept incoming TCP connections
//! - Enforce max_connections limit via semaphore
//! - Separate transient accept errors from fatal ones
//! - Let another task close the listener, failing pending accepts

use std::io;
use std::net::SocketAddr;
use std::sync::Arc;

use thiserror::Error;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{watch, OwnedSemaphorePermit, Semaphore};

/// Error type for listener operations.
#[derive(Debug, Error)]
pub enum ListenerError {
    /// Failed to bind to address.
    #[error("failed to bind {address}: {source}")]
    Bind {
        address: String,
        #[source]
        source: io::Error,
    },

    /// Failed to accept connection.
    #[error("failed to accept: {0}")]
    Accept(#[source] io::Error),

    /// The listener was closed through its [`ListenerCloser`].
    #[error("listener closed")]
    Closed,
}

impl ListenerError {
    /// Accept errors caused by a single misbehaving peer. The listener itself
    /// is still usable after these.
    pub fn is_transient(&self) -> bool {
        match self {
            ListenerError::Accept(e) => matches!(
                e.kind(),
                io::ErrorKind::ConnectionRefused
                    | io::ErrorKind::ConnectionAborted
                    | io::ErrorKind::ConnectionReset
                    | io::ErrorKind::Interrupted
            ),
            ListenerError::Bind { .. } | ListenerError::Closed => false,
        }
    }
}

/// A bounded TCP listener that limits concurrent connections.
///
/// Uses a semaphore to enforce `max_connections`. When the limit is reached,
/// new connections will wait until a slot becomes available.
pub struct Listener {
    /// The underlying TCP listener.
    inner: TcpListener,
    /// Semaphore to limit concurrent connections.
    connection_limit: Arc<Semaphore>,
    closed: Arc<watch::Sender<bool>>,
}

impl Listener {
    /// Bind to `address` with connection limits.
    pub async fn bind(address: &str, max_connections: usize) -> Result<Self, ListenerError> {
        let bind_error = |source: io::Error| ListenerError::Bind {
            address: address.to_string(),
            source,
        };

        let listener = TcpListener::bind(address).await.map_err(bind_error)?;
        let local_addr = listener.local_addr().map_err(bind_error)?;

        tracing::info!(
            address = %local_addr,
            max_connections,
            "Listener bound"
        );

        Ok(Self {
            inner: listener,
            connection_limit: Arc::new(Semaphore::new(max_connections)),
            closed: Arc::new(watch::channel(false).0),
        })
    }

    /// Accept a new connection, respecting the connection limit.
    ///
    /// This will wait if the connection limit has been reached.
    /// Returns the stream and a permit that must be held for the connection's lifetime.
    /// Fails with [`ListenerError::Closed`] once the listener is closed, even
    /// while waiting.
    pub async fn accept(&self) -> Result<(TcpStream, SocketAddr, ConnectionPermit), ListenerError> {
        let mut closed = self.closed.subscribe();
        tokio::select! {
            biased;
            _ = closed.wait_for(|closed| *closed) => Err(ListenerError::Closed),
            accepted = self.admit() => accepted,
        }
    }

    async fn admit(&self) -> Result<(TcpStream, SocketAddr, ConnectionPermit), ListenerError> {
        // Acquire permit first (backpressure).
        let permit = self
            .connection_limit
            .clone()
            .acquire_owned()
            .await
            .map_err(|e| ListenerError::Accept(io::Error::other(e)))?;

        let (stream, addr) = self.inner.accept().await.map_err(ListenerError::Accept)?;

        tracing::debug!(
            peer_addr = %addr,
            available_permits = self.connection_limit.available_permits(),
            "Connection accepted"
        );

        Ok((stream, addr, ConnectionPermit { _permit: permit }))
    }

    /// Get the local address this listener is bound to.
    pub fn local_addr(&self) -> Result<SocketAddr, io::Error> {
        self.inner.local_addr()
    }

    /// Handle that closes this listener from another task.
    pub fn closer(&self) -> ListenerCloser {
        ListenerCloser {
            closed: Arc::clone(&self.closed),
        }
    }

    /// Get current available connection slots.
    pub fn available_permits(&self) -> usize {
        self.connection_limit.available_permits()
    }
}

/// Closes a [`Listener`]. Closing is permanent.
#[derive(Debug, Clone)]
pub struct ListenerCloser {
    closed: Arc<watch::Sender<bool>>,
}

impl ListenerCloser {
    pub fn close(&self) {
        self.closed.send_replace(true);
    }
}

/// A permit representing a connection slot.
///
/// When dropped, the connection slot is released back to the pool, even if
/// the connection task is aborted.
#[derive(Debug)]
pub struct ConnectionPermit {
    _permit: OwnedSemaphorePermit,
}
