//! Connection identity and in-flight call tracking.
//!
//! # Responsibilities
//! - Generate unique connection IDs for tracing
//! - Count calls currently executing, for shutdown diagnostics

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Global atomic counter for connection IDs.
/// Relaxed: only uniqueness matters.
static CONNECTION_ID_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Unique identifier for a connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(u64);

impl ConnectionId {
    /// Generate a new unique connection ID.
    pub fn new() -> Self {
        Self(CONNECTION_ID_COUNTER.fetch_add(1, Ordering::Relaxed))
    }
}

impl Default for ConnectionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "conn-{}", self.0)
    }
}

/// Counts RPC calls that are currently executing.
#[derive(Debug, Clone, Default)]
pub struct InFlightCalls {
    active: Arc<AtomicU64>,
}

impl InFlightCalls {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a call entering a handler. Returns a guard that decrements on drop,
    /// including when the call is abandoned by a forced stop.
    pub fn track(&self) -> CallGuard {
        self.active.fetch_add(1, Ordering::SeqCst);
        CallGuard {
            active: Arc::clone(&self.active),
        }
    }

    /// Get current in-flight call count.
    pub fn active_count(&self) -> u64 {
        self.active.load(Ordering::SeqCst)
    }
}

/// Guard that tracks a call's lifetime.
#[derive(Debug)]
pub struct CallGuard {
    active: Arc<AtomicU64>,
}

impl Drop for CallGuard {
    fn drop(&mut self) {
        self.active.fetch_sub(1, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn connection_id_unique() {
        let id1 = ConnectionId::new();
        let id2 = ConnectionId::new();
        assert_ne!(id1, id2);
        assert!(id1.to_string().starts_with("conn-"));
    }

    #[test]
    fn in_flight_counts() {
        let calls = InFlightCalls::new();
        assert_eq!(calls.active_count(), 0);

        let guard1 = calls.track();
        assert_eq!(calls.active_count(), 1);

        let guard2 = calls.clone().track();
        assert_eq!(calls.active_count(), 2);

        drop(guard1);
        assert_eq!(calls.active_count(), 1);

        drop(guard2);
        assert_eq!(calls.active_count(), 0);
    }
}
