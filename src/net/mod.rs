//! Network layer subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming TCP connection
//!     → listener.rs (accept loop, connection limits)
//!     → connection.rs (connection IDs, in-flight call tracking)
//!     → Hand off to the RPC layer
//! ```
//!
//! # Design Decisions
//! - Bounded accept queue prevents resource exhaustion
//! - Connection slots are released on drop, so aborted tasks cannot leak them

pub mod connection;
pub mod listener;

pub use connection::{CallGuard, ConnectionId, InFlightCalls};
pub use listener::{ConnectionPermit, Listener, ListenerCloser, ListenerError};
