//! Server lifecycle states.
//!
//! ```text
//! Created ──bind ok──▶ Listening ──shutdown──▶ ShuttingDownGraceful ──▶ Stopped
//!    │                     │
//!    └─ bind error         └─ accept loop error ──▶ Failed
//!       (stays Created)
//! ```
//!
//! `Stopped` and `Failed` are terminal. A server never restarts.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServerState {
    Created,
    Listening,
    ShuttingDownGraceful,
    Stopped,
    Failed,
}

impl ServerState {
    pub fn is_terminal(self) -> bool {
        matches!(self, ServerState::Stopped | ServerState::Failed)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ServerState::Created => "created",
            ServerState::Listening => "listening",
            ServerState::ShuttingDownGraceful => "shutting_down_graceful",
            ServerState::Stopped => "stopped",
            ServerState::Failed => "failed",
        }
    }
}

impl fmt::Display for ServerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How the graceful window ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownOutcome {
    /// Every in-flight call finished inside the window.
    Graceful,
    /// The window elapsed and remaining calls were abandoned.
    Forced,
}
