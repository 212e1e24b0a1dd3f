//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Resolve env → Load config → Init logger → Connect store → Register services → Serve
//!
//! Shutdown (shutdown.rs, rpc/server.rs):
//!     Signal or cancellation → Stop accepting → Drain in-flight calls (bounded) → Stopped
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → Trigger graceful shutdown
//! ```
//!
//! # Design Decisions
//! - Ordered startup: config first, then logger, store, listener
//! - Fail fast: any startup error is fatal
//! - Shutdown has timeout: forced stop after deadline

pub mod shutdown;
pub mod signals;
pub mod startup;
pub mod state;

pub use shutdown::{ShutdownReason, ShutdownSignal, ShutdownTrigger};
pub use state::{ServerState, ShutdownOutcome};
