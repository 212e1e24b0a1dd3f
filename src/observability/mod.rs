//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → logging.rs (structured log events through the injected Logger)
//!
//! Consumers:
//!     → stdout (JSON in production, human-readable elsewhere)
//! ```
//!
//! # Design Decisions
//! - Structured logging (JSON) for machine parsing
//! - Request ID flows through every RPC call's log lines
//! - One logger per process, constructed before anything that logs

pub mod logging;

pub use logging::{FlushGuard, LogFormat, Logger, LoggingError};
