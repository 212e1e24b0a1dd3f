//! Relational store subsystem.
//!
//! # Data Flow
//! ```text
//! DatabaseConfig
//!     → connection.rs (PgConnectOptions, pooled connect)
//!     → schema.rs (additive sync of entity shapes, one transaction)
//!     → Store (pool + QueryTracer), shared by all request handlers
//!
//! Repository query
//!     → trace.rs (time, classify, log through the injected Logger)
//! ```
//!
//! # Design Decisions
//! - Connect is eager: a bad DSN fails at startup, not on first request
//! - Schema sync is additive only and treated as fatal on failure
//! - "No rows" is an expected outcome and never logged as an error

pub mod connection;
pub mod schema;
pub mod trace;

use thiserror::Error;

pub use connection::{connect, Store};
pub use schema::{Column, Entity, EntityShape, Index};
pub use trace::{QueryTracer, SLOW_QUERY_THRESHOLD};

/// Errors from the store bootstrap and repositories.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Database settings could not be turned into connection options.
    #[error("invalid database configuration: {0}")]
    Config(#[source] sqlx::Error),

    #[error("failed to connect to database: {0}")]
    Connect(#[source] sqlx::Error),

    #[error("failed to run migrations for table {table}: {source}")]
    Migration {
        table: &'static str,
        #[source]
        source: sqlx::Error,
    },

    #[error("query failed: {0}")]
    Query(#[from] sqlx::Error),
}
