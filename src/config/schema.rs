//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the auth
//! service. All types derive Serde traits for deserialization from the merged
//! config documents; absent keys fall back to `Default` and required values
//! are checked afterwards in `validation.rs`.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// SSL modes understood by libpq-compatible servers.
pub const SSL_MODES: &[&str] = &[
    "disable",
    "allow",
    "prefer",
    "require",
    "verify-ca",
    "verify-full",
];

/// SSL mode used when none is configured.
pub const DEFAULT_SSL_MODE: &str = "disable";

/// Root configuration for the auth service.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct AuthServiceConfig {
    /// RPC listener settings.
    pub server: ServerConfig,

    /// Token signing settings.
    pub jwt: JwtConfig,

    /// Log settings.
    #[serde(rename = "logging")]
    pub log: LogConfig,

    /// Relational store settings.
    pub database: DatabaseConfig,
}

/// RPC listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Interface to bind.
    pub host: String,

    /// Port to bind. Required.
    pub port: u16,

    /// Maximum concurrent connections (backpressure).
    pub max_connections: usize,

    /// Graceful shutdown window in seconds before in-flight calls are abandoned.
    pub shutdown_timeout_secs: u64,

    /// Per-call timeout in seconds. Zero disables it.
    pub request_timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 0,
            max_connections: 10_000,
            shutdown_timeout_secs: 10,
            request_timeout_secs: 0,
        }
    }
}

impl ServerConfig {
    /// `host:port` string handed to the listener.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn shutdown_timeout(&self) -> Duration {
        Duration::from_secs(self.shutdown_timeout_secs)
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        (self.request_timeout_secs > 0).then(|| Duration::from_secs(self.request_timeout_secs))
    }
}

/// Token signing configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct JwtConfig {
    pub secret_key: String,
}

/// Log configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct LogConfig {
    /// Log level (trace, debug, info, warn, error). Empty picks the
    /// environment default.
    pub level: String,
}

/// Relational store configuration.
#[derive(Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub db_name: String,

    /// libpq SSL mode. Empty means `disable`.
    pub ssl_mode: String,

    /// Pool size.
    pub max_connections: u32,

    /// Time allowed to establish a pooled connection, in seconds.
    pub connect_timeout_secs: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            host: String::new(),
            port: 5432,
            user: String::new(),
            password: String::new(),
            db_name: String::new(),
            ssl_mode: String::new(),
            max_connections: 10,
            connect_timeout_secs: 5,
        }
    }
}

impl std::fmt::Debug for DatabaseConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DatabaseConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .field("db_name", &self.db_name)
            .field("ssl_mode", &self.ssl_mode)
            .field("max_connections", &self.max_connections)
            .field("connect_timeout_secs", &self.connect_timeout_secs)
            .finish()
    }
}
