//! Structured logging.
//!
//! # Responsibilities
//! - Build the process logger from service name, environment and level
//! - Hand an explicit `Logger` to every component that logs
//! - Flush buffered output once at exit
//!
//! # Design Decisions
//! - Uses tracing crate for structured logging
//! - JSON format for production, human-readable format elsewhere
//! - Components route events through the injected logger's dispatcher, so a
//!   logger that was never built cannot be used by accident

use std::io::{self, Write};
use std::sync::{Arc, OnceLock};

use thiserror::Error;
use tracing::{Dispatch, Level};
use tracing_subscriber::fmt::writer::{BoxMakeWriter, MakeWriter};

use crate::config::env::is_production;

static INSTALLED: OnceLock<Logger> = OnceLock::new();

/// Errors raised by the logger lifecycle.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum LoggingError {
    #[error("logger: init must be called before use")]
    NotInitialized,

    #[error("logger: already initialized")]
    AlreadyInitialized,
}

/// Output encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// One JSON object per line.
    Json,
    /// Human-readable lines.
    Pretty,
}

impl LogFormat {
    pub fn for_environment(environment: &str) -> Self {
        if is_production(environment) {
            LogFormat::Json
        } else {
            LogFormat::Pretty
        }
    }
}

/// Pick the effective level: an explicit level that parses wins, otherwise
/// debug outside production and info in production.
pub fn resolve_level(explicit: &str, environment: &str) -> Level {
    let explicit = explicit.trim();
    if !explicit.is_empty() {
        if let Ok(level) = explicit.to_ascii_lowercase().parse::<Level>() {
            return level;
        }
    }

    if is_production(environment) {
        Level::INFO
    } else {
        Level::DEBUG
    }
}

struct Inner {
    service: String,
    environment: String,
    level: Level,
    format: LogFormat,
    dispatch: Dispatch,
}

/// Handle to a constructed logger. Cheap to clone and safe to share
/// across tasks.
#[derive(Clone)]
pub struct Logger {
    inner: Arc<Inner>,
}

impl std::fmt::Debug for Logger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Logger")
            .field("service", &self.inner.service)
            .field("environment", &self.inner.environment)
            .field("level", &self.inner.level)
            .field("format", &self.inner.format)
            .finish()
    }
}

impl Logger {
    /// Start building a logger that is not yet installed process-wide.
    pub fn builder(service: impl Into<String>, environment: impl Into<String>) -> LoggerBuilder {
        LoggerBuilder {
            service: service.into(),
            environment: environment.into(),
            level: String::new(),
            writer: BoxMakeWriter::new(io::stdout),
        }
    }

    /// Build the stdout logger and install it as the process default.
    ///
    /// Returns the handle to pass to components and the guard that flushes
    /// output at exit.
    pub fn init(
        service: &str,
        environment: &str,
        level: &str,
    ) -> Result<(Logger, FlushGuard), LoggingError> {
        let logger = Logger::builder(service, environment).level(level).build();
        logger.install()?;
        Ok((logger, FlushGuard { flushed: false }))
    }

    /// The logger installed by [`Logger::init`].
    pub fn current() -> Result<Logger, LoggingError> {
        INSTALLED.get().cloned().ok_or(LoggingError::NotInitialized)
    }

    fn install(&self) -> Result<(), LoggingError> {
        if INSTALLED.get().is_some() {
            return Err(LoggingError::AlreadyInitialized);
        }
        tracing::dispatcher::set_global_default(self.inner.dispatch.clone())
            .map_err(|_| LoggingError::AlreadyInitialized)?;
        INSTALLED
            .set(self.clone())
            .map_err(|_| LoggingError::AlreadyInitialized)
    }

    pub fn service(&self) -> &str {
        &self.inner.service
    }

    pub fn environment(&self) -> &str {
        &self.inner.environment
    }

    pub fn level(&self) -> Level {
        self.inner.level
    }

    pub fn format(&self) -> LogFormat {
        self.inner.format
    }

    /// Dispatcher to attach to spawned futures.
    pub fn dispatch(&self) -> &Dispatch {
        &self.inner.dispatch
    }

    /// Run `f` with this logger as the active dispatcher.
    pub fn in_scope<T>(&self, f: impl FnOnce() -> T) -> T {
        tracing::dispatcher::with_default(&self.inner.dispatch, f)
    }

    /// Span carrying the `service` and `env` fields, for instrumenting the
    /// top-level task.
    pub fn root_span(&self) -> tracing::Span {
        self.in_scope(|| {
            tracing::info_span!(
                "service",
                service = %self.inner.service,
                env = %self.inner.environment,
            )
        })
    }
}

/// Builder for [`Logger`].
pub struct LoggerBuilder {
    service: String,
    environment: String,
    level: String,
    writer: BoxMakeWriter,
}

impl LoggerBuilder {
    /// Explicit level string. Empty or unparsable picks the environment default.
    pub fn level(mut self, level: impl Into<String>) -> Self {
        self.level = level.into();
        self
    }

    /// Send output somewhere other than stdout.
    pub fn writer<W>(mut self, writer: W) -> Self
    where
        W: for<'a> MakeWriter<'a> + Send + Sync + 'static,
    {
        self.writer = BoxMakeWriter::new(writer);
        self
    }

    pub fn build(self) -> Logger {
        let level = resolve_level(&self.level, &self.environment);
        let format = LogFormat::for_environment(&self.environment);

        let dispatch = match format {
            LogFormat::Json => Dispatch::new(
                tracing_subscriber::fmt()
                    .json()
                    .flatten_event(true)
                    .with_current_span(true)
                    .with_span_list(false)
                    .with_max_level(level)
                    .with_writer(self.writer)
                    .finish(),
            ),
            LogFormat::Pretty => Dispatch::new(
                tracing_subscriber::fmt()
                    .with_max_level(level)
                    .with_target(true)
                    .with_writer(self.writer)
                    .finish(),
            ),
        };

        Logger {
            inner: Arc::new(Inner {
                service: self.service,
                environment: self.environment,
                level,
                format,
                dispatch,
            }),
        }
    }
}

/// Flushes log output when consumed or dropped. Hold it for the lifetime of
/// `main`.
#[derive(Debug)]
#[must_use = "dropping the guard flushes immediately"]
pub struct FlushGuard {
    flushed: bool,
}

impl FlushGuard {
    /// Flush now. Consumes the guard so it runs exactly once.
    pub fn flush(mut self) {
        self.flush_inner();
    }

    fn flush_inner(&mut self) {
        if !self.flushed {
            self.flushed = true;
            let _ = io::stdout().flush();
        }
    }
}

impl Drop for FlushGuard {
    fn drop(&mut self) {
        self.flush_inner();
    }
}
