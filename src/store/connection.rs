//! Pooled Postgres connection bootstrap.

use std::str::FromStr;
use std::time::Duration;

use sqlx::postgres::{PgConnectOptions, PgPool, PgPoolOptions, PgSslMode};
use sqlx::ConnectOptions;
use tracing::instrument::WithSubscriber;

use crate::config::schema::DEFAULT_SSL_MODE;
use crate::config::DatabaseConfig;
use crate::observability::Logger;
use crate::store::schema::{sync_shapes, EntityShape};
use crate::store::trace::QueryTracer;
use crate::store::StoreError;

impl DatabaseConfig {
    /// Configured SSL mode, or `disable` when none was given.
    pub fn effective_ssl_mode(&self) -> &str {
        if self.ssl_mode.trim().is_empty() {
            DEFAULT_SSL_MODE
        } else {
            self.ssl_mode.trim()
        }
    }

    /// libpq key/value connection string with the password redacted.
    pub fn dsn(&self) -> String {
        format!(
            "host={} port={} user={} password=*** dbname={} sslmode={}",
            self.host,
            self.port,
            self.user,
            self.db_name,
            self.effective_ssl_mode()
        )
    }

    /// Driver connection options for this config.
    pub fn connect_options(&self) -> Result<PgConnectOptions, StoreError> {
        let ssl_mode = PgSslMode::from_str(self.effective_ssl_mode()).map_err(StoreError::Config)?;

        Ok(PgConnectOptions::new()
            .host(&self.host)
            .port(self.port)
            .username(&self.user)
            .password(&self.password)
            .database(&self.db_name)
            .ssl_mode(ssl_mode)
            .disable_statement_logging())
    }
}

/// Shared handle to the connection pool plus the query tracer every
/// repository logs through.
#[derive(Debug, Clone)]
pub struct Store {
    pool: PgPool,
    tracer: QueryTracer,
}

impl Store {
    /// Wrap an existing pool. No schema sync is performed.
    pub fn from_pool(pool: PgPool, logger: &Logger) -> Self {
        Self {
            pool,
            tracer: QueryTracer::new(logger.clone()),
        }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    pub fn tracer(&self) -> &QueryTracer {
        &self.tracer
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}

/// Connect to the database and, when shapes are given, synchronize the
/// schema to them. Failure at either step is fatal to startup.
pub async fn connect(
    config: &DatabaseConfig,
    logger: &Logger,
    shapes: &[EntityShape],
) -> Result<Store, StoreError> {
    connect_inner(config, logger, shapes)
        .with_subscriber(logger.dispatch().clone())
        .await
}

async fn connect_inner(
    config: &DatabaseConfig,
    logger: &Logger,
    shapes: &[EntityShape],
) -> Result<Store, StoreError> {
    if config.ssl_mode.trim().is_empty() {
        tracing::warn!(
            ssl_mode = DEFAULT_SSL_MODE,
            "No database ssl_mode configured, connecting without TLS"
        );
    }

    let options = config.connect_options()?;
    tracing::info!(dsn = %config.dsn(), "Connecting to database");

    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .acquire_timeout(Duration::from_secs(config.connect_timeout_secs))
        .connect_with(options)
        .await
        .map_err(StoreError::Connect)?;

    if !shapes.is_empty() {
        sync_shapes(&pool, shapes).await?;
    }

    tracing::info!(
        max_connections = config.max_connections,
        entities = shapes.len(),
        "Database ready"
    );

    Ok(Store::from_pool(pool, logger))
}
