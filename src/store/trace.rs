//! Query tracing routed through the service logger.
//!
//! Every repository query is timed and logged once:
//! - failed queries at error level, except "no rows", which is an expected
//!   outcome and never logged as an error
//! - queries at or above the slow threshold as a slow-query warning
//! - everything else at debug

use std::future::Future;
use std::time::{Duration, Instant};

use crate::observability::Logger;

/// Queries taking at least this long are reported as slow.
pub const SLOW_QUERY_THRESHOLD: Duration = Duration::from_millis(200);

/// How a finished query is reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryOutcome {
    Fast,
    Slow,
    Failed,
}

/// Classify a finished query. A zero threshold disables slow reporting.
pub fn classify(elapsed: Duration, threshold: Duration, error: Option<&sqlx::Error>) -> QueryOutcome {
    match error {
        Some(sqlx::Error::RowNotFound) | None => {}
        Some(_) => return QueryOutcome::Failed,
    }

    if !threshold.is_zero() && elapsed >= threshold {
        QueryOutcome::Slow
    } else {
        QueryOutcome::Fast
    }
}

/// Times queries and logs them through the injected logger.
#[derive(Debug, Clone)]
pub struct QueryTracer {
    logger: Logger,
    slow_threshold: Duration,
}

impl QueryTracer {
    pub fn new(logger: Logger) -> Self {
        Self {
            logger,
            slow_threshold: SLOW_QUERY_THRESHOLD,
        }
    }

    pub fn with_slow_threshold(mut self, threshold: Duration) -> Self {
        self.slow_threshold = threshold;
        self
    }

    /// Await `query`, then log it. `rows` counts the rows in a successful
    /// result.
    pub async fn trace<T, F, R>(&self, sql: &'static str, rows: R, query: F) -> Result<T, sqlx::Error>
    where
        F: Future<Output = Result<T, sqlx::Error>>,
        R: FnOnce(&T) -> u64,
    {
        let started = Instant::now();
        let result = query.await;
        let elapsed = started.elapsed();

        let rows = result.as_ref().map(rows).unwrap_or(0);
        self.logger
            .in_scope(|| self.record(sql, rows, elapsed, result.as_ref().err()));

        result
    }

    fn record(&self, sql: &str, rows: u64, elapsed: Duration, error: Option<&sqlx::Error>) {
        match (classify(elapsed, self.slow_threshold, error), error) {
            (QueryOutcome::Failed, Some(err)) => {
                tracing::error!(sql, rows, elapsed = ?elapsed, error = %err, "query failed");
            }
            (QueryOutcome::Slow, _) => {
                tracing::warn!(sql, rows, elapsed = ?elapsed, "slow query");
            }
            _ => {
                tracing::debug!(sql, rows, elapsed = ?elapsed, "query");
            }
        }
    }
}
