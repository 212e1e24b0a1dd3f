//! Query tracer output as seen in production logs.

use std::time::Duration;

use serde_json::Value;

use auth_service::store::QueryTracer;

mod common;

use common::{test_logger, CapturedLogs};

fn records(logs: &CapturedLogs) -> Vec<Value> {
    logs.lines()
        .iter()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect()
}

fn at_level<'a>(records: &'a [Value], level: &str) -> Vec<&'a Value> {
    records.iter().filter(|r| r["level"] == level).collect()
}

#[tokio::test]
async fn test_no_rows_is_not_logged_as_error() {
    let (logger, logs) = test_logger("production");
    let tracer = QueryTracer::new(logger);

    let result = tracer
        .trace("SELECT * FROM users WHERE email = $1", |_: &i64| 1, async {
            Err::<i64, _>(sqlx::Error::RowNotFound)
        })
        .await;
    assert!(matches!(result, Err(sqlx::Error::RowNotFound)));

    let records = records(&logs);
    assert!(at_level(&records, "ERROR").is_empty(), "{records:?}");
    let debug = at_level(&records, "DEBUG");
    assert_eq!(debug.len(), 1);
    assert_eq!(debug[0]["message"], "query");
}

#[tokio::test]
async fn test_slow_query_is_warned() {
    let (logger, logs) = test_logger("production");
    let tracer = QueryTracer::new(logger);

    let rows = tracer
        .trace("SELECT pg_sleep(0.2)", |n: &u64| *n, async {
            tokio::time::sleep(Duration::from_millis(220)).await;
            Ok::<_, sqlx::Error>(3u64)
        })
        .await
        .unwrap();
    assert_eq!(rows, 3);

    let records = records(&logs);
    let warn = at_level(&records, "WARN");
    assert_eq!(warn.len(), 1, "{records:?}");
    assert_eq!(warn[0]["message"], "slow query");
    assert_eq!(warn[0]["sql"], "SELECT pg_sleep(0.2)");
    assert_eq!(warn[0]["rows"], 3);
}

#[tokio::test]
async fn test_failed_query_is_logged_once_as_error() {
    let (logger, logs) = test_logger("production");
    let tracer = QueryTracer::new(logger);

    let result = tracer
        .trace("UPDATE users SET last_login_at = NOW()", |_: &u64| 0, async {
            Err::<u64, _>(sqlx::Error::PoolTimedOut)
        })
        .await;
    assert!(result.is_err());

    let records = records(&logs);
    assert_eq!(records.len(), 1, "{records:?}");
    assert_eq!(records[0]["level"], "ERROR");
    assert_eq!(records[0]["message"], "query failed");
    assert_eq!(records[0]["sql"], "UPDATE users SET last_login_at = NOW()");
}
