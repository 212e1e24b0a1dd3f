//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::io;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};
use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tracing_subscriber::fmt::MakeWriter;

use auth_service::config::ServerConfig;
use auth_service::lifecycle::{ServerState, ShutdownOutcome, ShutdownTrigger};
use auth_service::observability::Logger;
use auth_service::rpc::{RpcResult, RpcServer, RpcService, ServerError, ServiceRegistry, Status};

/// Service whose `Sleep` call takes a fixed time and whose `Hang` call never
/// completes.
pub struct SlowService {
    pub delay: Duration,
    pub entered: Arc<Notify>,
}

impl SlowService {
    pub fn new(delay: Duration) -> (Self, Arc<Notify>) {
        let entered = Arc::new(Notify::new());
        (
            Self {
                delay,
                entered: entered.clone(),
            },
            entered,
        )
    }
}

#[async_trait]
impl RpcService for SlowService {
    fn name(&self) -> &'static str {
        "test.Slow"
    }

    fn methods(&self) -> &'static [&'static str] {
        &["Sleep", "Hang"]
    }

    async fn call(&self, method: &str, _payload: Value) -> RpcResult {
        self.entered.notify_one();
        match method {
            "Sleep" => {
                tokio::time::sleep(self.delay).await;
                Ok(json!({ "slept_ms": self.delay.as_millis() as u64 }))
            }
            "Hang" => std::future::pending().await,
            other => Err(Status::unimplemented(other.to_string())),
        }
    }
}

/// A logger writing into memory, never installed globally.
pub fn test_logger(environment: &str) -> (Logger, CapturedLogs) {
    let logs = CapturedLogs::default();
    let logger = Logger::builder("auth-service", environment)
        .level("debug")
        .writer(logs.clone())
        .build();
    (logger, logs)
}

/// Loopback server config on an ephemeral port.
pub fn loopback_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".into(),
        port: 0,
        ..ServerConfig::default()
    }
}

pub struct RunningServer {
    pub server: Arc<RpcServer>,
    pub trigger: ShutdownTrigger,
    pub handle: JoinHandle<Result<ShutdownOutcome, ServerError>>,
    pub base_url: String,
    pub logs: CapturedLogs,
}

impl RunningServer {
    /// Trigger shutdown and wait for `start` to return.
    pub async fn stop(self) -> Result<ShutdownOutcome, ServerError> {
        self.trigger.trigger();
        self.handle.await.unwrap()
    }
}

/// Start `registry` on loopback and wait until it is listening.
pub async fn start_server(registry: ServiceRegistry, shutdown_timeout: Duration) -> RunningServer {
    let (logger, logs) = test_logger("test");
    let server = Arc::new(
        RpcServer::new(&loopback_config(), registry, logger).with_shutdown_timeout(shutdown_timeout),
    );
    let trigger = ShutdownTrigger::new();

    let mut state = server.watch_state();
    let handle = {
        let server = server.clone();
        let signal = trigger.signal();
        tokio::spawn(async move { server.start(signal).await })
    };

    let reached = tokio::time::timeout(
        Duration::from_secs(5),
        state.wait_for(|s| *s != ServerState::Created),
    )
    .await
    .expect("server did not start in time")
    .map(|s| *s)
    .unwrap();
    assert_eq!(reached, ServerState::Listening);

    let addr = server.local_addr().expect("listening server has an address");
    RunningServer {
        server,
        trigger,
        handle,
        base_url: format!("http://{addr}"),
        logs,
    }
}

/// In-memory log sink shareable across threads.
#[derive(Clone, Default)]
pub struct CapturedLogs {
    buf: Arc<Mutex<Vec<u8>>>,
}

impl CapturedLogs {
    pub fn contents(&self) -> String {
        String::from_utf8(self.buf.lock().unwrap().clone()).unwrap()
    }

    pub fn lines(&self) -> Vec<String> {
        self.contents().lines().map(str::to_string).collect()
    }
}

pub struct CapturedWriter {
    buf: Arc<Mutex<Vec<u8>>>,
}

impl io::Write for CapturedWriter {
    fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        self.buf.lock().unwrap().extend_from_slice(data);
        Ok(data.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for CapturedLogs {
    type Writer = CapturedWriter;

    fn make_writer(&'a self) -> Self::Writer {
        CapturedWriter {
            buf: self.buf.clone(),
        }
    }
}
