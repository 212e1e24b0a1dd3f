//! Registrable set of named RPC operations.
//!
//! Services are registered before the server starts. An operation is
//! addressed as `<service>/<method>`; anything not registered answers
//! `UNIMPLEMENTED`.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

use crate::rpc::status::Status;

/// Reply of a single RPC operation.
pub type RpcResult = Result<Value, Status>;

/// A handler object exposing named operations.
#[async_trait]
pub trait RpcService: Send + Sync + 'static {
    /// Fully qualified service name, e.g. `auth.AuthService`.
    fn name(&self) -> &'static str;

    /// Operations this service answers.
    fn methods(&self) -> &'static [&'static str];

    /// Handle one call. Only invoked for names listed in [`methods`](Self::methods).
    async fn call(&self, method: &str, payload: Value) -> RpcResult;
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("service {0} is already registered")]
    DuplicateService(&'static str),
}

/// Services known to the server, keyed by name.
#[derive(Clone, Default)]
pub struct ServiceRegistry {
    services: BTreeMap<&'static str, Arc<dyn RpcService>>,
}

impl ServiceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<S: RpcService>(&mut self, service: S) -> Result<&mut Self, RegistryError> {
        let name = service.name();
        if self.services.contains_key(name) {
            return Err(RegistryError::DuplicateService(name));
        }
        tracing::debug!(service = name, methods = ?service.methods(), "Registered RPC service");
        self.services.insert(name, Arc::new(service));
        Ok(self)
    }

    pub fn is_empty(&self) -> bool {
        self.services.is_empty()
    }

    /// Every registered `<service>/<method>` pair, sorted by service.
    pub fn operations(&self) -> Vec<String> {
        self.services
            .values()
            .flat_map(|s| s.methods().iter().map(move |m| format!("{}/{}", s.name(), m)))
            .collect()
    }

    /// Route a call to its service.
    pub async fn dispatch(&self, service: &str, method: &str, payload: Value) -> RpcResult {
        let Some(handler) = self.services.get(service) else {
            return Err(Status::unimplemented(format!("unknown service {service}")));
        };
        if !handler.methods().contains(&method) {
            return Err(Status::unimplemented(format!(
                "unknown method {method} for service {service}"
            )));
        }
        handler.call(method, payload).await
    }
}

impl std::fmt::Debug for ServiceRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceRegistry")
            .field("services", &self.services.keys().collect::<Vec<_>>())
            .finish()
    }
}
