//! RPC surface of the auth service.

use async_trait::async_trait;
use serde_json::Value;
use tracing::instrument::WithSubscriber;

use crate::auth::controller::AuthController;
use crate::observability::Logger;
use crate::rpc::{RpcResult, RpcService, Status};

pub const SERVICE_NAME: &str = "auth.AuthService";

const METHODS: &[&str] = &["Login"];

/// Handler registered as `auth.AuthService`.
pub struct AuthHandler {
    controller: AuthController,
    logger: Logger,
}

impl AuthHandler {
    pub fn new(controller: AuthController, logger: Logger) -> Self {
        Self { controller, logger }
    }

    pub fn controller(&self) -> &AuthController {
        &self.controller
    }

    async fn login(&self, _payload: Value) -> RpcResult {
        tracing::info!("Login request received");
        Err(Status::unimplemented("method Login not implemented"))
    }
}

#[async_trait]
impl RpcService for AuthHandler {
    fn name(&self) -> &'static str {
        SERVICE_NAME
    }

    fn methods(&self) -> &'static [&'static str] {
        METHODS
    }

    async fn call(&self, method: &str, payload: Value) -> RpcResult {
        let dispatch = self.logger.dispatch().clone();
        match method {
            "Login" => self.login(payload).with_subscriber(dispatch).await,
            other => Err(Status::unimplemented(format!("method {other} not implemented"))),
        }
    }
}
