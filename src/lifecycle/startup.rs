//! Startup orchestration.
//!
//! # Responsibilities
//! - Connect the store and synchronize entity shapes
//! - Wire repositories, controllers and RPC handlers
//! - Start the RPC server and block until it stops
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - Subsystems initialize in order, not concurrently
//! - The listener binds last (traffic only when ready)
//! - The store is closed after the server stops, whatever the outcome

use std::sync::Arc;

use crate::auth::{AuthController, AuthHandler, PgUserRepository, User};
use crate::config::AuthServiceConfig;
use crate::error::Result;
use crate::lifecycle::shutdown::ShutdownSignal;
use crate::lifecycle::state::ShutdownOutcome;
use crate::observability::Logger;
use crate::rpc::{RpcServer, ServiceRegistry};
use crate::store::{self, Entity};

/// Run the service until `shutdown` fires.
///
/// Configuration must already be loaded and the logger built.
pub async fn run(
    config: &AuthServiceConfig,
    logger: &Logger,
    shutdown: ShutdownSignal,
) -> Result<ShutdownOutcome> {
    if config.jwt.secret_key.is_empty() {
        logger.in_scope(|| tracing::warn!("No jwt.secret_key configured"));
    }

    let store = store::connect(&config.database, logger, &[User::SHAPE]).await?;

    let users = Arc::new(PgUserRepository::new(store.clone()));
    let controller = AuthController::new(users);

    let mut registry = ServiceRegistry::new();
    registry.register(AuthHandler::new(controller, logger.clone()))?;

    let server = RpcServer::new(&config.server, registry, logger.clone());
    let result = server.start(shutdown).await;

    store.close().await;
    match &result {
        Ok(outcome) => logger.in_scope(|| tracing::info!(outcome = ?outcome, "Shutdown complete")),
        Err(e) => logger.in_scope(|| tracing::error!(error = %e, "RPC server exited with error")),
    }

    Ok(result?)
}
