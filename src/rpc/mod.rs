//! RPC subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (hyper connection, Axum router, request ID, tracing)
//!     → POST /rpc/<service>/<method> (JSON payload)
//!     → registry.rs (find service, check method, call handler)
//!     → JSON reply, or status.rs error reply { code, message }
//! ```

pub mod registry;
pub mod server;
pub mod status;

pub use registry::{RegistryError, RpcResult, RpcService, ServiceRegistry};
pub use server::{RpcServer, ServerError, X_REQUEST_ID};
pub use status::{Code, Status};
