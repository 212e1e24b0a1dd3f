//! Typed client for the auth service RPC surface.

mod client;

pub use client::{ClientError, RpcClient};
