//! Auth Service
//!
//! An authentication microservice exposing an RPC interface, backed by
//! Postgres, with layered TOML configuration.
//!
//! # Architecture Overview
//!
//! ```text
//!                              ┌───────────────────────────────────────────────────┐
//!                              │                   AUTH SERVICE                    │
//!                              │                                                   │
//!     RPC call                 │  ┌─────────┐    ┌─────────┐    ┌──────────────┐   │
//!     ─────────────────────────┼─▶│   net   │───▶│   rpc   │───▶│     auth     │   │
//!                              │  │listener │    │ server  │    │   handlers   │   │
//!                              │  └─────────┘    └─────────┘    └──────┬───────┘   │
//!                              │                                       │           │
//!                              │                                       ▼           │
//!                              │                               ┌──────────────┐    │      ┌──────────┐
//!                              │                               │    store     │────┼─────▶│ Postgres │
//!                              │                               │ pool + trace │    │      └──────────┘
//!                              │                               └──────────────┘    │
//!                              │                                                   │
//!                              │  ┌─────────────────────────────────────────────┐  │
//!                              │  │            Cross-Cutting Concerns           │  │
//!                              │  │  ┌─────────┐  ┌──────────────┐  ┌─────────┐ │  │
//!                              │  │  │ config  │  │observability │  │lifecycle│ │  │
//!                              │  │  └─────────┘  └──────────────┘  └─────────┘ │  │
//!                              │  └─────────────────────────────────────────────┘  │
//!                              └───────────────────────────────────────────────────┘
//! ```

// Core subsystems
pub mod config;
pub mod net;
pub mod rpc;
pub mod store;

// Business logic
pub mod auth;

// Cross-cutting concerns
pub mod error;
pub mod lifecycle;
pub mod observability;

pub use error::{Error, Result};
