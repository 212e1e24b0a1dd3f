//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! --env / --config flags, ENV / CONFIG_PATH, defaults
//!     → env.rs (ResolvedEnvironment)
//!     → loader.rs (base.toml + <env>.toml, deep merge, decode)
//!     → validation.rs (required fields, ranges)
//!     → AuthServiceConfig (validated, immutable)
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded
//! - All fields have defaults so partial documents decode
//! - Validation separates syntactic (serde) from semantic checks

pub mod env;
pub mod loader;
pub mod schema;
pub mod validation;

pub use env::{EnvArgs, ResolvedEnvironment};
pub use loader::{load_config, ConfigError};
pub use schema::{AuthServiceConfig, DatabaseConfig, JwtConfig, LogConfig, ServerConfig};
pub use validation::{Validate, ValidationError};
