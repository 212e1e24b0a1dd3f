//! User authentication.
//!
//! # Data Flow
//! ```text
//! POST /rpc/auth.AuthService/Login
//!     → handlers.rs (AuthHandler, registered RPC service)
//!     → controller.rs (AuthController)
//!     → repository.rs (UserRepository over the shared Store)
//! ```

pub mod controller;
pub mod entities;
pub mod handlers;
pub mod repository;

pub use controller::AuthController;
pub use entities::User;
pub use handlers::{AuthHandler, SERVICE_NAME};
pub use repository::{PgUserRepository, UserRepository};
