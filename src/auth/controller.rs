//! Authentication operations over the user repository.
//!
//! Login, token issuance and password verification are not implemented yet;
//! the controller only owns its collaborators.

use std::sync::Arc;

use crate::auth::repository::UserRepository;

#[derive(Clone)]
pub struct AuthController {
    users: Arc<dyn UserRepository>,
}

impl AuthController {
    pub fn new(users: Arc<dyn UserRepository>) -> Self {
        Self { users }
    }

    pub fn users(&self) -> &dyn UserRepository {
        self.users.as_ref()
    }
}
