//! Data access for users.

use async_trait::async_trait;
use sqlx::postgres::PgQueryResult;

use crate::auth::entities::User;
use crate::store::{Store, StoreError};

/// Read/update contract the auth logic depends on.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Look up a live (not soft-deleted) user by email. `Ok(None)` when absent.
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;

    /// Stamp the user's last login time.
    async fn record_login(&self, user_id: i64) -> Result<(), StoreError>;
}

const FIND_BY_EMAIL: &str = "SELECT id, created_at, updated_at, deleted_at, email, password_hash, last_login_at \
     FROM users WHERE email = $1 AND deleted_at IS NULL ORDER BY id LIMIT 1";

const RECORD_LOGIN: &str = "UPDATE users SET last_login_at = NOW(), updated_at = NOW() \
     WHERE id = $1 AND deleted_at IS NULL";

/// Postgres-backed [`UserRepository`].
#[derive(Debug, Clone)]
pub struct PgUserRepository {
    store: Store,
}

impl PgUserRepository {
    pub fn new(store: Store) -> Self {
        Self { store }
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let query = sqlx::query_as::<_, User>(FIND_BY_EMAIL)
            .bind(email)
            .fetch_one(self.store.pool());

        match self.store.tracer().trace(FIND_BY_EMAIL, |_: &User| 1, query).await {
            Ok(user) => Ok(Some(user)),
            Err(sqlx::Error::RowNotFound) => Ok(None),
            Err(e) => Err(StoreError::Query(e)),
        }
    }

    async fn record_login(&self, user_id: i64) -> Result<(), StoreError> {
        let query = sqlx::query(RECORD_LOGIN)
            .bind(user_id)
            .execute(self.store.pool());

        self.store
            .tracer()
            .trace(RECORD_LOGIN, |done: &PgQueryResult| done.rows_affected(), query)
            .await?;
        Ok(())
    }
}
