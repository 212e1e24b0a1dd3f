//! Persisted auth entities.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;

use crate::store::{Column, Entity, EntityShape};

/// A user of the authentication system.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize)]
pub struct User {
    pub id: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Soft-delete marker. Deleted users are invisible to lookups.
    pub deleted_at: Option<DateTime<Utc>>,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub last_login_at: Option<DateTime<Utc>>,
}

impl Entity for User {
    const SHAPE: EntityShape = EntityShape {
        table: "users",
        primary_key: "id",
        columns: &[
            Column::new("created_at", "TIMESTAMPTZ")
                .not_null()
                .default_value("NOW()"),
            Column::new("updated_at", "TIMESTAMPTZ")
                .not_null()
                .default_value("NOW()"),
            Column::new("deleted_at", "TIMESTAMPTZ").indexed(),
            Column::new("email", "TEXT").not_null().unique(),
            Column::new("password_hash", "TEXT").not_null(),
            Column::new("last_login_at", "TIMESTAMPTZ"),
        ],
    };
}
