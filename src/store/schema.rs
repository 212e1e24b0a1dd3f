//! Entity shapes and additive schema synchronization.
//!
//! A shape lists a table and its columns. Syncing creates what is missing
//! (table, columns, indexes) and never drops or alters existing structure.

use sqlx::PgPool;

use crate::store::StoreError;

/// A persisted column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Column {
    pub name: &'static str,
    pub sql_type: &'static str,
    pub nullable: bool,
    pub default: Option<&'static str>,
    pub index: Index,
}

/// Index kind attached to a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Index {
    None,
    Plain,
    Unique,
}

impl Column {
    pub const fn new(name: &'static str, sql_type: &'static str) -> Self {
        Self {
            name,
            sql_type,
            nullable: true,
            default: None,
            index: Index::None,
        }
    }

    pub const fn not_null(mut self) -> Self {
        self.nullable = false;
        self
    }

    pub const fn default_value(mut self, expr: &'static str) -> Self {
        self.default = Some(expr);
        self
    }

    pub const fn indexed(mut self) -> Self {
        self.index = Index::Plain;
        self
    }

    pub const fn unique(mut self) -> Self {
        self.index = Index::Unique;
        self
    }

    fn definition(&self) -> String {
        let mut def = format!("\"{}\" {}", self.name, self.sql_type);
        if !self.nullable {
            def.push_str(" NOT NULL");
        }
        if let Some(expr) = self.default {
            def.push_str(" DEFAULT ");
            def.push_str(expr);
        }
        def
    }
}

/// Structural description of a persisted entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntityShape {
    pub table: &'static str,
    /// `BIGSERIAL` primary key column.
    pub primary_key: &'static str,
    pub columns: &'static [Column],
}

/// Types that persist through an [`EntityShape`].
pub trait Entity {
    const SHAPE: EntityShape;
}

impl EntityShape {
    /// DDL that brings the backing table up to this shape. Every statement is
    /// idempotent.
    pub fn sync_statements(&self) -> Vec<String> {
        let table = self.table;
        let mut statements = vec![format!(
            "CREATE TABLE IF NOT EXISTS \"{table}\" (\"{}\" BIGSERIAL PRIMARY KEY)",
            self.primary_key
        )];

        for column in self.columns {
            statements.push(format!(
                "ALTER TABLE \"{table}\" ADD COLUMN IF NOT EXISTS {}",
                column.definition()
            ));
        }

        for column in self.columns {
            let name = column.name;
            match column.index {
                Index::None => {}
                Index::Plain => statements.push(format!(
                    "CREATE INDEX IF NOT EXISTS \"idx_{table}_{name}\" ON \"{table}\" (\"{name}\")"
                )),
                Index::Unique => statements.push(format!(
                    "CREATE UNIQUE INDEX IF NOT EXISTS \"idx_{table}_{name}\" ON \"{table}\" (\"{name}\")"
                )),
            }
        }

        statements
    }
}

/// Apply every shape in one transaction. Any failure rolls the whole sync back.
pub async fn sync_shapes(pool: &PgPool, shapes: &[EntityShape]) -> Result<(), StoreError> {
    let mut tx = pool.begin().await.map_err(|source| StoreError::Migration {
        table: shapes.first().map(|s| s.table).unwrap_or_default(),
        source,
    })?;

    for shape in shapes {
        for statement in shape.sync_statements() {
            tracing::debug!(table = shape.table, sql = %statement, "Applying schema statement");
            sqlx::query(&statement)
                .execute(&mut *tx)
                .await
                .map_err(|source| StoreError::Migration {
                    table: shape.table,
                    source,
                })?;
        }
        tracing::info!(table = shape.table, "Schema synchronized");
    }

    tx.commit().await.map_err(|source| StoreError::Migration {
        table: shapes.last().map(|s| s.table).unwrap_or_default(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const WIDGETS: EntityShape = EntityShape {
        table: "widgets",
        primary_key: "id",
        columns: &[
            Column::new("name", "TEXT").not_null().unique(),
            Column::new("kind", "TEXT").indexed(),
            Column::new("created_at", "TIMESTAMPTZ").not_null().default_value("NOW()"),
        ],
    };

    #[test]
    fn table_is_created_first() {
        let statements = WIDGETS.sync_statements();
        assert_eq!(
            statements[0],
            "CREATE TABLE IF NOT EXISTS \"widgets\" (\"id\" BIGSERIAL PRIMARY KEY)"
        );
    }

    #[test]
    fn columns_are_added_idempotently() {
        let statements = WIDGETS.sync_statements();
        assert!(statements.contains(
            &"ALTER TABLE \"widgets\" ADD COLUMN IF NOT EXISTS \"name\" TEXT NOT NULL".to_string()
        ));
        assert!(statements.contains(
            &"ALTER TABLE \"widgets\" ADD COLUMN IF NOT EXISTS \"created_at\" TIMESTAMPTZ NOT NULL DEFAULT NOW()"
                .to_string()
        ));
    }

    #[test]
    fn indexes_follow_columns() {
        let statements = WIDGETS.sync_statements();
        assert_eq!(statements.len(), 1 + 3 + 2);
        assert!(statements[4].starts_with("CREATE UNIQUE INDEX IF NOT EXISTS \"idx_widgets_name\""));
        assert!(statements[5].starts_with("CREATE INDEX IF NOT EXISTS \"idx_widgets_kind\""));
    }

    #[test]
    fn sync_never_drops() {
        for statement in WIDGETS.sync_statements() {
            assert!(!statement.contains("DROP"));
        }
    }

    #[tokio::test]
    async fn unreachable_database_is_a_migration_error() {
        use std::time::Duration;

        use sqlx::postgres::{PgConnectOptions, PgPoolOptions};

        let options = PgConnectOptions::new()
            .host("127.0.0.1")
            .port(1)
            .username("auth")
            .database("auth");
        let pool = PgPoolOptions::new()
            .acquire_timeout(Duration::from_millis(500))
            .connect_lazy_with(options);

        let err = sync_shapes(&pool, &[WIDGETS]).await.unwrap_err();
        assert!(
            matches!(err, StoreError::Migration { table: "widgets", .. }),
            "got {err}"
        );
    }
}
