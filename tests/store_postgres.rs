//! Requires a disposable Postgres database:
//! `DATABASE_URL=postgres://... cargo test -- --ignored`

use auth_service::auth::{PgUserRepository, User, UserRepository};
use auth_service::store::schema::sync_shapes;
use auth_service::store::{Entity, Store};
use sqlx::PgPool;

mod common;

async fn store() -> Store {
    let url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
    let pool = PgPool::connect(&url).await.unwrap();
    sqlx::query("DROP TABLE IF EXISTS users").execute(&pool).await.unwrap();

    let (logger, _logs) = common::test_logger("test");
    Store::from_pool(pool, &logger)
}

#[tokio::test]
#[ignore]
async fn test_schema_sync_is_repeatable() {
    let store = store().await;
    sync_shapes(store.pool(), &[User::SHAPE]).await.unwrap();
    sync_shapes(store.pool(), &[User::SHAPE]).await.unwrap();

    let columns: Vec<(String,)> = sqlx::query_as(
        "SELECT column_name::text FROM information_schema.columns WHERE table_name = 'users' ORDER BY column_name",
    )
    .fetch_all(store.pool())
    .await
    .unwrap();
    let names: Vec<_> = columns.into_iter().map(|(c,)| c).collect();
    assert!(names.contains(&"last_login_at".to_string()));
    assert!(names.contains(&"email".to_string()));
}

#[tokio::test]
#[ignore]
async fn test_repository_round_trip() {
    let store = store().await;
    sync_shapes(store.pool(), &[User::SHAPE]).await.unwrap();
    let repo = PgUserRepository::new(store.clone());

    assert!(repo.find_by_email("a@example.com").await.unwrap().is_none());

    let (id,): (i64,) =
        sqlx::query_as("INSERT INTO users (email, password_hash) VALUES ($1, $2) RETURNING id")
            .bind("a@example.com")
            .bind("hash")
            .fetch_one(store.pool())
            .await
            .unwrap();

    let user = repo.find_by_email("a@example.com").await.unwrap().unwrap();
    assert_eq!(user.id, id);
    assert!(user.last_login_at.is_none());

    repo.record_login(id).await.unwrap();
    let user = repo.find_by_email("a@example.com").await.unwrap().unwrap();
    assert!(user.last_login_at.is_some());

    sqlx::query("UPDATE users SET deleted_at = NOW() WHERE id = $1")
        .bind(id)
        .execute(store.pool())
        .await
        .unwrap();
    assert!(repo.find_by_email("a@example.com").await.unwrap().is_none());

    store.close().await;
}
