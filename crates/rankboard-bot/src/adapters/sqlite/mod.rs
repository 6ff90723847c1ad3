//! SQLite Repository Implementations

mod panel_repository;
mod whitelist_repository;

pub use panel_repository::SqlitePanelRepository;
pub use whitelist_repository::SqliteWhitelistRepository;

use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};

/// Open the pool and bring the schema up to date
pub async fn connect(url: &str) -> anyhow::Result<SqlitePool> {
    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect(url)
        .await?;

    sqlx::migrate!().run(&pool).await?;

    Ok(pool)
}

/// Single-connection in-memory database with migrations applied
#[cfg(test)]
pub(crate) async fn memory_pool() -> SqlitePool {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .unwrap();
    sqlx::migrate!().run(&pool).await.unwrap();
    pool
}
