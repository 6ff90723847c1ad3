//! SQLite implementation of WhitelistRepository

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

use rankboard::{DomainError, MemberId, WhitelistApplication, WhitelistRepository};

/// SQLite implementation of WhitelistRepository
pub struct SqliteWhitelistRepository {
    pool: SqlitePool,
}

impl SqliteWhitelistRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

/// Internal row type for sqlx mapping
#[derive(sqlx::FromRow)]
struct WhitelistRow {
    user_id: i64,
    name: String,
    game_id: String,
    recruiter_name: String,
    recruiter_id: String,
    submitted_at: DateTime<Utc>,
}

impl From<WhitelistRow> for WhitelistApplication {
    fn from(row: WhitelistRow) -> Self {
        Self {
            user_id: MemberId(row.user_id as u64),
            name: row.name,
            game_id: row.game_id,
            recruiter_name: row.recruiter_name,
            recruiter_id: row.recruiter_id,
            submitted_at: row.submitted_at,
        }
    }
}

#[async_trait]
impl WhitelistRepository for SqliteWhitelistRepository {
    async fn save(&self, app: &WhitelistApplication) -> Result<WhitelistApplication, DomainError> {
        let row = sqlx::query_as::<_, WhitelistRow>(
            r#"
            INSERT INTO whitelist_applications
                (user_id, name, game_id, recruiter_name, recruiter_id, submitted_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT(user_id) DO UPDATE SET
                name = excluded.name,
                game_id = excluded.game_id,
                recruiter_name = excluded.recruiter_name,
                recruiter_id = excluded.recruiter_id,
                submitted_at = excluded.submitted_at
            RETURNING *
            "#,
        )
        .bind(app.user_id.get() as i64)
        .bind(&app.name)
        .bind(&app.game_id)
        .bind(&app.recruiter_name)
        .bind(&app.recruiter_id)
        .bind(app.submitted_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| DomainError::Repository(e.to_string()))?;

        Ok(row.into())
    }

    async fn find_by_user(
        &self,
        user_id: MemberId,
    ) -> Result<Option<WhitelistApplication>, DomainError> {
        let row = sqlx::query_as::<_, WhitelistRow>(
            "SELECT * FROM whitelist_applications WHERE user_id = $1",
        )
        .bind(user_id.get() as i64)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DomainError::Repository(e.to_string()))?;

        Ok(row.map(Into::into))
    }

    async fn count(&self) -> Result<u64, DomainError> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM whitelist_applications")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| DomainError::Repository(e.to_string()))?;

        Ok(count as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::sqlite::memory_pool;

    fn app(user: u64, name: &str) -> WhitelistApplication {
        WhitelistApplication {
            user_id: MemberId(user),
            name: name.into(),
            game_id: "123".into(),
            recruiter_name: "Ana".into(),
            recruiter_id: "9".into(),
            submitted_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_save_and_find() {
        let repo = SqliteWhitelistRepository::new(memory_pool().await);

        let saved = repo.save(&app(1, "Joao")).await.unwrap();
        let found = repo.find_by_user(MemberId(1)).await.unwrap().unwrap();

        assert_eq!(saved.name, "Joao");
        assert_eq!(found.user_id, MemberId(1));
        assert_eq!(found.recruiter_id, "9");
    }

    #[tokio::test]
    async fn test_resubmission_replaces_previous() {
        let repo = SqliteWhitelistRepository::new(memory_pool().await);

        repo.save(&app(1, "Joao")).await.unwrap();
        repo.save(&app(1, "Joao Silva")).await.unwrap();
        repo.save(&app(2, "Maria")).await.unwrap();

        assert_eq!(repo.count().await.unwrap(), 2);
        let found = repo.find_by_user(MemberId(1)).await.unwrap().unwrap();
        assert_eq!(found.name, "Joao Silva");
    }

    #[tokio::test]
    async fn test_large_snowflake_survives() {
        let repo = SqliteWhitelistRepository::new(memory_pool().await);
        let id = 1_234_567_890_123_456_789;

        repo.save(&app(id, "Big")).await.unwrap();

        assert!(repo.find_by_user(MemberId(id)).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_find_missing_is_none() {
        let repo = SqliteWhitelistRepository::new(memory_pool().await);
        assert!(repo.find_by_user(MemberId(7)).await.unwrap().is_none());
    }
}
