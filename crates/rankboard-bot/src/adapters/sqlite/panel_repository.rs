//! SQLite implementation of PanelRepository

use async_trait::async_trait;
use sqlx::SqlitePool;

use rankboard::{ChannelId, DomainError, MessageId, PanelRepository};

/// SQLite implementation of PanelRepository
pub struct SqlitePanelRepository {
    pool: SqlitePool,
}

impl SqlitePanelRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PanelRepository for SqlitePanelRepository {
    async fn find(&self, channel: ChannelId, kind: &str) -> Result<Option<MessageId>, DomainError> {
        let id = sqlx::query_scalar::<_, i64>(
            "SELECT message_id FROM panel_messages WHERE channel_id = $1 AND kind = $2",
        )
        .bind(channel.get() as i64)
        .bind(kind)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DomainError::Repository(e.to_string()))?;

        Ok(id.map(|id| MessageId(id as u64)))
    }

    async fn save(
        &self,
        channel: ChannelId,
        kind: &str,
        message: MessageId,
    ) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            INSERT INTO panel_messages (channel_id, kind, message_id, updated_at)
            VALUES ($1, $2, $3, CURRENT_TIMESTAMP)
            ON CONFLICT(channel_id, kind) DO UPDATE SET
                message_id = excluded.message_id,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(channel.get() as i64)
        .bind(kind)
        .bind(message.get() as i64)
        .execute(&self.pool)
        .await
        .map_err(|e| DomainError::Repository(e.to_string()))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::sqlite::memory_pool;

    #[tokio::test]
    async fn test_save_replaces_per_channel() {
        let repo = SqlitePanelRepository::new(memory_pool().await);

        repo.save(ChannelId(1), "hierarchy", MessageId(10)).await.unwrap();
        repo.save(ChannelId(1), "hierarchy", MessageId(11)).await.unwrap();
        repo.save(ChannelId(2), "hierarchy", MessageId(20)).await.unwrap();

        assert_eq!(
            repo.find(ChannelId(1), "hierarchy").await.unwrap(),
            Some(MessageId(11))
        );
        assert_eq!(
            repo.find(ChannelId(2), "hierarchy").await.unwrap(),
            Some(MessageId(20))
        );
    }

    #[tokio::test]
    async fn test_kinds_in_one_channel_are_separate() {
        let repo = SqlitePanelRepository::new(memory_pool().await);

        repo.save(ChannelId(1), "hierarchy", MessageId(10)).await.unwrap();
        repo.save(ChannelId(1), "status", MessageId(30)).await.unwrap();

        assert_eq!(
            repo.find(ChannelId(1), "hierarchy").await.unwrap(),
            Some(MessageId(10))
        );
        assert_eq!(
            repo.find(ChannelId(1), "status").await.unwrap(),
            Some(MessageId(30))
        );
    }

    #[tokio::test]
    async fn test_unknown_channel_is_none() {
        let repo = SqlitePanelRepository::new(memory_pool().await);
        assert_eq!(repo.find(ChannelId(3), "status").await.unwrap(), None);
    }
}
