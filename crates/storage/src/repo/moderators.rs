use crate::{models::SqlModerator, Db};
use domain::{Capabilities, Moderator, TopicId, UserId};

impl Db {
    pub async fn get_moderator(
        &self,
        topic_id: TopicId,
        user_id: UserId,
    ) -> anyhow::Result<Option<Moderator>> {
        let row = sqlx::query_as::<_, SqlModerator>(
            r#"
            SELECT topic_id, user_id, can_manage_everything, can_manage_posts_and_comments, can_manage_settings
            FROM moderators
            WHERE topic_id = ? AND user_id = ?
            "#,
        )
        .bind(topic_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(Into::into))
    }

    /// 已经是版主时返回 false。`Capabilities` 本身已归一化，
    /// 写入的三个标志位总是一致的。
    pub async fn insert_moderator(
        &self,
        topic_id: TopicId,
        user_id: UserId,
        caps: Capabilities,
    ) -> anyhow::Result<bool> {
        let result = sqlx::query(
            r#"
            INSERT INTO moderators (
                topic_id, user_id,
                can_manage_everything, can_manage_posts_and_comments, can_manage_settings
            )
            VALUES (?, ?, ?, ?, ?)
            ON CONFLICT(topic_id, user_id) DO NOTHING
            "#,
        )
        .bind(topic_id)
        .bind(user_id)
        .bind(caps.can_manage_everything())
        .bind(caps.can_manage_posts_and_comments())
        .bind(caps.can_manage_settings())
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn delete_moderator(&self, topic_id: TopicId, user_id: UserId) -> anyhow::Result<bool> {
        let result = sqlx::query("DELETE FROM moderators WHERE topic_id = ? AND user_id = ?")
            .bind(topic_id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn list_moderators(&self, topic_id: TopicId) -> anyhow::Result<Vec<Moderator>> {
        let rows = sqlx::query_as::<_, SqlModerator>(
            r#"
            SELECT topic_id, user_id, can_manage_everything, can_manage_posts_and_comments, can_manage_settings
            FROM moderators
            WHERE topic_id = ?
            ORDER BY user_id ASC
            "#,
        )
        .bind(topic_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain::Capability;

    #[tokio::test]
    async fn test_stored_flags_are_normalized() {
        let db = Db::in_memory().await.unwrap();
        let topic = db.create_topic("rust").await.unwrap();
        let user = db.create_user("mod").await.unwrap();

        let caps = Capabilities::new(true, false, false);
        assert!(db.insert_moderator(topic, user, caps).await.unwrap());
        assert!(!db.insert_moderator(topic, user, caps).await.unwrap());

        let stored = db.get_moderator(topic, user).await.unwrap().unwrap();
        assert!(stored.capabilities.can_manage_posts_and_comments());
        assert!(stored.capabilities.can_manage_settings());
    }

    #[tokio::test]
    async fn test_schema_rejects_inconsistent_flags() {
        let db = Db::in_memory().await.unwrap();
        let topic = db.create_topic("rust").await.unwrap();
        let user = db.create_user("mod").await.unwrap();

        let raw = sqlx::query(
            "INSERT INTO moderators (topic_id, user_id, can_manage_everything, can_manage_posts_and_comments, can_manage_settings) VALUES (?, ?, TRUE, FALSE, TRUE)",
        )
        .bind(topic)
        .bind(user)
        .execute(&db.pool)
        .await;
        assert!(raw.is_err());
        assert!(db.get_moderator(topic, user).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_remove_moderator() {
        let db = Db::in_memory().await.unwrap();
        let topic = db.create_topic("rust").await.unwrap();
        let user = db.create_user("mod").await.unwrap();
        let caps = Capabilities::from_set(&[Capability::ManageSettings]);
        db.insert_moderator(topic, user, caps).await.unwrap();

        assert_eq!(db.list_moderators(topic).await.unwrap().len(), 1);
        assert!(db.delete_moderator(topic, user).await.unwrap());
        assert!(!db.delete_moderator(topic, user).await.unwrap());
    }
}
