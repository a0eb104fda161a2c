use crate::Db;
use chrono::Utc;
use domain::{PostContext, PostId, TopicId, UserId};
use sqlx::Row;

impl Db {
    pub async fn create_post(
        &self,
        topic_id: TopicId,
        author_id: UserId,
        title: &str,
    ) -> anyhow::Result<PostId> {
        let now = Utc::now().naive_utc();
        let id = sqlx::query(
            "INSERT INTO posts (topic_id, author_id, title, created_at) VALUES (?, ?, ?, ?)",
        )
        .bind(topic_id)
        .bind(author_id)
        .bind(title)
        .bind(now)
        .execute(&self.pool)
        .await?
        .last_insert_rowid();
        Ok(id)
    }

    /// 删除帖子时评论、投票随外键级联删除
    pub async fn delete_post(&self, post_id: PostId) -> anyhow::Result<bool> {
        let result = sqlx::query("DELETE FROM posts WHERE id = ?")
            .bind(post_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn get_post_context(&self, post_id: PostId) -> anyhow::Result<Option<PostContext>> {
        let row = sqlx::query(
            r#"
            SELECT p.id, p.topic_id, t.title, p.author_id
            FROM posts p
            JOIN topics t ON t.id = p.topic_id
            WHERE p.id = ?
            "#,
        )
        .bind(post_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| PostContext {
            post_id: r.get(0),
            topic_id: r.get(1),
            topic_title: r.get(2),
            author_id: r.get(3),
        }))
    }
}
