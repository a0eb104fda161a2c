use crate::{
    models::{SqlComment, SELECT_COMMENT},
    Db,
};
use chrono::Utc;
use domain::thread::ThreadComment;
use domain::{Comment, CommentBody, CommentId, PostId, UserId};

impl Db {
    pub async fn insert_comment(
        &self,
        post_id: PostId,
        parent_id: Option<CommentId>,
        author_id: UserId,
        body: &CommentBody,
    ) -> anyhow::Result<Comment> {
        let now = Utc::now().naive_utc();
        let id = sqlx::query(
            r#"
            INSERT INTO comments (post_id, parent_id, author_id, content, is_deleted, vote_score, created_at)
            VALUES (?, ?, ?, ?, FALSE, 0, ?)
            "#,
        )
        .bind(post_id)
        .bind(parent_id)
        .bind(author_id)
        .bind(body.as_str())
        .bind(now)
        .execute(&self.pool)
        .await?
        .last_insert_rowid();

        self.get_comment(id)
            .await?
            .ok_or_else(|| anyhow::anyhow!("comment {} vanished after insert", id))
    }

    pub async fn get_comment(&self, comment_id: CommentId) -> anyhow::Result<Option<Comment>> {
        let row = sqlx::query_as::<_, SqlComment>(&format!("{} WHERE c.id = ?", SELECT_COMMENT))
            .bind(comment_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(Into::into))
    }

    /// 只有作者本人、且评论未被删除时才会更新。返回是否命中。
    pub async fn update_comment_content(
        &self,
        comment_id: CommentId,
        author_id: UserId,
        body: &CommentBody,
    ) -> anyhow::Result<bool> {
        let now = Utc::now().naive_utc();
        let result = sqlx::query(
            r#"
            UPDATE comments
            SET content = ?, updated_at = ?
            WHERE id = ? AND author_id = ? AND is_deleted = FALSE
            "#,
        )
        .bind(body.as_str())
        .bind(now)
        .bind(comment_id)
        .bind(author_id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// 软删除：保留行以维持评论树结构，内容和作者一次性清空。
    /// 已删除的评论不会再被命中。
    pub async fn redact_comment(&self, comment_id: CommentId) -> anyhow::Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE comments
            SET content = NULL, author_id = NULL, is_deleted = TRUE
            WHERE id = ? AND is_deleted = FALSE
            "#,
        )
        .bind(comment_id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn list_thread(&self, post_id: PostId) -> anyhow::Result<Vec<ThreadComment>> {
        let rows = sqlx::query_as::<_, SqlComment>(&format!(
            "{} WHERE c.post_id = ? ORDER BY c.created_at ASC, c.id ASC",
            SELECT_COMMENT
        ))
        .bind(post_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }
}
