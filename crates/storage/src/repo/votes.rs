use crate::{models::SqlVote, Db};
use domain::{CommentId, PostId, UserId, VoteChange, VoteDirection, VoteOutcome};
use sqlx::Row;
use std::collections::HashMap;

impl Db {
    /// 投票三种分支 (新建 / 取消 / 反转) 和缓存分数的增量在同一个事务里完成。
    /// 评论不存在或已删除时返回 None。
    pub async fn cast_vote(
        &self,
        user_id: UserId,
        comment_id: CommentId,
        direction: VoteDirection,
    ) -> anyhow::Result<Option<VoteOutcome>> {
        let mut tx = self.pool.begin().await?;

        // 先写一次拿到写锁，避免读后升级锁时 SQLITE_BUSY
        let touched = sqlx::query(
            "UPDATE comments SET vote_score = vote_score WHERE id = ? AND is_deleted = FALSE",
        )
        .bind(comment_id)
        .execute(&mut *tx)
        .await?;
        if touched.rows_affected() == 0 {
            return Ok(None);
        }

        let existing = sqlx::query("SELECT value FROM votes WHERE user_id = ? AND comment_id = ?")
            .bind(user_id)
            .bind(comment_id)
            .fetch_optional(&mut *tx)
            .await?
            .and_then(|r| VoteDirection::from_value(r.get(0)));

        let value = direction.value();
        let (delta, change, user_vote) = match existing {
            None => {
                sqlx::query("INSERT INTO votes (user_id, comment_id, value) VALUES (?, ?, ?)")
                    .bind(user_id)
                    .bind(comment_id)
                    .bind(value)
                    .execute(&mut *tx)
                    .await?;
                (value, VoteChange::Created, Some(direction))
            }
            Some(current) if current == direction => {
                sqlx::query("DELETE FROM votes WHERE user_id = ? AND comment_id = ?")
                    .bind(user_id)
                    .bind(comment_id)
                    .execute(&mut *tx)
                    .await?;
                (-value, VoteChange::Removed, None)
            }
            Some(_) => {
                sqlx::query("UPDATE votes SET value = ? WHERE user_id = ? AND comment_id = ?")
                    .bind(value)
                    .bind(user_id)
                    .bind(comment_id)
                    .execute(&mut *tx)
                    .await?;
                (2 * value, VoteChange::Flipped, Some(direction))
            }
        };

        let row = sqlx::query(
            r#"
            UPDATE comments
            SET vote_score = vote_score + ?
            WHERE id = ?
            RETURNING vote_score, post_id, author_id
            "#,
        )
        .bind(delta)
        .bind(comment_id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(Some(VoteOutcome {
            comment_id,
            post_id: row.get(1),
            new_score: row.get(0),
            user_vote,
            change,
            comment_author: row.get(2),
        }))
    }

    /// 某个用户在整个帖子下的投票，供评论树标注
    pub async fn viewer_votes(
        &self,
        post_id: PostId,
        user_id: UserId,
    ) -> anyhow::Result<HashMap<CommentId, VoteDirection>> {
        let rows = sqlx::query_as::<_, SqlVote>(
            r#"
            SELECT v.comment_id, v.value
            FROM votes v
            JOIN comments c ON c.id = v.comment_id
            WHERE c.post_id = ? AND v.user_id = ?
            "#,
        )
        .bind(post_id)
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .filter_map(|v| v.direction().map(|d| (v.comment_id, d)))
            .collect())
    }
}

#[cfg(any(test, feature = "testing"))]
impl Db {
    pub async fn get_vote(
        &self,
        user_id: UserId,
        comment_id: CommentId,
    ) -> anyhow::Result<Option<VoteDirection>> {
        let row = sqlx::query_as::<_, SqlVote>(
            "SELECT comment_id, value FROM votes WHERE user_id = ? AND comment_id = ?",
        )
        .bind(user_id)
        .bind(comment_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.and_then(|v| v.direction()))
    }

    /// 从投票表重新求和，用来核对缓存的 vote_score
    pub async fn ledger_score(&self, comment_id: CommentId) -> anyhow::Result<i64> {
        let row = sqlx::query("SELECT COALESCE(SUM(value), 0) FROM votes WHERE comment_id = ?")
            .bind(comment_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(row.get(0))
    }

    pub async fn count_votes(&self, user_id: UserId, comment_id: CommentId) -> anyhow::Result<i64> {
        let row = sqlx::query("SELECT COUNT(*) FROM votes WHERE user_id = ? AND comment_id = ?")
            .bind(user_id)
            .bind(comment_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(row.get(0))
    }
}
