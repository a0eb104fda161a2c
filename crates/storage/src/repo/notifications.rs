use crate::{models::SqlNotification, Db};
use chrono::Utc;
use domain::{Notification, NotificationContent, NotificationKind, UserId};

const SELECT_NOTIFICATION: &str = r#"
    SELECT
        n.id, n.recipient_id, n.sender_id, nt.type_name,
        n.title, n.body, n.url, n.comment_id, n.post_id,
        n.read_at, n.sent_at
    FROM notifications n
    JOIN notification_types nt ON nt.id = n.notification_type_id
"#;

impl Db {
    /// 新账号默认开启所有类型的通知
    pub async fn seed_default_settings(&self, user_id: UserId) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            INSERT OR IGNORE INTO notification_settings (user_id, notification_type_id, enabled)
            SELECT ?, id, TRUE FROM notification_types
            "#,
        )
        .bind(user_id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn set_notification_setting(
        &self,
        user_id: UserId,
        kind: NotificationKind,
        enabled: bool,
    ) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            INSERT INTO notification_settings (user_id, notification_type_id, enabled)
            SELECT ?, id, ? FROM notification_types WHERE type_name = ?
            ON CONFLICT(user_id, notification_type_id) DO UPDATE SET enabled = excluded.enabled
            "#,
        )
        .bind(user_id)
        .bind(enabled)
        .bind(kind.as_str())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// 设置检查和写入放在一条语句里：接收方关闭了该类型时什么都不写，返回 None。
    pub async fn insert_notification_if_enabled(
        &self,
        recipient_id: UserId,
        sender_id: UserId,
        kind: NotificationKind,
        content: &NotificationContent,
    ) -> anyhow::Result<Option<Notification>> {
        let now = Utc::now().naive_utc();
        let result = sqlx::query(
            r#"
            INSERT INTO notifications (
                recipient_id, sender_id, notification_type_id,
                title, body, url, comment_id, post_id, read_at, sent_at
            )
            SELECT ?, ?, nt.id, ?, ?, ?, ?, ?, NULL, ?
            FROM notification_types nt
            JOIN notification_settings s
                ON s.notification_type_id = nt.id AND s.user_id = ? AND s.enabled = TRUE
            WHERE nt.type_name = ?
            "#,
        )
        .bind(recipient_id)
        .bind(sender_id)
        .bind(&content.title)
        .bind(&content.body)
        .bind(&content.url)
        .bind(content.comment_id)
        .bind(content.post_id)
        .bind(now)
        .bind(recipient_id)
        .bind(kind.as_str())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }

        Ok(Some(Notification {
            id: result.last_insert_rowid(),
            recipient_id,
            sender_id,
            kind,
            title: content.title.clone(),
            body: content.body.clone(),
            url: content.url.clone(),
            comment_id: content.comment_id,
            post_id: content.post_id,
            read_at: None,
            sent_at: now,
        }))
    }

    pub async fn list_notifications(&self, recipient_id: UserId) -> anyhow::Result<Vec<Notification>> {
        let rows = sqlx::query_as::<_, SqlNotification>(&format!(
            "{} WHERE n.recipient_id = ? ORDER BY n.sent_at DESC, n.id DESC",
            SELECT_NOTIFICATION
        ))
        .bind(recipient_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }
}

#[cfg(any(test, feature = "testing"))]
impl Db {
    /// 没有设置行视为关闭
    pub async fn notification_enabled(
        &self,
        user_id: UserId,
        kind: NotificationKind,
    ) -> anyhow::Result<bool> {
        let enabled: Option<bool> = sqlx::query_scalar(
            r#"
            SELECT s.enabled
            FROM notification_settings s
            JOIN notification_types nt ON nt.id = s.notification_type_id
            WHERE s.user_id = ? AND nt.type_name = ?
            "#,
        )
        .bind(user_id)
        .bind(kind.as_str())
        .fetch_optional(&self.pool)
        .await?;
        Ok(enabled.unwrap_or(false))
    }

    pub async fn count_notifications(&self) -> anyhow::Result<i64> {
        let count = sqlx::query_scalar("SELECT COUNT(*) FROM notifications")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}
