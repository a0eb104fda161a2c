use crate::Db;
use chrono::Utc;
use domain::UserId;
use sqlx::Row;

impl Db {
    // 账号由认证协作方创建，这里只负责落库
    pub async fn create_user(&self, username: &str) -> anyhow::Result<UserId> {
        let now = Utc::now().naive_utc();
        let id = sqlx::query("INSERT INTO users (username, created_at) VALUES (?, ?)")
            .bind(username)
            .bind(now)
            .execute(&self.pool)
            .await?
            .last_insert_rowid();
        Ok(id)
    }

    pub async fn get_username(&self, user_id: UserId) -> anyhow::Result<Option<String>> {
        let row = sqlx::query("SELECT username FROM users WHERE id = ?")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(|r| r.get(0)))
    }
}
