use chrono::NaiveDateTime;
use domain::thread::ThreadComment;
use domain::{
    Capabilities, Comment, Moderator, Notification, NotificationKind, Rule, VoteDirection,
};
use sqlx::FromRow;

pub(crate) const SELECT_COMMENT: &str = r#"
    SELECT
        c.id,
        c.post_id,
        p.topic_id,
        c.parent_id,
        c.content,
        c.author_id,
        c.is_deleted,
        c.vote_score,
        c.created_at,
        c.updated_at,
        u.username AS author_name
    FROM comments c
    JOIN posts p ON p.id = c.post_id
    LEFT JOIN users u ON u.id = c.author_id
"#;

#[derive(FromRow)]
pub struct SqlComment {
    pub id: i64,
    pub post_id: i64,
    pub topic_id: i64,
    pub parent_id: Option<i64>,
    pub content: Option<String>,
    pub author_id: Option<i64>,
    pub is_deleted: bool,
    pub vote_score: i64,
    pub created_at: NaiveDateTime,
    pub updated_at: Option<NaiveDateTime>,

    // Join 字段 (来自 users 表)
    pub author_name: Option<String>,
}

impl From<SqlComment> for ThreadComment {
    fn from(sql: SqlComment) -> Self {
        ThreadComment {
            comment: Comment {
                id: sql.id,
                post_id: sql.post_id,
                topic_id: sql.topic_id,
                parent_id: sql.parent_id,
                content: sql.content,
                author_id: sql.author_id,
                is_deleted: sql.is_deleted,
                vote_score: sql.vote_score,
                created_at: sql.created_at,
                updated_at: sql.updated_at,
            },
            author_name: sql.author_name,
        }
    }
}

impl From<SqlComment> for Comment {
    fn from(sql: SqlComment) -> Self {
        ThreadComment::from(sql).comment
    }
}

#[derive(FromRow)]
pub struct SqlVote {
    pub comment_id: i64,
    pub value: i64,
}

impl SqlVote {
    pub fn direction(&self) -> Option<VoteDirection> {
        VoteDirection::from_value(self.value)
    }
}

#[derive(FromRow)]
pub struct SqlModerator {
    pub topic_id: i64,
    pub user_id: i64,
    pub can_manage_everything: bool,
    pub can_manage_posts_and_comments: bool,
    pub can_manage_settings: bool,
}

impl From<SqlModerator> for Moderator {
    fn from(sql: SqlModerator) -> Self {
        Moderator {
            topic_id: sql.topic_id,
            user_id: sql.user_id,
            capabilities: Capabilities::new(
                sql.can_manage_everything,
                sql.can_manage_posts_and_comments,
                sql.can_manage_settings,
            ),
        }
    }
}

#[derive(FromRow)]
pub struct SqlRule {
    pub id: i64,
    pub topic_id: i64,
    pub name: String,
    pub description: String,
    pub created_at: NaiveDateTime,
}

impl From<SqlRule> for Rule {
    fn from(sql: SqlRule) -> Self {
        Rule {
            id: sql.id,
            topic_id: sql.topic_id,
            name: sql.name,
            description: sql.description,
            created_at: sql.created_at,
        }
    }
}

#[derive(FromRow)]
pub struct SqlNotification {
    pub id: i64,
    pub recipient_id: i64,
    pub sender_id: i64,
    pub type_name: String,
    pub title: String,
    pub body: String,
    pub url: String,
    pub comment_id: Option<i64>,
    pub post_id: Option<i64>,
    pub read_at: Option<NaiveDateTime>,
    pub sent_at: NaiveDateTime,
}

impl TryFrom<SqlNotification> for Notification {
    type Error = anyhow::Error;

    fn try_from(sql: SqlNotification) -> anyhow::Result<Self> {
        let kind: NotificationKind = sql
            .type_name
            .parse()
            .map_err(|e| anyhow::anyhow!("corrupt notification row {}: {}", sql.id, e))?;
        Ok(Notification {
            id: sql.id,
            recipient_id: sql.recipient_id,
            sender_id: sql.sender_id,
            kind,
            title: sql.title,
            body: sql.body,
            url: sql.url,
            comment_id: sql.comment_id,
            post_id: sql.post_id,
            read_at: sql.read_at,
            sent_at: sql.sent_at,
        })
    }
}
