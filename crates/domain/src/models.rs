use crate::capability::Capabilities;
use crate::error::{ForumError, Result};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

pub type UserId = i64;
pub type TopicId = i64;
pub type PostId = i64;
pub type CommentId = i64;
pub type RuleId = i64;
pub type NotificationId = i64;

pub const MAX_COMMENT_LEN: usize = 10_000;
pub const MAX_RULES_PER_TOPIC: i64 = 15;
pub const MAX_RULE_NAME_LEN: usize = 100;
pub const MAX_RULE_DESCRIPTION_LEN: usize = 500;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    pub id: CommentId,
    pub post_id: PostId,
    pub topic_id: TopicId,
    pub parent_id: Option<CommentId>,
    pub content: Option<String>,
    pub author_id: Option<UserId>,
    pub is_deleted: bool,
    pub vote_score: i64,
    pub created_at: NaiveDateTime,
    pub updated_at: Option<NaiveDateTime>,
}

impl Comment {
    pub fn is_redacted(&self) -> bool {
        self.is_deleted
    }

    pub fn is_authored_by(&self, user_id: UserId) -> bool {
        self.author_id == Some(user_id)
    }
}

/// 去掉首尾空白后的评论正文，保证非空且不超长
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommentBody(String);

impl CommentBody {
    pub fn parse(raw: &str) -> Result<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(ForumError::validation("Comment cannot be empty"));
        }
        if trimmed.chars().count() > MAX_COMMENT_LEN {
            return Err(ForumError::validation(format!(
                "Comment is too long (max {} chars)",
                MAX_COMMENT_LEN
            )));
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VoteDirection {
    Up,
    Down,
}

impl VoteDirection {
    pub fn value(self) -> i64 {
        match self {
            Self::Up => 1,
            Self::Down => -1,
        }
    }

    pub fn from_value(value: i64) -> Option<Self> {
        match value {
            1 => Some(Self::Up),
            -1 => Some(Self::Down),
            _ => None,
        }
    }
}

/// 一次投票对账本的实际影响
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum VoteChange {
    Created,
    Removed,
    Flipped,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VoteOutcome {
    pub comment_id: CommentId,
    pub post_id: PostId,
    pub new_score: i64,
    pub user_vote: Option<VoteDirection>,
    pub change: VoteChange,
    #[serde(skip)]
    pub comment_author: Option<UserId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rule {
    pub id: RuleId,
    pub topic_id: TopicId,
    pub name: String,
    pub description: String,
    pub created_at: NaiveDateTime,
}

/// 校验过长度的新规则
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewRule {
    name: String,
    description: String,
}

impl NewRule {
    pub fn new(name: &str, description: &str) -> Result<Self> {
        let name = name.trim();
        let description = description.trim();
        if name.is_empty() || description.is_empty() {
            return Err(ForumError::validation(
                "Rule name and description are required",
            ));
        }
        if name.chars().count() > MAX_RULE_NAME_LEN {
            return Err(ForumError::validation("Rule name is too long"));
        }
        if description.chars().count() > MAX_RULE_DESCRIPTION_LEN {
            return Err(ForumError::validation("Rule description is too long"));
        }
        Ok(Self {
            name: name.to_string(),
            description: description.to_string(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Moderator {
    pub topic_id: TopicId,
    pub user_id: UserId,
    #[serde(flatten)]
    pub capabilities: Capabilities,
}

/// 帖子所在话题等上下文，由话题/帖子协作方提供
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostContext {
    pub post_id: PostId,
    pub topic_id: TopicId,
    pub topic_title: String,
    pub author_id: Option<UserId>,
}

impl PostContext {
    pub fn comments_url(&self) -> String {
        format!("/t/{}/comments/{}", self.topic_title, self.post_id)
    }
}
