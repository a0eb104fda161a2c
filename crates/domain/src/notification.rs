use crate::error::ForumError;
use crate::models::{CommentId, NotificationId, PostId, UserId};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    CommentReply,
    CommentVote,
    PostReply,
    PostVote,
}

impl NotificationKind {
    pub const ALL: [NotificationKind; 4] = [
        NotificationKind::CommentReply,
        NotificationKind::CommentVote,
        NotificationKind::PostReply,
        NotificationKind::PostVote,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CommentReply => "comment_reply",
            Self::CommentVote => "comment_vote",
            Self::PostReply => "post_reply",
            Self::PostVote => "post_vote",
        }
    }
}

impl fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NotificationKind {
    type Err = ForumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| {
                ForumError::Configuration(format!("Notification type '{}' does not exist", s))
            })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationContent {
    pub title: String,
    pub body: String,
    pub url: String,
    pub comment_id: Option<CommentId>,
    pub post_id: Option<PostId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub id: NotificationId,
    pub recipient_id: UserId,
    pub sender_id: UserId,
    pub kind: NotificationKind,
    pub title: String,
    pub body: String,
    pub url: String,
    pub comment_id: Option<CommentId>,
    pub post_id: Option<PostId>,
    pub read_at: Option<NaiveDateTime>,
    pub sent_at: NaiveDateTime,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_known_kinds() {
        for kind in NotificationKind::ALL {
            assert_eq!(kind.as_str().parse::<NotificationKind>().unwrap(), kind);
        }
    }

    #[test]
    fn test_unknown_kind_is_configuration_error() {
        let err = "mention".parse::<NotificationKind>().unwrap_err();
        assert!(matches!(err, ForumError::Configuration(_)));
    }
}
