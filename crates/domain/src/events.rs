use crate::models::{Comment, CommentId, PostId};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ThreadEvent {
    CommentSaved {
        post_id: PostId,
        comment: Comment,
    },
    CommentRedacted {
        post_id: PostId,
        comment_id: CommentId,
    },
    ScoreChanged {
        post_id: PostId,
        comment_id: CommentId,
        score: i64,
    },
}

impl ThreadEvent {
    pub fn post_id(&self) -> PostId {
        match self {
            Self::CommentSaved { post_id, .. }
            | Self::CommentRedacted { post_id, .. }
            | Self::ScoreChanged { post_id, .. } => *post_id,
        }
    }
}
