use crate::notifications::upvote_content;
use crate::{require_user, Forum};
use domain::{
    CommentId, ForumError, NotificationKind, Result, ThreadEvent, UserId, VoteDirection,
    VoteOutcome,
};
use tracing::info;

impl Forum {
    /// 同方向再投一次即取消；反方向则翻转。
    /// 只有投出 (或翻转成) 赞成票时才通知评论作者。
    pub async fn cast_vote(
        &self,
        actor: Option<UserId>,
        comment_id: CommentId,
        direction: VoteDirection,
    ) -> Result<VoteOutcome> {
        let user_id = require_user(actor)?;
        let _guard = self.locks.lock(comment_id).await;

        // 通知需要的上下文在写入前取好，提交后只剩入队
        let comment = self
            .db
            .get_comment(comment_id)
            .await?
            .filter(|c| !c.is_redacted())
            .ok_or_else(|| ForumError::not_found("Comment does not exist"))?;
        let post = self
            .db
            .get_post_context(comment.post_id)
            .await?
            .ok_or_else(|| ForumError::not_found("Post does not exist"))?;
        let voter_name = self.db.get_username(user_id).await?.unwrap_or_default();

        let outcome = self
            .db
            .cast_vote(user_id, comment_id, direction)
            .await?
            .ok_or_else(|| ForumError::not_found("Comment does not exist"))?;

        info!(
            "User {} vote on comment {}: {:?} -> score {}",
            user_id, comment_id, outcome.change, outcome.new_score
        );

        if outcome.user_vote == Some(VoteDirection::Up) {
            self.enqueue_notification(
                outcome.comment_author,
                user_id,
                NotificationKind::CommentVote,
                upvote_content(&voter_name, &comment, &post),
            );
        }

        self.publish(ThreadEvent::ScoreChanged {
            post_id: outcome.post_id,
            comment_id,
            score: outcome.new_score,
        });

        Ok(outcome)
    }
}
