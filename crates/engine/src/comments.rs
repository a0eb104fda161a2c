use crate::notifications::reply_content;
use crate::{require_user, Forum};
use domain::{
    Capability, Comment, CommentBody, CommentId, ForumError, NotificationKind, PostContext,
    PostId, Result, ThreadEvent, TopicId, UserId,
};
use serde::Deserialize;
use tracing::info;

/// 删除评论的身份。两种身份效果相同，只是授权方式不同。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(tag = "scope", rename_all = "snake_case")]
pub enum RedactScope {
    /// 作者删除自己的评论
    #[serde(rename = "self")]
    Author,
    /// 版主删除。`claimed_topic` 是调用方声称的话题，必须和评论实际所在话题一致。
    Moderator { claimed_topic: Option<TopicId> },
}

impl Forum {
    pub async fn create_reply(
        &self,
        parent_id: CommentId,
        post_id: PostId,
        actor: Option<UserId>,
        content: &str,
    ) -> Result<Comment> {
        let author_id = require_user(actor)?;
        let body = CommentBody::parse(content)?;

        let parent = self
            .db
            .get_comment(parent_id)
            .await?
            .ok_or_else(|| ForumError::not_found("Comment does not exist"))?;
        if parent.post_id != post_id {
            return Err(ForumError::validation("Comment does not belong to post"));
        }
        let post = self.post_context(post_id).await?;
        let author_name = self.db.get_username(author_id).await?.unwrap_or_default();

        let reply = self
            .db
            .insert_comment(post_id, Some(parent_id), author_id, &body)
            .await?;
        info!("User {} replied {} to comment {}", author_id, reply.id, parent_id);

        // 父评论已删除时 author_id 为空，自然跳过
        self.enqueue_notification(
            parent.author_id,
            author_id,
            NotificationKind::CommentReply,
            reply_content(&author_name, &reply, &post, false),
        );
        self.publish(ThreadEvent::CommentSaved {
            post_id,
            comment: reply.clone(),
        });

        Ok(reply)
    }

    /// 直接回复帖子的顶层评论
    pub async fn create_comment(
        &self,
        post_id: PostId,
        actor: Option<UserId>,
        content: &str,
    ) -> Result<Comment> {
        let author_id = require_user(actor)?;
        let body = CommentBody::parse(content)?;
        let post = self.post_context(post_id).await?;
        let author_name = self.db.get_username(author_id).await?.unwrap_or_default();

        let comment = self.db.insert_comment(post_id, None, author_id, &body).await?;
        info!("User {} commented {} on post {}", author_id, comment.id, post_id);

        self.enqueue_notification(
            post.author_id,
            author_id,
            NotificationKind::PostReply,
            reply_content(&author_name, &comment, &post, true),
        );
        self.publish(ThreadEvent::CommentSaved {
            post_id,
            comment: comment.clone(),
        });

        Ok(comment)
    }

    pub async fn edit_content(
        &self,
        comment_id: CommentId,
        actor: Option<UserId>,
        content: &str,
    ) -> Result<Comment> {
        let user_id = require_user(actor)?;
        let body = CommentBody::parse(content)?;
        let _guard = self.locks.lock(comment_id).await;

        let comment = self.live_comment(comment_id).await?;
        if !comment.is_authored_by(user_id) {
            return Err(ForumError::unauthorized("You can only edit your own comments"));
        }

        if !self.db.update_comment_content(comment_id, user_id, &body).await? {
            // 读取之后被删除了
            return Err(ForumError::not_found("Comment does not exist"));
        }

        let edited = self.live_comment(comment_id).await?;
        self.publish(ThreadEvent::CommentSaved {
            post_id: edited.post_id,
            comment: edited.clone(),
        });
        Ok(edited)
    }

    /// 清空内容和作者并标记删除，行本身保留，子评论仍挂在它下面。
    /// 已删除的评论再删一次原样返回。
    pub async fn redact(
        &self,
        comment_id: CommentId,
        actor: Option<UserId>,
        scope: RedactScope,
    ) -> Result<Comment> {
        let user_id = require_user(actor)?;
        let _guard = self.locks.lock(comment_id).await;

        let comment = self
            .db
            .get_comment(comment_id)
            .await?
            .ok_or_else(|| ForumError::not_found("Comment does not exist"))?;
        if comment.is_redacted() {
            return Ok(comment);
        }

        match scope {
            RedactScope::Author => {
                if !comment.is_authored_by(user_id) {
                    return Err(ForumError::unauthorized(
                        "You can only delete your own comments",
                    ));
                }
            }
            RedactScope::Moderator { claimed_topic } => {
                self.require_capability(
                    comment.topic_id,
                    user_id,
                    Capability::ManagePostsAndComments,
                )
                .await?;
                if claimed_topic.is_some_and(|topic| topic != comment.topic_id) {
                    return Err(ForumError::conflict("Comment does not belong to topic"));
                }
            }
        }

        if self.db.redact_comment(comment_id).await? {
            info!("Comment {} redacted by user {} ({:?})", comment_id, user_id, scope);
            self.publish(ThreadEvent::CommentRedacted {
                post_id: comment.post_id,
                comment_id,
            });
        }

        self.db
            .get_comment(comment_id)
            .await?
            .ok_or_else(|| ForumError::not_found("Comment does not exist"))
    }

    async fn live_comment(&self, comment_id: CommentId) -> Result<Comment> {
        self.db
            .get_comment(comment_id)
            .await?
            .filter(|c| !c.is_redacted())
            .ok_or_else(|| ForumError::not_found("Comment does not exist"))
    }

    pub(crate) async fn post_context(&self, post_id: PostId) -> Result<PostContext> {
        self.db
            .get_post_context(post_id)
            .await?
            .ok_or_else(|| ForumError::not_found("Post does not exist"))
    }
}
