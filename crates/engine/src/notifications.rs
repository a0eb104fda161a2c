use crate::Forum;
use domain::{
    Comment, FanoutRequest, Notification, NotificationContent, NotificationKind, PostContext,
    Result, UserId,
};
use tracing::debug;

const SNIPPET_LEN: usize = 140;

fn snippet(content: Option<&str>) -> String {
    let content = content.unwrap_or_default();
    let mut out: String = content.chars().take(SNIPPET_LEN).collect();
    if content.chars().count() > SNIPPET_LEN {
        out.push('…');
    }
    out
}

impl Forum {
    /// 直接创建一条通知。未知类型返回 `Configuration`，接收方关闭时返回 `Ok(None)`。
    pub async fn notify(
        &self,
        recipient_id: UserId,
        sender_id: UserId,
        kind: &str,
        content: NotificationContent,
    ) -> Result<Option<Notification>> {
        fanout::notify(&self.db, recipient_id, sender_id, kind, content).await
    }

    /// 提交后调用，给自己发的通知直接跳过
    pub(crate) fn enqueue_notification(
        &self,
        recipient_id: Option<UserId>,
        sender_id: UserId,
        kind: NotificationKind,
        content: NotificationContent,
    ) {
        let Some(recipient_id) = recipient_id else {
            debug!("Skipping {} notification: recipient is anonymous", kind);
            return;
        };
        if recipient_id == sender_id {
            return;
        }
        self.fanout.enqueue(FanoutRequest {
            recipient_id,
            sender_id,
            kind,
            content,
        });
    }
}

pub(crate) fn reply_content(
    sender_name: &str,
    reply: &Comment,
    post: &PostContext,
    to_post: bool,
) -> NotificationContent {
    let title = if to_post {
        format!("{} commented on your post", sender_name)
    } else {
        format!("{} replied to your comment", sender_name)
    };
    NotificationContent {
        title,
        body: snippet(reply.content.as_deref()),
        url: post.comments_url(),
        comment_id: Some(reply.id),
        post_id: Some(post.post_id),
    }
}

pub(crate) fn upvote_content(
    sender_name: &str,
    comment: &Comment,
    post: &PostContext,
) -> NotificationContent {
    NotificationContent {
        title: format!("{} upvoted your comment", sender_name),
        body: snippet(comment.content.as_deref()),
        url: post.comments_url(),
        comment_id: Some(comment.id),
        post_id: Some(post.post_id),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::Harness;
    use domain::ForumError;

    #[test]
    fn test_snippet_truncates() {
        assert_eq!(snippet(Some("short")), "short");
        let long = "x".repeat(SNIPPET_LEN + 10);
        assert_eq!(snippet(Some(&long)).chars().count(), SNIPPET_LEN + 1);
        assert_eq!(snippet(None), "");
    }

    fn content() -> NotificationContent {
        NotificationContent {
            title: "Hello".into(),
            body: "body".into(),
            url: "/".into(),
            comment_id: None,
            post_id: None,
        }
    }

    #[tokio::test]
    async fn test_notify_persists_when_enabled() {
        let h = Harness::new().await;
        let n = h
            .forum
            .notify(h.u2, h.u1, "comment_reply", content())
            .await
            .unwrap()
            .unwrap();
        assert_eq!((n.recipient_id, n.sender_id), (h.u2, h.u1));
        assert_eq!(n.kind, NotificationKind::CommentReply);
        assert_eq!(n.read_at, None);
    }

    #[tokio::test]
    async fn test_notify_disabled_is_silent() {
        let h = Harness::new().await;
        h.db.set_notification_setting(h.u2, NotificationKind::CommentVote, false)
            .await
            .unwrap();
        let result = h.forum.notify(h.u2, h.u1, "comment_vote", content()).await;
        assert!(matches!(result, Ok(None)));
        assert_eq!(h.db.count_notifications().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_notify_unknown_type() {
        let h = Harness::new().await;
        let err = h
            .forum
            .notify(h.u2, h.u1, "friend_request", content())
            .await
            .unwrap_err();
        assert!(matches!(err, ForumError::Configuration(_)));
    }
}
