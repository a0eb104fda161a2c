use crate::{require_user, Forum};
use domain::{
    Capabilities, Capability, ForumError, Moderator, NewRule, PostId, Result, Rule, RuleId,
    TopicId, UserId, MAX_RULES_PER_TOPIC,
};
use tracing::info;

impl Forum {
    /// 没有版主记录即无权限。`manage_everything` 隐含另外两项。
    pub async fn authorize(
        &self,
        topic_id: TopicId,
        user_id: UserId,
        required: Capability,
    ) -> Result<bool> {
        let moderator = self.db.get_moderator(topic_id, user_id).await?;
        Ok(moderator.is_some_and(|m| m.capabilities.grants(required)))
    }

    pub(crate) async fn require_capability(
        &self,
        topic_id: TopicId,
        user_id: UserId,
        required: Capability,
    ) -> Result<()> {
        if self.authorize(topic_id, user_id, required).await? {
            Ok(())
        } else {
            Err(ForumError::unauthorized(
                "You do not have permission to do that in this topic",
            ))
        }
    }

    pub async fn add_rule(
        &self,
        topic_id: TopicId,
        actor: Option<UserId>,
        name: &str,
        description: &str,
    ) -> Result<Rule> {
        let user_id = require_user(actor)?;
        self.require_capability(topic_id, user_id, Capability::ManageSettings)
            .await?;
        let rule = NewRule::new(name, description)?;

        let saved = self.db.add_rule(topic_id, &rule).await?.ok_or_else(|| {
            ForumError::validation(format!(
                "You can have at most {} rules",
                MAX_RULES_PER_TOPIC
            ))
        })?;
        info!("Rule {} added to topic {} by user {}", saved.id, topic_id, user_id);
        Ok(saved)
    }

    pub async fn delete_rule(
        &self,
        topic_id: TopicId,
        actor: Option<UserId>,
        rule_id: RuleId,
    ) -> Result<()> {
        let user_id = require_user(actor)?;
        self.require_capability(topic_id, user_id, Capability::ManageSettings)
            .await?;

        if !self.db.delete_rule(topic_id, rule_id).await? {
            return Err(ForumError::not_found("Rule does not exist"));
        }
        info!("Rule {} removed from topic {} by user {}", rule_id, topic_id, user_id);
        Ok(())
    }

    pub async fn list_rules(&self, topic_id: TopicId) -> Result<Vec<Rule>> {
        Ok(self.db.list_rules(topic_id).await?)
    }

    /// 权限在 `Capabilities` 构造时已归一化，写进库的值总是自洽的
    pub async fn add_moderator(
        &self,
        topic_id: TopicId,
        actor: Option<UserId>,
        target: UserId,
        capabilities: Capabilities,
    ) -> Result<Moderator> {
        let user_id = require_user(actor)?;
        self.require_capability(topic_id, user_id, Capability::ManageEverything)
            .await?;

        if self.db.get_username(target).await?.is_none() {
            return Err(ForumError::not_found("User does not exist"));
        }
        if !self.db.insert_moderator(topic_id, target, capabilities).await? {
            return Err(ForumError::conflict("User is already a moderator"));
        }
        info!("User {} made moderator of topic {} by {}", target, topic_id, user_id);

        Ok(Moderator {
            topic_id,
            user_id: target,
            capabilities,
        })
    }

    pub async fn remove_moderator(
        &self,
        topic_id: TopicId,
        actor: Option<UserId>,
        target: UserId,
    ) -> Result<()> {
        let user_id = require_user(actor)?;
        self.require_capability(topic_id, user_id, Capability::ManageEverything)
            .await?;

        if !self.db.delete_moderator(topic_id, target).await? {
            return Err(ForumError::not_found("User is not a moderator"));
        }
        info!("User {} removed as moderator of topic {} by {}", target, topic_id, user_id);
        Ok(())
    }
    pub async fn list_moderators(&self, topic_id: TopicId) -> Result<Vec<Moderator>> {
        Ok(self.db.list_moderators(topic_id).await?)
    }

    /// 版主删除整个帖子，评论和投票随外键一起删除。
    /// 先按帖子实际所在话题检查权限，再比对调用方声称的话题。
    pub async fn remove_post(
        &self,
        claimed_topic: TopicId,
        actor: Option<UserId>,
        post_id: PostId,
    ) -> Result<()> {
        let user_id = require_user(actor)?;
        let post = self.post_context(post_id).await?;
        self.require_capability(post.topic_id, user_id, Capability::ManagePostsAndComments)
            .await?;
        if post.topic_id != claimed_topic {
            return Err(ForumError::conflict("Post does not belong to topic"));
        }

        if !self.db.delete_post(post_id).await? {
            return Err(ForumError::not_found("Post does not exist"));
        }
        info!("Post {} removed from topic {} by user {}", post_id, post.topic_id, user_id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::Harness;

    async fn moderator(h: &Harness, topic: TopicId, caps: Capabilities) -> UserId {
        let m = h.db.create_user(&format!("mod-{}", topic)).await.unwrap();
        h.db.insert_moderator(topic, m, caps).await.unwrap();
        m
    }

    #[tokio::test]
    async fn test_everything_implies_posts_and_comments() {
        let h = Harness::new().await;
        let m = moderator(&h, h.t1, Capabilities::new(true, false, false)).await;

        assert!(h.forum.authorize(h.t1, m, Capability::ManagePostsAndComments).await.unwrap());
        assert!(h.forum.authorize(h.t1, m, Capability::ManageSettings).await.unwrap());
        assert!(!h.forum.authorize(h.t2, m, Capability::ManagePostsAndComments).await.unwrap());
        assert!(!h.forum.authorize(h.t1, h.u1, Capability::ManageSettings).await.unwrap());
    }

    #[tokio::test]
    async fn test_rule_limit() {
        let h = Harness::new().await;
        let m = moderator(&h, h.t1, Capabilities::from_set(&[Capability::ManageSettings])).await;

        for i in 0..MAX_RULES_PER_TOPIC {
            h.forum
                .add_rule(h.t1, Some(m), &format!("Rule {}", i), "Be kind")
                .await
                .unwrap();
        }

        let err = h.forum.add_rule(h.t1, Some(m), "Rule 16", "Too many").await.unwrap_err();
        assert!(matches!(err, ForumError::Validation(_)));
        assert_eq!(err.to_string(), "You can have at most 15 rules");
        assert_eq!(h.forum.list_rules(h.t1).await.unwrap().len(), 15);
    }

    #[tokio::test]
    async fn test_rule_bounds_and_permissions() {
        let h = Harness::new().await;
        let m = moderator(&h, h.t1, Capabilities::from_set(&[Capability::ManagePostsAndComments])).await;

        let err = h.forum.add_rule(h.t1, Some(m), "No spam", "none").await.unwrap_err();
        assert!(matches!(err, ForumError::Unauthorized(_)));

        let owner = h.db.create_user("owner").await.unwrap();
        h.db.insert_moderator(h.t1, owner, Capabilities::all()).await.unwrap();

        let long_name = "n".repeat(101);
        let err = h.forum.add_rule(h.t1, Some(owner), &long_name, "d").await.unwrap_err();
        assert!(matches!(err, ForumError::Validation(_)));
        let long_desc = "d".repeat(501);
        let err = h.forum.add_rule(h.t1, Some(owner), "n", &long_desc).await.unwrap_err();
        assert!(matches!(err, ForumError::Validation(_)));
        assert!(h.forum.list_rules(h.t1).await.unwrap().is_empty());

        let rule = h.forum.add_rule(h.t1, Some(owner), "No spam", "Ever").await.unwrap();
        h.forum.delete_rule(h.t1, Some(owner), rule.id).await.unwrap();
        let err = h.forum.delete_rule(h.t1, Some(owner), rule.id).await.unwrap_err();
        assert!(matches!(err, ForumError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_moderator_management() {
        let h = Harness::new().await;
        let owner = moderator(&h, h.t1, Capabilities::all()).await;

        let added = h
            .forum
            .add_moderator(h.t1, Some(owner), h.u3, Capabilities::new(true, false, false))
            .await
            .unwrap();
        assert!(added.capabilities.can_manage_posts_and_comments());
        assert!(added.capabilities.can_manage_settings());

        let err = h
            .forum
            .add_moderator(h.t1, Some(owner), h.u3, Capabilities::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ForumError::Conflict(_)));

        // u3 现在拥有全部权限，可以反过来管理别人
        let partial = h
            .forum
            .add_moderator(h.t1, Some(h.u3), h.u1, Capabilities::from_set(&[Capability::ManageSettings]))
            .await
            .unwrap();
        let err = h
            .forum
            .remove_moderator(h.t1, Some(partial.user_id), owner)
            .await
            .unwrap_err();
        assert!(matches!(err, ForumError::Unauthorized(_)));

        h.forum.remove_moderator(h.t1, Some(owner), h.u3).await.unwrap();
        assert!(!h.forum.authorize(h.t1, h.u3, Capability::ManageSettings).await.unwrap());

        let err = h
            .forum
            .add_moderator(h.t1, Some(owner), 9999, Capabilities::all())
            .await
            .unwrap_err();
        assert!(matches!(err, ForumError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_list_moderators() {
        let h = Harness::new().await;
        assert!(h.forum.list_moderators(h.t1).await.unwrap().is_empty());

        let m = moderator(&h, h.t1, Capabilities::new(true, false, false)).await;
        let mods = h.forum.list_moderators(h.t1).await.unwrap();
        assert_eq!(mods.len(), 1);
        assert_eq!(mods[0].user_id, m);
        assert!(mods[0].capabilities.can_manage_settings());
        assert!(h.forum.list_moderators(h.t2).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_remove_post_cascades_comments() {
        let h = Harness::new().await;
        let (u1, p1, c0) = (h.u1, h.p1, h.c0);
        let reply = h.forum.create_reply(c0, p1, Some(u1), "hi").await.unwrap();

        let err = h.forum.remove_post(h.t1, Some(u1), p1).await.unwrap_err();
        assert!(matches!(err, ForumError::Unauthorized(_)));

        let m = moderator(&h, h.t1, Capabilities::from_set(&[Capability::ManagePostsAndComments])).await;
        let err = h.forum.remove_post(h.t2, Some(m), p1).await.unwrap_err();
        assert!(matches!(err, ForumError::Conflict(_)));
        assert!(h.db.get_comment(c0).await.unwrap().is_some());

        h.forum.remove_post(h.t1, Some(m), p1).await.unwrap();
        assert!(h.db.get_comment(c0).await.unwrap().is_none());
        assert!(h.db.get_comment(reply.id).await.unwrap().is_none());

        let err = h.forum.remove_post(h.t1, Some(m), p1).await.unwrap_err();
        assert!(matches!(err, ForumError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_remove_post_checks_permission_before_topic() {
        let h = Harness::new().await;
        // 只在 t2 有权限，删除 t1 的帖子时即使声称 t2 也是无权限
        let m = moderator(&h, h.t2, Capabilities::all()).await;
        let err = h.forum.remove_post(h.t2, Some(m), h.p1).await.unwrap_err();
        assert!(matches!(err, ForumError::Unauthorized(_)));
    }
}
