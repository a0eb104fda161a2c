use crate::{models::SqlRule, Db};
use chrono::Utc;
use domain::{NewRule, Rule, RuleId, TopicId, MAX_RULES_PER_TOPIC};

impl Db {
    pub async fn create_topic(&self, title: &str) -> anyhow::Result<TopicId> {
        let now = Utc::now().naive_utc();
        let id = sqlx::query("INSERT INTO topics (title, created_at) VALUES (?, ?)")
            .bind(title)
            .bind(now)
            .execute(&self.pool)
            .await?
            .last_insert_rowid();
        Ok(id)
    }

    /// 规则数已满时返回 None。计数和插入在同一条语句里完成，
    /// 并发添加不会越过上限。
    pub async fn add_rule(&self, topic_id: TopicId, rule: &NewRule) -> anyhow::Result<Option<Rule>> {
        let now = Utc::now().naive_utc();
        let result = sqlx::query(
            r#"
            INSERT INTO topic_rules (topic_id, name, description, created_at)
            SELECT ?, ?, ?, ?
            WHERE (SELECT COUNT(*) FROM topic_rules WHERE topic_id = ?) < ?
            "#,
        )
        .bind(topic_id)
        .bind(rule.name())
        .bind(rule.description())
        .bind(now)
        .bind(topic_id)
        .bind(MAX_RULES_PER_TOPIC)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }

        Ok(Some(Rule {
            id: result.last_insert_rowid(),
            topic_id,
            name: rule.name().to_string(),
            description: rule.description().to_string(),
            created_at: now,
        }))
    }

    pub async fn delete_rule(&self, topic_id: TopicId, rule_id: RuleId) -> anyhow::Result<bool> {
        let result = sqlx::query("DELETE FROM topic_rules WHERE id = ? AND topic_id = ?")
            .bind(rule_id)
            .bind(topic_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn list_rules(&self, topic_id: TopicId) -> anyhow::Result<Vec<Rule>> {
        let rows = sqlx::query_as::<_, SqlRule>(
            r#"
            SELECT id, topic_id, name, description, created_at
            FROM topic_rules
            WHERE topic_id = ?
            ORDER BY created_at ASC, id ASC
            "#,
        )
        .bind(topic_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_rule_limit_is_enforced() {
        let db = Db::in_memory().await.unwrap();
        let topic = db.create_topic("rust").await.unwrap();

        for i in 0..MAX_RULES_PER_TOPIC {
            let rule = NewRule::new(&format!("rule {}", i), "be nice").unwrap();
            assert!(db.add_rule(topic, &rule).await.unwrap().is_some());
        }

        let rule = NewRule::new("one too many", "nope").unwrap();
        assert!(db.add_rule(topic, &rule).await.unwrap().is_none());
        assert_eq!(db.list_rules(topic).await.unwrap().len() as i64, MAX_RULES_PER_TOPIC);
    }

    #[tokio::test]
    async fn test_delete_rule_scoped_to_topic() {
        let db = Db::in_memory().await.unwrap();
        let rust = db.create_topic("rust").await.unwrap();
        let go = db.create_topic("go").await.unwrap();

        let rule = NewRule::new("No photos", "Text only").unwrap();
        let saved = db.add_rule(rust, &rule).await.unwrap().unwrap();

        assert!(!db.delete_rule(go, saved.id).await.unwrap());
        assert!(db.delete_rule(rust, saved.id).await.unwrap());
        assert!(db.list_rules(rust).await.unwrap().is_empty());
    }
}
