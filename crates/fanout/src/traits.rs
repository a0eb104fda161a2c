use anyhow::Result;
use async_trait::async_trait;
use domain::{FanoutRequest, Notification};
use storage::Db;

/// 通知的落地方式。接收方关闭了该类型时返回 `Ok(None)`。
#[async_trait]
pub trait NotificationSink: Send + Sync {
    async fn deliver(&self, req: &FanoutRequest) -> Result<Option<Notification>>;
}

#[async_trait]
impl NotificationSink for Db {
    async fn deliver(&self, req: &FanoutRequest) -> Result<Option<Notification>> {
        self.insert_notification_if_enabled(req.recipient_id, req.sender_id, req.kind, &req.content)
            .await
    }
}
