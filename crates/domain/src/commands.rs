use crate::models::UserId;
use crate::notification::{NotificationContent, NotificationKind};

/// 主事务提交后投递给通知 worker 的请求
#[derive(Debug, Clone)]
pub struct FanoutRequest {
    pub recipient_id: UserId,
    pub sender_id: UserId,
    pub kind: NotificationKind,
    pub content: NotificationContent,
}
