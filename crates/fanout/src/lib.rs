mod traits;
mod worker;

pub use traits::NotificationSink;
pub use worker::FanoutWorker;

use domain::{FanoutRequest, ForumError, Notification, NotificationContent, NotificationKind, UserId};
use tokio::sync::mpsc::{self, error::TrySendError};
use tracing::warn;

/// 通知队列的发送端。入队不阻塞调用方，队列满或 worker 已退出时
/// 丢弃并记日志。
#[derive(Clone)]
pub struct FanoutQueue {
    tx: mpsc::Sender<FanoutRequest>,
}

impl FanoutQueue {
    pub fn channel(capacity: usize) -> (Self, mpsc::Receiver<FanoutRequest>) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        (Self { tx }, rx)
    }

    pub fn enqueue(&self, req: FanoutRequest) -> bool {
        match self.tx.try_send(req) {
            Ok(()) => true,
            Err(TrySendError::Full(req)) => {
                warn!(
                    "Fanout queue full, dropping {} notification for user {}",
                    req.kind, req.recipient_id
                );
                false
            }
            Err(TrySendError::Closed(req)) => {
                warn!(
                    "Fanout worker closed, dropping {} notification for user {}",
                    req.kind, req.recipient_id
                );
                false
            }
        }
    }
}

/// 同步通知入口：类型名未知是调用方错误，返回 `Configuration`；
/// 接收方关闭了该类型时静默返回 `Ok(None)`。
pub async fn notify(
    sink: &dyn NotificationSink,
    recipient_id: UserId,
    sender_id: UserId,
    kind: &str,
    content: NotificationContent,
) -> domain::Result<Option<Notification>> {
    let kind: NotificationKind = kind.parse()?;
    let req = FanoutRequest {
        recipient_id,
        sender_id,
        kind,
        content,
    };
    sink.deliver(&req).await.map_err(ForumError::from)
}
