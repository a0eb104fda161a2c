use domain::FanoutRequest;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use crate::traits::NotificationSink;

pub struct FanoutWorker {
    sink: Arc<dyn NotificationSink>,
}

impl FanoutWorker {
    pub fn new(sink: Arc<dyn NotificationSink>) -> Self {
        Self { sink }
    }

    pub fn spawn(
        self,
        rx: mpsc::Receiver<FanoutRequest>,
        cancel_token: CancellationToken,
    ) -> JoinHandle<()> {
        tokio::spawn(async move { self.run(rx, cancel_token).await })
    }

    /// 所有发送端都关闭后退出。取消时先把已经入队的请求处理完，
    /// 入队即视为提交。
    pub async fn run(&self, mut rx: mpsc::Receiver<FanoutRequest>, cancel_token: CancellationToken) {
        info!("Notification fanout worker started");
        loop {
            tokio::select! {
                req_opt = rx.recv() => {
                    match req_opt {
                        Some(req) => self.handle(req).await,
                        None => break,
                    }
                },
                _ = cancel_token.cancelled() => {
                    rx.close();
                    while let Some(req) = rx.recv().await {
                        self.handle(req).await;
                    }
                    break;
                }
            }
        }
        info!("Notification fanout worker stopped");
    }

    async fn handle(&self, req: FanoutRequest) {
        match self.sink.deliver(&req).await {
            Ok(Some(n)) => debug!(
                "Notification {} ({}) sent to user {}",
                n.id, n.kind, n.recipient_id
            ),
            Ok(None) => debug!(
                "User {} has {} notifications disabled, skipped",
                req.recipient_id, req.kind
            ),
            // 通知失败只记日志，不影响触发它的操作
            Err(e) => error!(
                "Failed to deliver {} notification to user {}: {:?}",
                req.kind, req.recipient_id, e
            ),
        }
    }
}
