//! 评论子系统的对外操作：投票、回复、编辑、删除、评论树、版主权限、通知。
//!
//! 所有写操作先在存储层原子提交，提交后再把通知请求投进 fanout 队列，
//! 通知失败不会回滚主操作。

mod comments;
mod locks;
mod moderation;
mod notifications;
mod threads;
mod votes;

#[cfg(test)]
mod testing;

pub use comments::RedactScope;

use domain::thread::SortOrder;
use domain::{ForumError, Result, ThreadEvent, UserId};
use fanout::FanoutQueue;
use locks::CommentLocks;
use serde::Deserialize;
use std::sync::Arc;
use storage::Db;
use tokio::sync::broadcast;

const LOCK_STRIPES: usize = 64;

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct ThreadSettings {
    pub page_size: usize,
    pub default_sort: SortOrder,
}

impl Default for ThreadSettings {
    fn default() -> Self {
        Self {
            page_size: 10,
            default_sort: SortOrder::Oldest,
        }
    }
}

#[derive(Clone)]
pub struct Forum {
    db: Db,
    fanout: FanoutQueue,
    events: broadcast::Sender<ThreadEvent>,
    locks: Arc<CommentLocks>,
    thread: ThreadSettings,
}

impl Forum {
    pub fn new(db: Db, fanout: FanoutQueue, thread: ThreadSettings) -> Self {
        let (events, _) = broadcast::channel(100);
        Self {
            db,
            fanout,
            events,
            locks: Arc::new(CommentLocks::new(LOCK_STRIPES)),
            thread,
        }
    }

    pub fn db(&self) -> &Db {
        &self.db
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ThreadEvent> {
        self.events.subscribe()
    }

    fn publish(&self, event: ThreadEvent) {
        // 没有订阅者时 send 会失败，忽略即可
        let _ = self.events.send(event);
    }
}

/// 认证协作方没有给出用户时拒绝
pub(crate) fn require_user(actor: Option<UserId>) -> Result<UserId> {
    actor.ok_or_else(|| ForumError::unauthorized("You must be logged in"))
}
