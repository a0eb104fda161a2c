use crate::{Forum, ThreadSettings};
use domain::{CommentBody, CommentId, PostId, TopicId, UserId};
use fanout::{FanoutQueue, FanoutWorker};
use std::sync::Arc;
use storage::Db;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// 测试用的论坛：话题 T1 / T2，帖子 P1 (T1，作者 U1)，评论 C0 (P1，作者 U2)。
/// 所有用户默认开启全部通知。
pub(crate) struct Harness {
    pub forum: Forum,
    pub db: Db,
    pub worker: JoinHandle<()>,
    pub u1: UserId,
    pub u2: UserId,
    pub u3: UserId,
    pub t1: TopicId,
    pub t2: TopicId,
    pub p1: PostId,
    pub c0: CommentId,
}

impl Harness {
    pub async fn new() -> Self {
        Self::with_settings(ThreadSettings::default()).await
    }

    pub async fn with_settings(settings: ThreadSettings) -> Self {
        let db = Db::in_memory().await.unwrap();
        let (queue, rx) = FanoutQueue::channel(64);
        let worker = FanoutWorker::new(Arc::new(db.clone())).spawn(rx, CancellationToken::new());
        let forum = Forum::new(db.clone(), queue, settings);

        let u1 = db.create_user("u1").await.unwrap();
        let u2 = db.create_user("u2").await.unwrap();
        let u3 = db.create_user("u3").await.unwrap();
        for user in [u1, u2, u3] {
            db.seed_default_settings(user).await.unwrap();
        }

        let t1 = db.create_topic("t1").await.unwrap();
        let t2 = db.create_topic("t2").await.unwrap();
        let p1 = db.create_post(t1, u1, "first post").await.unwrap();
        let c0 = db
            .insert_comment(p1, None, u2, &CommentBody::parse("root comment").unwrap())
            .await
            .unwrap()
            .id;

        Self {
            forum,
            db,
            worker,
            u1,
            u2,
            u3,
            t1,
            t2,
            p1,
            c0,
        }
    }

    /// 关闭队列并等 worker 处理完所有已入队的通知
    pub async fn drain(self) -> Db {
        let Self {
            forum, db, worker, ..
        } = self;
        drop(forum);
        worker.await.unwrap();
        db
    }
}
