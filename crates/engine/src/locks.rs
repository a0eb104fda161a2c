use domain::CommentId;
use tokio::sync::{Mutex, MutexGuard};

/// 按评论 id 分片的互斥锁，同一条评论上的写操作在进程内串行执行
pub(crate) struct CommentLocks {
    stripes: Vec<Mutex<()>>,
}

impl CommentLocks {
    pub fn new(stripes: usize) -> Self {
        Self {
            stripes: (0..stripes.max(1)).map(|_| Mutex::new(())).collect(),
        }
    }

    pub async fn lock(&self, comment_id: CommentId) -> MutexGuard<'_, ()> {
        let idx = comment_id.rem_euclid(self.stripes.len() as i64) as usize;
        self.stripes[idx].lock().await
    }
}
