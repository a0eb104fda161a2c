use crate::Forum;
use domain::thread::{SortOrder, Thread, ThreadPage};
use domain::{CommentId, ForumError, PostId, Result, UserId};
use std::collections::HashMap;

impl Forum {
    /// 载入整个帖子的评论并建好索引，之后可以反复按页取
    pub async fn thread(
        &self,
        post_id: PostId,
        viewer: Option<UserId>,
        sort: Option<SortOrder>,
    ) -> Result<Thread> {
        self.post_context(post_id).await?;

        let rows = self.db.list_thread(post_id).await?;
        let votes = match viewer {
            Some(user_id) => self.db.viewer_votes(post_id, user_id).await?,
            None => HashMap::new(),
        };

        Ok(Thread::new(
            rows,
            votes,
            sort.unwrap_or(self.thread.default_sort),
            self.thread.page_size,
        ))
    }

    /// 第一页顶层评论，每层子评论同样只物化一页
    pub async fn build_tree(
        &self,
        post_id: PostId,
        viewer: Option<UserId>,
        sort: Option<SortOrder>,
    ) -> Result<ThreadPage> {
        self.load_more(post_id, None, 0, viewer, sort).await
    }

    /// "加载更多回复"：从 offset 开始取 parent 下的下一页
    pub async fn load_more(
        &self,
        post_id: PostId,
        parent: Option<CommentId>,
        offset: usize,
        viewer: Option<UserId>,
        sort: Option<SortOrder>,
    ) -> Result<ThreadPage> {
        self.thread(post_id, viewer, sort)
            .await?
            .page(parent, offset)
            .ok_or_else(|| ForumError::not_found("Comment does not belong to post"))
    }
}
