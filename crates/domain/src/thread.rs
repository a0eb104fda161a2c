//! 评论树组装。
//!
//! 评论按 id 存在一个 arena 里，另有 `parent_id -> 子评论 id 列表` 的索引，
//! 节点之间不互相持有。每一层只物化一页子评论，剩余数量记在
//! `more_replies` 里，由 [`Thread::page`] 按 offset 继续加载。
//! 一次最多展开 [`MAX_DEPTH`] 层，更深的回复同样从 `more_replies` 继续。

use crate::models::{Comment, CommentId, UserId, VoteDirection};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::str::FromStr;

pub const DELETED_AUTHOR: &str = "[deleted]";

/// 单次物化的最大嵌套层数，含起始层
pub const MAX_DEPTH: usize = 8;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    /// created_at 升序，同时间按 id
    #[default]
    Oldest,
    Newest,
    /// vote_score 降序，同分按 Oldest
    Top,
}

impl FromStr for SortOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "oldest" => Ok(Self::Oldest),
            "newest" => Ok(Self::Newest),
            "top" => Ok(Self::Top),
            other => Err(format!("Unknown sort order: {}", other)),
        }
    }
}

/// 存储层返回的一行：评论本体加作者用户名
#[derive(Debug, Clone)]
pub struct ThreadComment {
    pub comment: Comment,
    pub author_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommentNode {
    pub id: CommentId,
    pub parent_id: Option<CommentId>,
    pub content: Option<String>,
    pub author_id: Option<UserId>,
    pub author: String,
    pub is_deleted: bool,
    pub vote_score: i64,
    pub viewer_vote: Option<VoteDirection>,
    pub created_at: NaiveDateTime,
    pub updated_at: Option<NaiveDateTime>,
    pub children: Vec<CommentNode>,
    /// 本层未物化的子评论数
    pub more_replies: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ThreadPage {
    pub comments: Vec<CommentNode>,
    pub next_offset: Option<usize>,
}

pub struct Thread {
    arena: HashMap<CommentId, ThreadComment>,
    children: HashMap<Option<CommentId>, Vec<CommentId>>,
    viewer_votes: HashMap<CommentId, VoteDirection>,
    page_size: usize,
}

impl Thread {
    pub fn new(
        rows: Vec<ThreadComment>,
        viewer_votes: HashMap<CommentId, VoteDirection>,
        sort: SortOrder,
        page_size: usize,
    ) -> Self {
        let arena: HashMap<CommentId, ThreadComment> =
            rows.into_iter().map(|row| (row.comment.id, row)).collect();

        let mut children: HashMap<Option<CommentId>, Vec<CommentId>> = HashMap::new();
        for row in arena.values() {
            // 父评论不在本帖内时挂到顶层，保证仍然可达
            let parent = row
                .comment
                .parent_id
                .filter(|parent_id| arena.contains_key(parent_id));
            children.entry(parent).or_default().push(row.comment.id);
        }

        for ids in children.values_mut() {
            ids.sort_by(|a, b| {
                let (a, b) = (&arena[a].comment, &arena[b].comment);
                let by_age = a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id));
                match sort {
                    SortOrder::Oldest => by_age,
                    SortOrder::Newest => by_age.reverse(),
                    SortOrder::Top => b.vote_score.cmp(&a.vote_score).then(by_age),
                }
            });
        }

        Self {
            arena,
            children,
            viewer_votes,
            page_size: page_size.max(1),
        }
    }

    pub fn contains(&self, id: CommentId) -> bool {
        self.arena.contains_key(&id)
    }

    /// `parent` 为 None 时是顶层评论。parent 不属于本帖时返回 None。
    pub fn page(&self, parent: Option<CommentId>, offset: usize) -> Option<ThreadPage> {
        if let Some(id) = parent {
            if !self.contains(id) {
                return None;
            }
        }

        let ids = self.child_ids(parent);
        let end = offset.saturating_add(self.page_size).min(ids.len());
        let comments = ids
            .get(offset..end)
            .unwrap_or_default()
            .iter()
            .map(|id| self.node(*id, 0))
            .collect();

        Some(ThreadPage {
            comments,
            next_offset: (end < ids.len()).then_some(end),
        })
    }

    fn child_ids(&self, parent: Option<CommentId>) -> &[CommentId] {
        self.children
            .get(&parent)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    fn node(&self, id: CommentId, depth: usize) -> CommentNode {
        let row = &self.arena[&id];
        let comment = &row.comment;

        let ids = self.child_ids(Some(id));
        // 到达最大深度后不再展开，子评论全部计入 more_replies
        let shown = if depth + 1 < MAX_DEPTH {
            ids.len().min(self.page_size)
        } else {
            0
        };
        let children = ids[..shown]
            .iter()
            .map(|child| self.node(*child, depth + 1))
            .collect();

        let author = if comment.is_deleted {
            DELETED_AUTHOR.to_string()
        } else {
            row.author_name
                .clone()
                .unwrap_or_else(|| DELETED_AUTHOR.to_string())
        };

        CommentNode {
            id,
            parent_id: comment.parent_id,
            content: comment.content.clone(),
            author_id: comment.author_id,
            author,
            is_deleted: comment.is_deleted,
            vote_score: comment.vote_score,
            viewer_vote: self.viewer_votes.get(&id).copied(),
            created_at: comment.created_at,
            updated_at: comment.updated_at,
            children,
            more_replies: ids.len() - shown,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(minute: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 5, 1)
            .unwrap()
            .and_hms_opt(12, minute, 0)
            .unwrap()
    }

    fn row(id: CommentId, parent_id: Option<CommentId>, minute: u32, score: i64) -> ThreadComment {
        ThreadComment {
            comment: Comment {
                id,
                post_id: 1,
                topic_id: 1,
                parent_id,
                content: Some(format!("comment {}", id)),
                author_id: Some(10 + id),
                is_deleted: false,
                vote_score: score,
                created_at: at(minute),
                updated_at: None,
            },
            author_name: Some(format!("user{}", id)),
        }
    }

    fn redacted(mut row: ThreadComment) -> ThreadComment {
        row.comment.content = None;
        row.comment.author_id = None;
        row.comment.is_deleted = true;
        row
    }

    fn ids(nodes: &[CommentNode]) -> Vec<CommentId> {
        nodes.iter().map(|n| n.id).collect()
    }

    #[test]
    fn test_nests_children_under_parents() {
        let rows = vec![row(1, None, 0, 0), row(2, Some(1), 1, 0), row(3, Some(2), 2, 0)];
        let thread = Thread::new(rows, HashMap::new(), SortOrder::Oldest, 10);

        let page = thread.page(None, 0).unwrap();
        assert_eq!(ids(&page.comments), vec![1]);
        assert_eq!(ids(&page.comments[0].children), vec![2]);
        assert_eq!(ids(&page.comments[0].children[0].children), vec![3]);
        assert_eq!(page.next_offset, None);
    }

    #[test]
    fn test_redacted_parent_keeps_children() {
        let rows = vec![redacted(row(1, None, 0, 0)), row(2, Some(1), 1, 0)];
        let thread = Thread::new(rows, HashMap::new(), SortOrder::Oldest, 10);

        let root = &thread.page(None, 0).unwrap().comments[0];
        assert_eq!(root.author, DELETED_AUTHOR);
        assert_eq!(root.content, None);
        assert!(root.is_deleted);
        assert_eq!(ids(&root.children), vec![2]);
        assert_eq!(root.children[0].author, "user2");
    }

    #[test]
    fn test_sort_orders() {
        let rows = || vec![row(1, None, 0, 1), row(2, None, 1, 5), row(3, None, 2, 1)];

        let oldest = Thread::new(rows(), HashMap::new(), SortOrder::Oldest, 10);
        assert_eq!(ids(&oldest.page(None, 0).unwrap().comments), vec![1, 2, 3]);

        let newest = Thread::new(rows(), HashMap::new(), SortOrder::Newest, 10);
        assert_eq!(ids(&newest.page(None, 0).unwrap().comments), vec![3, 2, 1]);

        let top = Thread::new(rows(), HashMap::new(), SortOrder::Top, 10);
        assert_eq!(ids(&top.page(None, 0).unwrap().comments), vec![2, 1, 3]);
    }

    #[test]
    fn test_load_more_pages_subtree() {
        let mut rows = vec![row(1, None, 0, 0)];
        rows.extend((2..=6).map(|id| row(id, Some(1), id as u32, 0)));
        let thread = Thread::new(rows, HashMap::new(), SortOrder::Oldest, 2);

        let root = &thread.page(None, 0).unwrap().comments[0];
        assert_eq!(ids(&root.children), vec![2, 3]);
        assert_eq!(root.more_replies, 3);

        let next = thread.page(Some(1), 2).unwrap();
        assert_eq!(ids(&next.comments), vec![4, 5]);
        assert_eq!(next.next_offset, Some(4));

        let last = thread.page(Some(1), 4).unwrap();
        assert_eq!(ids(&last.comments), vec![6]);
        assert_eq!(last.next_offset, None);

        // 重新从头开始
        assert_eq!(thread.page(Some(1), 0).unwrap(), ThreadPage {
            comments: root.children.clone(),
            next_offset: Some(2),
        });

        assert!(thread.page(Some(99), 0).is_none());
        assert!(thread.page(Some(1), 50).unwrap().comments.is_empty());
    }

    #[test]
    fn test_viewer_vote_annotation() {
        let rows = vec![row(1, None, 0, 1), row(2, None, 1, -1)];
        let votes = HashMap::from([(1, VoteDirection::Up), (2, VoteDirection::Down)]);
        let thread = Thread::new(rows, votes, SortOrder::Oldest, 10);

        let page = thread.page(None, 0).unwrap();
        assert_eq!(page.comments[0].viewer_vote, Some(VoteDirection::Up));
        assert_eq!(page.comments[1].viewer_vote, Some(VoteDirection::Down));
    }

    #[test]
    fn test_orphan_surfaces_at_top_level() {
        let rows = vec![row(1, None, 0, 0), row(2, Some(42), 1, 0)];
        let thread = Thread::new(rows, HashMap::new(), SortOrder::Oldest, 10);
        assert_eq!(ids(&thread.page(None, 0).unwrap().comments), vec![1, 2]);
    }

    #[test]
    fn test_deep_chain_continues_past_max_depth() {
        let depth = 10_000;
        let rows: Vec<_> = (1..=depth)
            .map(|id| row(id, (id > 1).then(|| id - 1), 0, 0))
            .collect();
        let thread = Thread::new(rows, HashMap::new(), SortOrder::Oldest, 10);

        let mut page = thread.page(None, 0).unwrap();
        let mut seen = 0;
        loop {
            assert_eq!(page.comments.len(), 1);
            let mut node = &page.comments[0];
            let mut levels = 1;
            seen += 1;
            while let Some(child) = node.children.first() {
                node = child;
                levels += 1;
                seen += 1;
            }
            assert!(levels <= MAX_DEPTH);
            if node.more_replies == 0 {
                break;
            }
            assert_eq!(levels, MAX_DEPTH);
            assert_eq!(node.more_replies, 1);
            page = thread.page(Some(node.id), 0).unwrap();
        }
        assert_eq!(seen, depth);
    }

    #[test]
    fn test_huge_offset_returns_empty_page() {
        let rows = vec![row(1, None, 0, 0), row(2, None, 1, 0)];
        let thread = Thread::new(rows, HashMap::new(), SortOrder::Oldest, 10);

        let page = thread.page(None, usize::MAX).unwrap();
        assert!(page.comments.is_empty());
        assert_eq!(page.next_offset, None);

        let page = thread.page(Some(1), usize::MAX - 3).unwrap();
        assert!(page.comments.is_empty());
        assert_eq!(page.next_offset, None);
    }
}
