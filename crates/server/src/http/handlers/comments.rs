use axum::{
    extract::{Path, Query, State},
    Json,
};
use domain::thread::{SortOrder, ThreadPage};
use domain::{Comment, CommentId, PostId, VoteDirection, VoteOutcome};
use engine::RedactScope;
use serde::Deserialize;

use crate::http::{auth::Viewer, error::ApiResult};
use crate::state::AppState;

// --- DTOs ---

#[derive(Deserialize)]
pub struct ThreadQuery {
    pub sort: Option<SortOrder>,
    #[serde(default)]
    pub offset: usize,
}

#[derive(Deserialize)]
pub struct CreateCommentRequest {
    pub content: String,
}

#[derive(Deserialize)]
pub struct CreateReplyRequest {
    pub content: String,
    pub post_id: PostId,
}

#[derive(Deserialize)]
pub struct EditCommentRequest {
    pub content: String,
}

#[derive(Deserialize)]
pub struct VoteRequest {
    pub vote: VoteDirection,
}

// --- Handlers ---

pub async fn get_thread(
    State(state): State<AppState>,
    Viewer(viewer): Viewer,
    Path(post_id): Path<PostId>,
    Query(query): Query<ThreadQuery>,
) -> ApiResult<ThreadPage> {
    let page = state
        .forum
        .load_more(post_id, None, query.offset, viewer, query.sort)
        .await?;
    Ok(Json(page))
}

pub async fn get_replies(
    State(state): State<AppState>,
    Viewer(viewer): Viewer,
    Path((post_id, comment_id)): Path<(PostId, CommentId)>,
    Query(query): Query<ThreadQuery>,
) -> ApiResult<ThreadPage> {
    let page = state
        .forum
        .load_more(post_id, Some(comment_id), query.offset, viewer, query.sort)
        .await?;
    Ok(Json(page))
}

pub async fn post_comment(
    State(state): State<AppState>,
    Viewer(viewer): Viewer,
    Path(post_id): Path<PostId>,
    Json(payload): Json<CreateCommentRequest>,
) -> ApiResult<Comment> {
    let comment = state
        .forum
        .create_comment(post_id, viewer, &payload.content)
        .await?;
    Ok(Json(comment))
}

pub async fn post_reply(
    State(state): State<AppState>,
    Viewer(viewer): Viewer,
    Path(comment_id): Path<CommentId>,
    Json(payload): Json<CreateReplyRequest>,
) -> ApiResult<Comment> {
    let reply = state
        .forum
        .create_reply(comment_id, payload.post_id, viewer, &payload.content)
        .await?;
    Ok(Json(reply))
}

pub async fn edit_comment(
    State(state): State<AppState>,
    Viewer(viewer): Viewer,
    Path(comment_id): Path<CommentId>,
    Json(payload): Json<EditCommentRequest>,
) -> ApiResult<Comment> {
    let comment = state
        .forum
        .edit_content(comment_id, viewer, &payload.content)
        .await?;
    Ok(Json(comment))
}

pub async fn delete_comment(
    State(state): State<AppState>,
    Viewer(viewer): Viewer,
    Path(comment_id): Path<CommentId>,
) -> ApiResult<Comment> {
    let comment = state
        .forum
        .redact(comment_id, viewer, RedactScope::Author)
        .await?;
    Ok(Json(comment))
}

pub async fn vote_comment(
    State(state): State<AppState>,
    Viewer(viewer): Viewer,
    Path(comment_id): Path<CommentId>,
    Json(payload): Json<VoteRequest>,
) -> ApiResult<VoteOutcome> {
    let outcome = state
        .forum
        .cast_vote(viewer, comment_id, payload.vote)
        .await?;
    Ok(Json(outcome))
}
