use axum::{
    extract::{Path, State},
    Json,
};
use domain::{
    Capabilities, Comment, CommentId, Moderator, PostId, Rule, RuleId, TopicId, UserId,
};
use engine::RedactScope;
use serde::Deserialize;

use crate::http::{auth::Viewer, error::ApiResult};
use crate::state::AppState;

#[derive(Deserialize)]
pub struct AddRuleRequest {
    pub name: String,
    pub description: String,
}

#[derive(Deserialize)]
pub struct AddModeratorRequest {
    pub user_id: UserId,
    #[serde(flatten)]
    pub capabilities: Capabilities,
}

pub async fn delete_comment(
    State(state): State<AppState>,
    Viewer(viewer): Viewer,
    Path((topic_id, comment_id)): Path<(TopicId, CommentId)>,
) -> ApiResult<Comment> {
    let scope = RedactScope::Moderator {
        claimed_topic: Some(topic_id),
    };
    let comment = state.forum.redact(comment_id, viewer, scope).await?;
    Ok(Json(comment))
}

pub async fn delete_post(
    State(state): State<AppState>,
    Viewer(viewer): Viewer,
    Path((topic_id, post_id)): Path<(TopicId, PostId)>,
) -> ApiResult<&'static str> {
    state.forum.remove_post(topic_id, viewer, post_id).await?;
    Ok(Json("Deleted"))
}

pub async fn list_rules(
    State(state): State<AppState>,
    Path(topic_id): Path<TopicId>,
) -> ApiResult<Vec<Rule>> {
    Ok(Json(state.forum.list_rules(topic_id).await?))
}

pub async fn add_rule(
    State(state): State<AppState>,
    Viewer(viewer): Viewer,
    Path(topic_id): Path<TopicId>,
    Json(payload): Json<AddRuleRequest>,
) -> ApiResult<Rule> {
    let rule = state
        .forum
        .add_rule(topic_id, viewer, &payload.name, &payload.description)
        .await?;
    Ok(Json(rule))
}

pub async fn delete_rule(
    State(state): State<AppState>,
    Viewer(viewer): Viewer,
    Path((topic_id, rule_id)): Path<(TopicId, RuleId)>,
) -> ApiResult<&'static str> {
    state.forum.delete_rule(topic_id, viewer, rule_id).await?;
    Ok(Json("Deleted"))
}

pub async fn list_moderators(
    State(state): State<AppState>,
    Path(topic_id): Path<TopicId>,
) -> ApiResult<Vec<Moderator>> {
    Ok(Json(state.forum.list_moderators(topic_id).await?))
}

pub async fn add_moderator(
    State(state): State<AppState>,
    Viewer(viewer): Viewer,
    Path(topic_id): Path<TopicId>,
    Json(payload): Json<AddModeratorRequest>,
) -> ApiResult<Moderator> {
    let moderator = state
        .forum
        .add_moderator(topic_id, viewer, payload.user_id, payload.capabilities)
        .await?;
    Ok(Json(moderator))
}

pub async fn remove_moderator(
    State(state): State<AppState>,
    Viewer(viewer): Viewer,
    Path((topic_id, user_id)): Path<(TopicId, UserId)>,
) -> ApiResult<&'static str> {
    state.forum.remove_moderator(topic_id, viewer, user_id).await?;
    Ok(Json("Removed"))
}
