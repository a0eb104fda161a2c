use axum::{extract::State, Json};
use domain::{ForumError, Notification};

use crate::http::{auth::Viewer, error::ApiResult};
use crate::state::AppState;

pub async fn list_notifications(
    State(state): State<AppState>,
    Viewer(viewer): Viewer,
) -> ApiResult<Vec<Notification>> {
    let user_id = viewer.ok_or_else(|| ForumError::unauthorized("You must be logged in"))?;
    let notifications = state
        .forum
        .db()
        .list_notifications(user_id)
        .await
        .map_err(ForumError::from)?;
    Ok(Json(notifications))
}
