use axum::{
    extract::{Path, State},
    response::sse::{Event, KeepAlive, Sse},
};
use domain::{PostId, ThreadEvent};
use futures::stream::Stream;
use tokio_stream::{wrappers::BroadcastStream, StreamExt};

use crate::state::AppState;

pub async fn sse_handler(
    State(state): State<AppState>,
    Path(post_id): Path<PostId>,
) -> Sse<impl Stream<Item = Result<Event, axum::Error>>> {
    let rx = state.forum.subscribe();
    tracing::info!("SSE Connected: post={}", post_id);

    let stream = BroadcastStream::new(rx).filter_map(move |result| match result {
        Ok(event) if event.post_id() == post_id => {
            let event_type = match &event {
                ThreadEvent::CommentSaved { comment, .. } if comment.updated_at.is_some() => {
                    "update_comment"
                }
                ThreadEvent::CommentSaved { .. } => "new_comment",
                ThreadEvent::CommentRedacted { .. } => "delete_comment",
                ThreadEvent::ScoreChanged { .. } => "score",
            };
            Some(
                Event::default()
                    .event(event_type)
                    .json_data(&event)
                    .map_err(|e| {
                        tracing::error!("SSE serialization error: {}", e);
                        axum::Error::new(e)
                    }),
            )
        }
        Ok(_) => None,
        Err(_lagged) => {
            tracing::warn!("SSE Client lagged for post {}", post_id);
            None
        }
    });

    Sse::new(stream).keep_alive(KeepAlive::new().interval(std::time::Duration::from_secs(15)))
}
