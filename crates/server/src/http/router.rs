use super::handlers::{comments, moderation, notifications, sse};
use crate::state::AppState;
use axum::{
    http::{HeaderValue, Method},
    routing::{delete, get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

const METHODS: [Method; 4] = [Method::GET, Method::POST, Method::PUT, Method::DELETE];

pub fn build_router(state: AppState, allowed_origins: &str) -> Router {
    let cors = if allowed_origins == "*" {
        CorsLayer::new()
            .allow_methods(METHODS)
            .allow_origin(Any)
            .allow_headers(Any)
    } else {
        let origins: Vec<HeaderValue> = allowed_origins
            .split(',')
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .filter_map(|s| s.parse::<HeaderValue>().ok())
            .collect();

        if origins.is_empty() {
            tracing::warn!("CORS config is invalid or empty, falling back to allow ANY.");
            CorsLayer::new()
                .allow_methods(METHODS)
                .allow_origin(Any)
                .allow_headers(Any)
        } else {
            tracing::info!("CORS enabled for origins: {:?}", origins);
            CorsLayer::new()
                .allow_methods(METHODS)
                .allow_origin(origins)
                .allow_headers(Any)
        }
    };

    Router::new()
        .route(
            "/api/posts/:post_id/comments",
            get(comments::get_thread).post(comments::post_comment),
        )
        .route(
            "/api/posts/:post_id/comments/:comment_id/replies",
            get(comments::get_replies),
        )
        .route("/api/posts/:post_id/events", get(sse::sse_handler))
        .route(
            "/api/comment/:comment_id",
            delete(comments::delete_comment).put(comments::edit_comment),
        )
        .route("/api/comment/:comment_id/reply", post(comments::post_reply))
        .route("/api/comment/:comment_id/vote", post(comments::vote_comment))
        .route("/api/topics/:topic_id/rules", get(moderation::list_rules))
        .route(
            "/api/moderation/:topic_id/comment/:comment_id",
            delete(moderation::delete_comment),
        )
        .route(
            "/api/moderation/:topic_id/post/:post_id",
            delete(moderation::delete_post),
        )
        .route("/api/moderation/:topic_id/rules", post(moderation::add_rule))
        .route(
            "/api/moderation/:topic_id/rules/:rule_id",
            delete(moderation::delete_rule),
        )
        .route(
            "/api/moderation/:topic_id/user",
            get(moderation::list_moderators).post(moderation::add_moderator),
        )
        .route(
            "/api/moderation/:topic_id/user/:user_id",
            delete(moderation::remove_moderator),
        )
        .route("/api/notifications", get(notifications::list_notifications))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
