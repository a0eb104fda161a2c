use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use domain::{ErrorKind, ForumError};
use serde::Serialize;

#[derive(Serialize)]
struct ErrorBody {
    kind: ErrorKind,
    message: String,
}

/// 把领域错误映射成稳定的 `{kind, message}` 响应
pub struct ApiError(pub ForumError);

impl From<ForumError> for ApiError {
    fn from(err: ForumError) -> Self {
        Self(err)
    }
}

pub fn status_for(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::Validation => StatusCode::BAD_REQUEST,
        ErrorKind::NotFound => StatusCode::NOT_FOUND,
        ErrorKind::Unauthorized => StatusCode::UNAUTHORIZED,
        ErrorKind::Conflict => StatusCode::CONFLICT,
        ErrorKind::Configuration | ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let kind = self.0.kind();
        if let ForumError::Internal(ref e) = self.0 {
            tracing::error!("Request failed: {:?}", e);
        }
        let body = ErrorBody {
            kind,
            message: self.0.to_string(),
        };
        (status_for(kind), Json(body)).into_response()
    }
}

pub type ApiResult<T> = Result<Json<T>, ApiError>;
