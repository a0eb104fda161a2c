use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use domain::{ForumError, UserId};

use super::error::ApiError;

/// 上游认证网关校验完身份后写入的请求头
pub const USER_HEADER: &str = "x-user-id";

/// 当前请求的用户，匿名时为 None。这里不再重新校验凭证。
pub struct Viewer(pub Option<UserId>);

#[async_trait]
impl<S> FromRequestParts<S> for Viewer
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let Some(raw) = parts.headers.get(USER_HEADER) else {
            return Ok(Viewer(None));
        };
        raw.to_str()
            .ok()
            .and_then(|s| s.trim().parse::<UserId>().ok())
            .map(|id| Viewer(Some(id)))
            .ok_or_else(|| ApiError(ForumError::unauthorized("Invalid user identity")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    async fn extract(header: Option<&str>) -> Result<Viewer, ApiError> {
        let mut builder = Request::builder().uri("/");
        if let Some(value) = header {
            builder = builder.header(USER_HEADER, value);
        }
        let (mut parts, _) = builder.body(()).unwrap().into_parts();
        Viewer::from_request_parts(&mut parts, &()).await
    }

    #[tokio::test]
    async fn test_viewer_header() {
        assert!(matches!(extract(None).await, Ok(Viewer(None))));
        assert!(matches!(extract(Some("42")).await, Ok(Viewer(Some(42)))));
        assert!(extract(Some("not-a-number")).await.is_err());
    }
}
