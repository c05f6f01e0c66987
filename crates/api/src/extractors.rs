//! Request extractors.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::http::StatusCode;
use axum::Json;
use serde_json::json;
use uuid::Uuid;

use harambee_shared::AppError;

/// The acting user, taken from the `X-Actor-Id` header.
///
/// Authentication is terminated upstream; this service only needs the
/// verified actor identity for audit stamps.
#[derive(Debug, Clone, Copy)]
pub struct ActorId(pub Uuid);

fn rejection(err: &AppError) -> (StatusCode, Json<serde_json::Value>) {
    let status =
        StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (
        status,
        Json(json!({
            "error": err.error_code().to_ascii_lowercase(),
            "message": err.to_string()
        })),
    )
}

impl<S> FromRequestParts<S> for ActorId
where
    S: Send + Sync,
{
    type Rejection = (StatusCode, Json<serde_json::Value>);

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get("x-actor-id")
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| {
                rejection(&AppError::Unauthorized(
                    "X-Actor-Id header is required".into(),
                ))
            })?;
        let actor = Uuid::parse_str(header).map_err(|_| {
            rejection(&AppError::Unauthorized(
                "X-Actor-Id header must be a UUID".into(),
            ))
        })?;
        Ok(Self(actor))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    #[tokio::test]
    async fn test_extracts_valid_actor() {
        let actor = Uuid::now_v7();
        let request = Request::builder()
            .header("X-Actor-Id", actor.to_string())
            .body(())
            .unwrap();
        let (mut parts, ()) = request.into_parts();
        let extracted = ActorId::from_request_parts(&mut parts, &()).await.unwrap();
        assert_eq!(extracted.0, actor);
    }

    #[tokio::test]
    async fn test_rejects_missing_and_malformed_headers() {
        let request = Request::builder().body(()).unwrap();
        let (mut parts, ()) = request.into_parts();
        let (status, _) = ActorId::from_request_parts(&mut parts, &())
            .await
            .unwrap_err();
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let request = Request::builder()
            .header("X-Actor-Id", "not-a-uuid")
            .body(())
            .unwrap();
        let (mut parts, ()) = request.into_parts();
        assert!(ActorId::from_request_parts(&mut parts, &()).await.is_err());
    }
}
