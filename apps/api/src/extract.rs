//! Request body extractor.
//!
//! [`ApiJson`] decodes like `axum::Json`, but a body that is not JSON, has
//! the wrong content type or misses a required field is answered with the
//! usual `400 VALIDATION_ERROR` instead of axum's plain-text rejection.

use axum::extract::rejection::JsonRejection;
use axum::extract::{FromRequest, Request};
use axum::Json;

use crate::error::ApiError;

/// JSON request body whose rejection is an [`ApiError`].
#[derive(Debug, Clone, Copy, Default)]
pub struct ApiJson<T>(pub T);

impl<S, T> FromRequest<S> for ApiJson<T>
where
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await?;
        Ok(ApiJson(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use axum::body::Body;
    use axum::http::header::CONTENT_TYPE;
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    struct Named {
        name: String,
    }

    fn json_request(body: &str) -> Request {
        Request::builder()
            .method("POST")
            .uri("/")
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_decodes_valid_body() {
        let ApiJson(named) = ApiJson::<Named>::from_request(json_request(r#"{"name":"Budi"}"#), &())
            .await
            .unwrap();
        assert_eq!(named.name, "Budi");
    }

    #[tokio::test]
    async fn test_missing_field_is_validation_error() {
        let err = ApiJson::<Named>::from_request(json_request("{}"), &())
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
        assert!(err.message.contains("name"));
    }

    #[tokio::test]
    async fn test_wrong_content_type_is_validation_error() {
        let request = Request::builder()
            .method("POST")
            .uri("/")
            .body(Body::from(r#"{"name":"Budi"}"#))
            .unwrap();

        let err = ApiJson::<Named>::from_request(request, &()).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
    }
}
