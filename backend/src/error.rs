//! Application error handling
//!
//! This module converts auth-core errors and internal failures into HTTP
//! responses. It is the only place status codes are decided.

use crate::auth::AuthError;
use axum::{
    http::{header::WWW_AUTHENTICATE, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use mini_blog_shared::{ErrorDetail, ErrorResponse};
use thiserror::Error;
use tracing::error;

/// API error type that can be converted to HTTP responses
#[derive(Error, Debug)]
pub enum ApiError {
    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error("Internal server error")]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    fn parts(&self) -> (StatusCode, &'static str, String) {
        match self {
            ApiError::Auth(err) => {
                let (status, code) = match err {
                    AuthError::InvalidCredentials => (StatusCode::UNAUTHORIZED, "INVALID_CREDENTIALS"),
                    AuthError::Unauthorized
                    | AuthError::InvalidToken
                    | AuthError::MissingSubject => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED"),
                    AuthError::Forbidden => (StatusCode::FORBIDDEN, "FORBIDDEN"),
                    AuthError::NotFound => (StatusCode::NOT_FOUND, "NOT_FOUND"),
                    AuthError::TokenNotFound => (StatusCode::NOT_FOUND, "TOKEN_NOT_FOUND"),
                    AuthError::TokenExpired => (StatusCode::BAD_REQUEST, "TOKEN_EXPIRED"),
                    AuthError::DuplicateUsername => (StatusCode::BAD_REQUEST, "DUPLICATE_USERNAME"),
                    AuthError::Validation(_) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
                    AuthError::Internal(cause) => {
                        error!("Internal error: {:?}", cause);
                        (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR")
                    }
                };
                (status, code, err.to_string())
            }
            ApiError::Internal(cause) => {
                error!("Internal error: {:?}", cause);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal error occurred".to_string(),
                )
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message) = self.parts();

        let body = Json(ErrorResponse {
            error: ErrorDetail {
                code: code.to_string(),
                message,
                field: None,
            },
        });

        let mut response = (status, body).into_response();
        if status == StatusCode::UNAUTHORIZED {
            response
                .headers_mut()
                .insert(WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
        }
        response
    }
}

/// Result type alias for API handlers
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    fn status_of(err: AuthError) -> StatusCode {
        ApiError::from(err).into_response().status()
    }

    #[test]
    fn test_auth_error_statuses() {
        assert_eq!(status_of(AuthError::InvalidCredentials), StatusCode::UNAUTHORIZED);
        assert_eq!(status_of(AuthError::Unauthorized), StatusCode::UNAUTHORIZED);
        assert_eq!(status_of(AuthError::InvalidToken), StatusCode::UNAUTHORIZED);
        assert_eq!(status_of(AuthError::MissingSubject), StatusCode::UNAUTHORIZED);
        assert_eq!(status_of(AuthError::Forbidden), StatusCode::FORBIDDEN);
        assert_eq!(status_of(AuthError::NotFound), StatusCode::NOT_FOUND);
        assert_eq!(status_of(AuthError::TokenNotFound), StatusCode::NOT_FOUND);
        assert_eq!(status_of(AuthError::TokenExpired), StatusCode::BAD_REQUEST);
        assert_eq!(status_of(AuthError::DuplicateUsername), StatusCode::BAD_REQUEST);
        assert_eq!(
            status_of(AuthError::Validation("bad".to_string())),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn test_unauthorized_carries_challenge() {
        let response = ApiError::from(AuthError::Unauthorized).into_response();
        assert_eq!(response.headers().get(WWW_AUTHENTICATE).unwrap(), "Bearer");

        let response = ApiError::from(AuthError::Forbidden).into_response();
        assert!(response.headers().get(WWW_AUTHENTICATE).is_none());
    }

    #[test]
    fn test_internal_error_status() {
        let response = ApiError::from(anyhow::anyhow!("boom")).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let response =
            ApiError::from(AuthError::Internal(anyhow::anyhow!("db down"))).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn test_internal_error_body_is_generic() {
        let response =
            ApiError::from(AuthError::Internal(anyhow::anyhow!("password=hunter2"))).into_response();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = String::from_utf8(body.to_vec()).unwrap();
        assert!(!body.contains("hunter2"));
        assert!(body.contains("INTERNAL_ERROR"));
    }
}
