//! HTTP Error Handling
//!
//! OpenAI 兼容的错误格式: `{"error": {"message", "type", "code"}}`

use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::application::ApplicationError;

/// 统一错误响应格式
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: ErrorBody,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub message: String,
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub code: &'static str,
}

/// 鉴权失败时的响应格式
#[derive(Debug, Serialize)]
pub struct UnauthorizedResponse {
    pub error: &'static str,
    pub message: String,
}

/// API 错误
#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    Unauthorized(String),
    NotFound(String),
    RateLimited { retry_after_secs: u64 },
    BadGateway(String),
    GatewayTimeout(String),
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
            ApiError::BadGateway(_) => StatusCode::BAD_GATEWAY,
            ApiError::GatewayTimeout(_) => StatusCode::GATEWAY_TIMEOUT,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn body(&self) -> ErrorBody {
        let (message, kind, code) = match self {
            ApiError::BadRequest(msg) => (msg.clone(), "invalid_request_error", "invalid_request"),
            ApiError::Unauthorized(msg) => (msg.clone(), "authentication_error", "invalid_api_key"),
            ApiError::NotFound(msg) => (msg.clone(), "invalid_request_error", "not_found"),
            ApiError::RateLimited { retry_after_secs } => (
                format!("Rate limit exceeded, retry after {} seconds", retry_after_secs),
                "rate_limit_error",
                "rate_limit_exceeded",
            ),
            ApiError::BadGateway(msg) => (msg.clone(), "upstream_error", "upstream_unavailable"),
            ApiError::GatewayTimeout(msg) => (msg.clone(), "upstream_error", "timeout"),
            ApiError::Internal(msg) => (msg.clone(), "server_error", "internal_error"),
        };

        ErrorBody {
            message,
            kind,
            code,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();

        match &self {
            ApiError::BadGateway(msg) | ApiError::GatewayTimeout(msg) | ApiError::Internal(msg) => {
                tracing::error!(status = status.as_u16(), error = %msg, "Request failed");
            }
            _ => {}
        }

        if let ApiError::Unauthorized(message) = self {
            let body = UnauthorizedResponse {
                error: "Unauthorized",
                message,
            };
            return (status, Json(body)).into_response();
        }

        let mut response = (status, Json(ErrorResponse { error: self.body() })).into_response();

        if let ApiError::RateLimited { retry_after_secs } = self {
            if let Ok(value) = HeaderValue::from_str(&retry_after_secs.to_string()) {
                response.headers_mut().insert(header::RETRY_AFTER, value);
            }
        }

        response
    }
}

impl From<ApplicationError> for ApiError {
    fn from(e: ApplicationError) -> Self {
        let message = e.to_string();
        match e {
            ApplicationError::EmptyInput | ApplicationError::ValidationError(_) => {
                ApiError::BadRequest(message)
            }
            ApplicationError::UnknownVoice(_) | ApplicationError::NotFound { .. } => {
                ApiError::NotFound(message)
            }
            ApplicationError::UpstreamUnavailable(_) | ApplicationError::InvalidAudioResponse(_) => {
                ApiError::BadGateway(message)
            }
            ApplicationError::InternalError(_) => ApiError::Internal(message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    async fn json_of(response: Response) -> serde_json::Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[test]
    fn test_application_error_mapping() {
        let cases = [
            (ApplicationError::EmptyInput, StatusCode::BAD_REQUEST),
            (
                ApplicationError::UnknownVoice("x".to_string()),
                StatusCode::NOT_FOUND,
            ),
            (
                ApplicationError::UpstreamUnavailable("down".to_string()),
                StatusCode::BAD_GATEWAY,
            ),
            (
                ApplicationError::InvalidAudioResponse("short".to_string()),
                StatusCode::BAD_GATEWAY,
            ),
            (
                ApplicationError::internal("boom"),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (app_error, status) in cases {
            assert_eq!(ApiError::from(app_error).status(), status);
        }
    }

    #[tokio::test]
    async fn test_error_body_shape() {
        let response = ApiError::from(ApplicationError::UnknownVoice("Nope".to_string())).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let body = json_of(response).await;
        assert_eq!(body["error"]["type"], "invalid_request_error");
        assert_eq!(body["error"]["code"], "not_found");
        assert!(body["error"]["message"].as_str().unwrap().contains("'Nope'"));
    }

    #[tokio::test]
    async fn test_rate_limited_sets_retry_after() {
        let response = ApiError::RateLimited { retry_after_secs: 7 }.into_response();
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(response.headers()[header::RETRY_AFTER], "7");
    }

    #[tokio::test]
    async fn test_unauthorized_body_shape() {
        let response = ApiError::Unauthorized("Invalid API key".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let body = json_of(response).await;
        assert_eq!(body["error"], "Unauthorized");
        assert_eq!(body["message"], "Invalid API key");
    }
}
