//! HTTP Middleware
//!
//! - 错误状态码日志
//! - Bearer API Key 鉴权
//! - 按客户端地址限流

use axum::{
    extract::{ConnectInfo, Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::net::SocketAddr;
use std::sync::Arc;

use super::error::ApiError;
use super::rate_limit::ClientRateLimiter;
use super::state::AppState;

const UNAUTHORIZED_MESSAGE: &str =
    "无效或缺失API密钥，请在请求头中添加: Authorization: Bearer YOUR_KEY";

/// 无法获得对端地址时使用的限流 key
const UNKNOWN_CLIENT: &str = "unknown";

/// HTTP 状态码错误日志中间件
///
/// 拦截 HTTP 响应，当状态码为 4xx 或 5xx 时记录日志
pub async fn error_logging_middleware(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();

    let response = next.run(request).await;
    let status = response.status();

    if status.is_server_error() {
        tracing::error!(
            method = %method,
            uri = %uri,
            status = %status.as_u16(),
            "HTTP server error"
        );
    } else if status.is_client_error() {
        tracing::warn!(
            method = %method,
            uri = %uri,
            status = %status.as_u16(),
            "HTTP client error"
        );
    }

    response
}

/// 提取 `Authorization: Bearer <token>` 中的 token
fn bearer_token(request: &Request) -> Option<&str> {
    let value = request.headers().get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    if scheme.eq_ignore_ascii_case("bearer") {
        Some(token.trim())
    } else {
        None
    }
}

/// API Key 鉴权
pub async fn require_api_key(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Response {
    let authorized = bearer_token(&request)
        .map(|token| state.api_keys.contains(token))
        .unwrap_or(false);

    if !authorized {
        tracing::warn!(uri = %request.uri(), "Rejected request without a valid API key");
        return ApiError::Unauthorized(UNAUTHORIZED_MESSAGE.to_string()).into_response();
    }

    next.run(request).await
}

/// 限流 key：对端 IP
pub fn client_key(request: &Request) -> String {
    request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip().to_string())
        .unwrap_or_else(|| UNKNOWN_CLIENT.to_string())
}

/// 限流中间件，每个路由组持有自己的限流器
pub async fn enforce_rate_limit(
    State(limiter): State<ClientRateLimiter>,
    request: Request,
    next: Next,
) -> Response {
    let client = client_key(&request);

    if let Err(limited) = limiter.check(&client) {
        tracing::warn!(
            client = %client,
            quota = limiter.quota(),
            retry_after = limited.retry_after_secs,
            "Rate limit exceeded"
        );
        return ApiError::RateLimited {
            retry_after_secs: limited.retry_after_secs,
        }
        .into_response();
    }

    next.run(request).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        http::{Request as HttpRequest, StatusCode},
        routing::get,
        Router,
    };
    use tower::util::ServiceExt;

    async fn ok_handler() -> &'static str {
        "OK"
    }

    async fn not_found_handler() -> StatusCode {
        StatusCode::NOT_FOUND
    }

    async fn error_handler() -> StatusCode {
        StatusCode::INTERNAL_SERVER_ERROR
    }

    fn create_test_router() -> Router {
        Router::new()
            .route("/ok", get(ok_handler))
            .route("/not-found", get(not_found_handler))
            .route("/error", get(error_handler))
            .layer(axum::middleware::from_fn(error_logging_middleware))
    }

    #[tokio::test]
    async fn test_error_logging_passes_status_through() {
        for (uri, status) in [
            ("/ok", StatusCode::OK),
            ("/not-found", StatusCode::NOT_FOUND),
            ("/error", StatusCode::INTERNAL_SERVER_ERROR),
        ] {
            let request = HttpRequest::builder().uri(uri).body(Body::empty()).unwrap();
            let response = create_test_router().oneshot(request).await.unwrap();
            assert_eq!(response.status(), status);
        }
    }

    #[tokio::test]
    async fn test_rate_limit_rejects_after_quota() {
        let app = Router::new().route("/ok", get(ok_handler)).layer(
            axum::middleware::from_fn_with_state(
                ClientRateLimiter::per_minute(1),
                enforce_rate_limit,
            ),
        );

        let request = || HttpRequest::builder().uri("/ok").body(Body::empty()).unwrap();

        let first = app.clone().oneshot(request()).await.unwrap();
        assert_eq!(first.status(), StatusCode::OK);

        let second = app.oneshot(request()).await.unwrap();
        assert_eq!(second.status(), StatusCode::TOO_MANY_REQUESTS);
        assert!(second.headers().contains_key("retry-after"));
    }

    #[test]
    fn test_bearer_token_parsing() {
        let with = |value: &str| {
            HttpRequest::builder()
                .header(AUTHORIZATION, value)
                .body(Body::empty())
                .unwrap()
        };

        assert_eq!(bearer_token(&with("Bearer sk-test")), Some("sk-test"));
        assert_eq!(bearer_token(&with("bearer sk-test")), Some("sk-test"));
        assert_eq!(bearer_token(&with("Basic abc")), None);
        assert_eq!(bearer_token(&with("sk-test")), None);
    }

    #[test]
    fn test_client_key_without_connect_info() {
        let request = HttpRequest::builder().body(Body::empty()).unwrap();
        assert_eq!(client_key(&request), "unknown");
    }
}
