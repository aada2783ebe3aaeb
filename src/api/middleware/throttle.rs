//! Per-client request throttling for the contact endpoints

use axum::{
    extract::{Request, State},
    http::{HeaderName, HeaderValue},
    middleware::Next,
    response::{IntoResponse, Response},
};
use tracing::debug;

use crate::api::state::AppState;
use crate::api::types::ApiError;
use crate::infrastructure::abuse::RateLimitResult;

use super::client_identity::ClientIp;

const RATE_LIMIT_LIMIT: HeaderName = HeaderName::from_static("x-ratelimit-limit");
const RATE_LIMIT_REMAINING: HeaderName = HeaderName::from_static("x-ratelimit-remaining");
const RATE_LIMIT_RESET: HeaderName = HeaderName::from_static("x-ratelimit-reset");

pub async fn throttle_middleware(
    State(state): State<AppState>,
    ClientIp(identity): ClientIp,
    request: Request,
    next: Next,
) -> Response {
    let result = state.rate_limiter.check_and_record(&identity).await;

    if !result.allowed {
        debug!(
            "Throttled client {} (retry in {}s)",
            identity, result.reset_in_seconds
        );

        let mut response = ApiError::rate_limited("Too many requests. Please try again later.")
            .with_code("rate_limited")
            .into_response();
        insert_headers(&mut response, &result);
        response.headers_mut().insert(
            axum::http::header::RETRY_AFTER,
            HeaderValue::from(result.reset_in_seconds),
        );
        return response;
    }

    let mut response = next.run(request).await;
    insert_headers(&mut response, &result);
    response
}

fn insert_headers(response: &mut Response, result: &RateLimitResult) {
    let headers = response.headers_mut();
    headers.insert(RATE_LIMIT_LIMIT, HeaderValue::from(result.limit));
    headers.insert(RATE_LIMIT_REMAINING, HeaderValue::from(result.remaining));
    headers.insert(RATE_LIMIT_RESET, HeaderValue::from(result.reset_in_seconds));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::state::test_support::test_state;
    use crate::infrastructure::abuse::RateLimiter;
    use axum::{
        body::Body,
        extract::connect_info::MockConnectInfo,
        http::{header, StatusCode},
        middleware,
        routing::get,
        Router,
    };
    use std::net::SocketAddr;
    use std::sync::Arc;
    use tower::ServiceExt;

    fn app(limit: u32) -> Router {
        let mut state = test_state();
        state.rate_limiter = Arc::new(RateLimiter::new(limit, chrono::Duration::seconds(60)));

        Router::new()
            .route("/", get(|| async { "ok" }))
            .layer(middleware::from_fn_with_state(
                state.clone(),
                throttle_middleware,
            ))
            .layer(MockConnectInfo(SocketAddr::from(([1, 2, 3, 4], 5000))))
            .with_state(state)
    }

    fn request() -> Request {
        Request::builder().uri("/").body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn test_headers_on_allowed_request() {
        let response = app(3).oneshot(request()).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()["x-ratelimit-limit"], "3");
        assert_eq!(response.headers()["x-ratelimit-remaining"], "2");
    }

    #[tokio::test]
    async fn test_excess_requests_throttled() {
        let app = app(2);

        for _ in 0..2 {
            let response = app.clone().oneshot(request()).await.unwrap();
            assert_eq!(response.status(), StatusCode::OK);
        }

        let response = app.oneshot(request()).await.unwrap();
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        assert!(response.headers().contains_key(header::RETRY_AFTER));
        assert_eq!(response.headers()["x-ratelimit-remaining"], "0");
    }
}
