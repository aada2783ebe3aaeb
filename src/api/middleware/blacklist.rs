//! Blacklist gate
//!
//! Turns blacklisted clients away before the body is read or any key is
//! checked.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use tracing::debug;

use crate::api::state::AppState;
use crate::api::types::ApiError;

use super::client_identity::ClientIp;

pub async fn blacklist_middleware(
    State(state): State<AppState>,
    ClientIp(identity): ClientIp,
    request: Request,
    next: Next,
) -> Response {
    match state.abuse_tracker.is_blacklisted(&identity).await {
        Ok(false) => next.run(request).await,
        Ok(true) => {
            debug!("Rejected blacklisted client: {}", identity);
            ApiError::blocked().into_response()
        }
        Err(e) => ApiError::from(e).into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::state::test_support::test_state;
    use crate::domain::ClientIdentity;
    use axum::{
        body::Body,
        extract::connect_info::MockConnectInfo,
        http::StatusCode,
        middleware,
        routing::get,
        Router,
    };
    use std::net::SocketAddr;
    use tower::ServiceExt;

    fn app(state: AppState) -> Router {
        Router::new()
            .route("/", get(|| async { "ok" }))
            .layer(middleware::from_fn_with_state(
                state.clone(),
                blacklist_middleware,
            ))
            .layer(MockConnectInfo(SocketAddr::from(([1, 2, 3, 4], 5000))))
            .with_state(state)
    }

    async fn call(app: Router) -> StatusCode {
        app.oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap()
            .status()
    }

    #[tokio::test]
    async fn test_allowed_client_passes() {
        assert_eq!(call(app(test_state())).await, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_blacklisted_client_forbidden() {
        let state = test_state();
        state
            .abuse_tracker
            .add_to_blacklist(&ClientIdentity::new("1.2.3.4").unwrap())
            .await
            .unwrap();

        assert_eq!(call(app(state)).await, StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_other_client_unaffected() {
        let state = test_state();
        state
            .abuse_tracker
            .add_to_blacklist(&ClientIdentity::new("6.6.6.6").unwrap())
            .await
            .unwrap();

        assert_eq!(call(app(state)).await, StatusCode::OK);
    }
}
