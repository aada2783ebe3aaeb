//! Contact form endpoint
//!
//! Every submission runs through the access guard: a wrong or missing API key
//! and a refused mail both count against the caller's identity.

use axum::extract::State;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::api::middleware::{ClientIp, PresentedApiKey};
use crate::api::state::AppState;
use crate::api::types::{ApiError, Json};
use crate::domain::{ContactRequest, DomainError};
use crate::infrastructure::abuse::{ActionFailure, GuardDecision, RejectionReason};

const EMAIL_NOT_SENT: &str = "Email could not be sent";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContactResponse {
    pub success: bool,
    pub message: String,
}

/// POST /contact
pub async fn submit_contact(
    State(state): State<AppState>,
    ClientIp(identity): ClientIp,
    api_key: PresentedApiKey,
    Json(request): Json<ContactRequest>,
) -> Result<Json<ContactResponse>, ApiError> {
    request.validate_fields()?;

    let contact_service = state.contact_service.clone();
    let decision = state
        .access_guard
        .run(&identity, api_key.as_deref(), || async move {
            contact_service.send(&request).await.map_err(|e| match e {
                DomainError::Mail { .. } => ActionFailure::Rejected(EMAIL_NOT_SENT.to_string()),
                other => ActionFailure::Error(other),
            })
        })
        .await?;

    match decision {
        GuardDecision::Passed(()) => {
            info!("Contact message accepted from {}", identity);

            Ok(Json(ContactResponse {
                success: true,
                message: "Email sent successfully".to_string(),
            }))
        }
        GuardDecision::Forbidden { .. } => Err(ApiError::blocked()),
        GuardDecision::Rejected {
            reason: RejectionReason::InvalidApiKey,
            remaining_attempts,
        } => Err(ApiError::unauthorized("Invalid API key")
            .with_code("invalid_api_key")
            .with_remaining_attempts(remaining_attempts)),
        GuardDecision::Rejected {
            reason: RejectionReason::ActionFailed(message),
            remaining_attempts,
        } => Err(ApiError::bad_request(message)
            .with_code("email_not_sent")
            .with_remaining_attempts(remaining_attempts)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::state::test_support::{failing_transport, state_with_transport, test_state};
    use crate::domain::contact::MockMailTransport;
    use crate::domain::{ClientIdentity, OwnerId};
    use axum::{
        body::Body,
        extract::connect_info::MockConnectInfo,
        http::{header, Request, StatusCode},
        routing::post,
        Router,
    };
    use serde_json::{json, Value};
    use std::net::SocketAddr;
    use std::sync::Arc;
    use tower::ServiceExt;

    fn app(state: AppState) -> Router {
        Router::new()
            .route("/contact", post(submit_contact))
            .layer(MockConnectInfo(SocketAddr::from(([1, 2, 3, 4], 5000))))
            .with_state(state)
    }

    fn client() -> ClientIdentity {
        ClientIdentity::new("1.2.3.4").unwrap()
    }

    fn body() -> Value {
        json!({
            "name": "Ada",
            "email": "ada@example.com",
            "message": "Hello there"
        })
    }

    async fn issue_key(state: &AppState) -> String {
        state
            .api_key_service
            .create("site", OwnerId::new("owner-1").unwrap(), None)
            .await
            .unwrap()
            .secret
    }

    async fn post_contact(app: Router, uri: &str, key: Option<&str>, body: Value) -> (StatusCode, Value) {
        let mut builder = Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json");

        if let Some(key) = key {
            builder = builder.header("x-api-key", key);
        }

        let response = app
            .oneshot(builder.body(Body::from(body.to_string())).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();

        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_valid_key_sends_mail() {
        let state = test_state();
        let key = issue_key(&state).await;

        let (status, json) = post_contact(app(state), "/contact", Some(&key), body()).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["success"], true);
    }

    #[tokio::test]
    async fn test_key_in_query_string() {
        let state = test_state();
        let key = issue_key(&state).await;
        let uri = format!("/contact?apiKey={}", key);

        let (status, _) = post_contact(app(state), &uri, None, body()).await;

        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_invalid_key_counts_failure() {
        let state = test_state();

        let (status, json) =
            post_contact(app(state.clone()), "/contact", Some("mail_wrong"), body()).await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(json["error"]["remaining_attempts"], 4);
        assert_eq!(state.abuse_tracker.failure_count(&client()).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_missing_key_counts_failure() {
        let state = test_state();

        let (status, json) = post_contact(app(state), "/contact", None, body()).await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(json["error"]["remaining_attempts"], 4);
    }

    #[tokio::test]
    async fn test_invalid_fields_not_counted() {
        let state = test_state();
        let bad = json!({"name": "", "email": "not-an-email", "message": "hi"});

        let (status, json) =
            post_contact(app(state.clone()), "/contact", Some("mail_wrong"), bad).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(json["error"]["message"].as_str().unwrap().contains("email"));
        assert_eq!(state.abuse_tracker.failure_count(&client()).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_mail_failure_counts_failure() {
        let state = state_with_transport(failing_transport());
        let key = issue_key(&state).await;

        let (status, json) =
            post_contact(app(state.clone()), "/contact", Some(&key), body()).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"]["message"], EMAIL_NOT_SENT);
        assert_eq!(json["error"]["remaining_attempts"], 4);
        assert_eq!(state.abuse_tracker.failure_count(&client()).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_transport_misconfiguration_is_not_counted() {
        let mut transport = MockMailTransport::new();
        transport.expect_name().return_const("mock");
        transport
            .expect_send()
            .returning(|_| Err(DomainError::configuration("relay token missing")));

        let state = state_with_transport(Arc::new(transport));
        let key = issue_key(&state).await;

        let (status, json) =
            post_contact(app(state.clone()), "/contact", Some(&key), body()).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(json["error"]["remaining_attempts"].is_null());
        assert_eq!(state.abuse_tracker.failure_count(&client()).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_fifth_failure_blocks() {
        let state = test_state();

        for expected in [4, 3, 2, 1] {
            let (status, json) =
                post_contact(app(state.clone()), "/contact", Some("mail_wrong"), body()).await;
            assert_eq!(status, StatusCode::UNAUTHORIZED);
            assert_eq!(json["error"]["remaining_attempts"], expected);
        }

        let (status, json) =
            post_contact(app(state.clone()), "/contact", Some("mail_wrong"), body()).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(json["error"]["remaining_attempts"], 0);

        let key = issue_key(&state).await;
        let (status, _) = post_contact(app(state), "/contact", Some(&key), body()).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
    }
}
