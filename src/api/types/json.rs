//! JSON body extractor whose rejections use the API error envelope

use axum::{
    extract::{rejection::JsonRejection, FromRequest, Request},
    response::{IntoResponse, Response},
    Json as AxumJson,
};
use serde::{de::DeserializeOwned, Serialize};

use super::error::{ApiError, ApiErrorType};

/// `axum::Json` with body errors reported as `{"error": {...}}`
///
/// Malformed bodies are answered here, before any handler runs, so they
/// never reach the access guard and never count against the caller.
#[derive(Debug, Clone, Copy, Default)]
pub struct Json<T>(pub T);

impl<S, T> FromRequest<S> for Json<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        AxumJson::<T>::from_request(req, state)
            .await
            .map(|AxumJson(value)| Json(value))
            .map_err(body_error)
    }
}

impl<T: Serialize> IntoResponse for Json<T> {
    fn into_response(self) -> Response {
        AxumJson(self.0).into_response()
    }
}

fn body_error(rejection: JsonRejection) -> ApiError {
    let (code, message) = match &rejection {
        JsonRejection::JsonDataError(err) => ("invalid_body", err.body_text()),
        JsonRejection::JsonSyntaxError(err) => ("malformed_json", err.body_text()),
        JsonRejection::MissingJsonContentType(_) => (
            "unsupported_media_type",
            "Expected Content-Type: application/json".to_string(),
        ),
        other => ("invalid_body", other.body_text()),
    };

    ApiError::new(rejection.status(), ApiErrorType::InvalidRequestError, message).with_code(code)
}
