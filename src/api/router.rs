//! HTTP router assembly

use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderName, HeaderValue, Method},
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use tracing::warn;

use crate::config::CorsConfig;
use crate::infrastructure::observability::{create_metrics_router, PrometheusMetrics};

use super::admin;
use super::contact;
use super::health;
use super::info;
use super::middleware::{
    blacklist_middleware, logging_middleware, metrics_middleware, security_headers_middleware,
    throttle_middleware, MAX_BODY_SIZE,
};
use super::state::AppState;

/// Build the full application router
pub fn create_router(
    state: AppState,
    metrics: Option<PrometheusMetrics>,
    cors: &CorsConfig,
) -> Router {
    let x_request_id = HeaderName::from_static("x-request-id");

    // Blacklist runs before the throttle so blocked clients never consume quota
    let contact_routes = Router::new()
        .route("/contact", post(contact::submit_contact))
        .route("/mailer/send", post(contact::submit_contact))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            throttle_middleware,
        ))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            blacklist_middleware,
        ));

    let mut router = Router::new()
        .route("/", get(info::service_info))
        .route("/mailer", get(info::service_info))
        // Health endpoints
        .route("/health", get(health::health_check))
        .route("/ready", get(health::ready_check))
        .route("/live", get(health::live_check))
        .merge(contact_routes)
        // Admin API
        .nest("/admin", admin::create_admin_router())
        .with_state(state);

    if let Some(m) = metrics {
        router = router.merge(create_metrics_router(m));
    }

    router
        .layer(DefaultBodyLimit::max(MAX_BODY_SIZE))
        .layer(middleware::from_fn(security_headers_middleware))
        .layer(middleware::from_fn(logging_middleware))
        .layer(middleware::from_fn(metrics_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(PropagateRequestIdLayer::new(x_request_id.clone()))
        .layer(SetRequestIdLayer::new(x_request_id, MakeRequestUuid))
        .layer(cors_layer(cors))
}

fn cors_layer(config: &CorsConfig) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::DELETE])
        .allow_headers([
            header::AUTHORIZATION,
            header::CONTENT_TYPE,
            HeaderName::from_static("x-api-key"),
        ]);

    if config.allowed_origins.is_empty() {
        return layer.allow_origin(Any);
    }

    let origins: Vec<HeaderValue> = config
        .allowed_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    layer.allow_origin(AllowOrigin::list(origins))
}
