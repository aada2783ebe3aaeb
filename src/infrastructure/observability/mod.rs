//! Observability infrastructure - Prometheus metrics

mod config;
mod metrics;

pub use config::MetricsConfig;
pub use metrics::{
    create_metrics_router, init_metrics, record_abuse_failure, record_contact_email,
    record_http_request, record_key_validation, PrometheusMetrics,
};
