//! Application configuration

mod app_config;

pub use app_config::{
    AbuseBackend, AbuseConfig, ApiKeysConfig, AppConfig, AuthConfig, CorsConfig, LogFormat,
    LoggingConfig, MailConfig, MailTransportKind, ServerConfig, StorageBackend, StorageConfig,
    DEFAULT_JWT_SECRET,
};
