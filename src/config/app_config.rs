use serde::Deserialize;

use crate::domain::abuse::{DEFAULT_BLOCK_DURATION_SECS, DEFAULT_MAX_FAILED_ATTEMPTS};
use crate::infrastructure::abuse::DEFAULT_ABUSE_KEY_PREFIX;
use crate::infrastructure::api_key::DEFAULT_KEY_PREFIX;
use crate::infrastructure::observability::MetricsConfig;

/// Application configuration
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub storage: StorageConfig,
    pub abuse: AbuseConfig,
    pub auth: AuthConfig,
    pub api_keys: ApiKeysConfig,
    pub mail: MailConfig,
    pub cors: CorsConfig,
    pub metrics: MetricsConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Take the client address from X-Forwarded-For / X-Real-IP
    pub trust_proxy: bool,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

#[derive(Debug, Clone, Copy, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    #[default]
    Memory,
    Postgres,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    pub database_url: Option<String>,
    pub max_connections: u32,
}

#[derive(Debug, Clone, Copy, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum AbuseBackend {
    #[default]
    Memory,
    Redis,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AbuseConfig {
    pub backend: AbuseBackend,
    pub redis_url: Option<String>,
    pub key_prefix: String,
    pub max_failed_attempts: u32,
    pub block_duration_secs: i64,
    pub forgive_on_success: bool,
    /// Identities blacklisted at startup
    pub blocked_identities: Vec<String>,
    pub rate_limit_requests: u32,
    pub rate_limit_window_secs: i64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub token_hours: u64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ApiKeysConfig {
    pub prefix: String,
}

#[derive(Debug, Clone, Copy, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MailTransportKind {
    #[default]
    Log,
    Http,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MailConfig {
    pub transport: MailTransportKind,
    pub relay_url: Option<String>,
    pub relay_token: Option<String>,
    pub from: String,
    pub to: String,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct CorsConfig {
    /// Empty allows any origin
    pub allowed_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            trust_proxy: false,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::default(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::default(),
            database_url: None,
            max_connections: 5,
        }
    }
}

impl Default for AbuseConfig {
    fn default() -> Self {
        Self {
            backend: AbuseBackend::default(),
            redis_url: None,
            key_prefix: DEFAULT_ABUSE_KEY_PREFIX.to_string(),
            max_failed_attempts: DEFAULT_MAX_FAILED_ATTEMPTS,
            block_duration_secs: DEFAULT_BLOCK_DURATION_SECS,
            forgive_on_success: false,
            blocked_identities: Vec::new(),
            rate_limit_requests: 10,
            rate_limit_window_secs: 60,
        }
    }
}

/// Signing secret used when none is configured
pub const DEFAULT_JWT_SECRET: &str = "change-me-in-production";

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: DEFAULT_JWT_SECRET.to_string(),
            token_hours: 24,
        }
    }
}

impl Default for ApiKeysConfig {
    fn default() -> Self {
        Self {
            prefix: DEFAULT_KEY_PREFIX.to_string(),
        }
    }
}

impl Default for MailConfig {
    fn default() -> Self {
        Self {
            transport: MailTransportKind::default(),
            relay_url: None,
            relay_token: None,
            from: "contact@localhost".to_string(),
            to: "contact@localhost".to_string(),
        }
    }
}

impl AppConfig {
    pub fn load() -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(
                config::Environment::with_prefix("APP")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("abuse.blocked_identities")
                    .with_list_parse_key("cors.allowed_origins")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}
