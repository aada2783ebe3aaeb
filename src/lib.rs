//! Contact Mailer
//!
//! HTTP service that forwards contact-form submissions by e-mail. Callers
//! authenticate with issued API keys; repeated failures from one client lead
//! to a blacklist entry that holds until an operator lifts it.

pub mod api;
pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::AppConfig;

use std::sync::Arc;

use anyhow::{bail, Context};
use chrono::Duration;
use tracing::{info, warn};

use api::state::AppState;
use config::{
    AbuseBackend, AbuseConfig, ApiKeysConfig, MailConfig, MailTransportKind, StorageBackend,
    StorageConfig, DEFAULT_JWT_SECRET,
};
use domain::{AbusePolicy, AbuseTracker, ApiKeyRepository, ClientIdentity, MailTransport};
use infrastructure::{
    abuse::{InMemoryAbuseTracker, RateLimiter, RedisAbuseTracker},
    api_key::{ApiKeyGenerator, ApiKeyService, InMemoryApiKeyRepository, PostgresApiKeyRepository},
    auth::{JwtConfig, JwtService},
    mail::{ContactService, EmailTemplateRenderer, HttpMailTransport, LogMailTransport},
};

/// Create the application state with default configuration
pub async fn create_app_state() -> anyhow::Result<AppState> {
    create_app_state_with_config(&AppConfig::default()).await
}

/// Create the application state from configuration
pub async fn create_app_state_with_config(config: &AppConfig) -> anyhow::Result<AppState> {
    let repository = create_api_key_repository(&config.storage).await?;
    let api_key_service = Arc::new(create_api_key_service(repository, &config.api_keys));

    let abuse_tracker = create_abuse_tracker(&config.abuse).await?;

    let contact_service = Arc::new(ContactService::new(
        Arc::new(EmailTemplateRenderer::new()),
        create_mail_transport(&config.mail)?,
        config.mail.from.clone(),
        config.mail.to.clone(),
    ));
    info!("Mail transport: {}", contact_service.transport_name());

    let rate_limiter = Arc::new(RateLimiter::new(
        config.abuse.rate_limit_requests,
        window_duration("abuse.rate_limit_window_secs", config.abuse.rate_limit_window_secs)?,
    ));

    if config.auth.jwt_secret == DEFAULT_JWT_SECRET {
        warn!("Using the default admin token secret; set auth.jwt_secret in production");
    }

    let jwt_service = Arc::new(JwtService::new(JwtConfig::new(
        config.auth.jwt_secret.clone(),
        config.auth.token_hours,
    )));

    Ok(AppState::new(
        api_key_service,
        abuse_tracker,
        contact_service,
        rate_limiter,
        jwt_service,
    )
    .with_trust_proxy(config.server.trust_proxy))
}

/// Key service over `repository` using the configured key prefix
pub fn create_api_key_service(
    repository: Arc<dyn ApiKeyRepository>,
    config: &ApiKeysConfig,
) -> ApiKeyService {
    ApiKeyService::new(repository).with_generator(ApiKeyGenerator::new(config.prefix.clone()))
}

/// Open the configured key store
pub async fn create_api_key_repository(
    config: &StorageConfig,
) -> anyhow::Result<Arc<dyn ApiKeyRepository>> {
    info!("Storage backend: {:?}", config.backend);

    match config.backend {
        StorageBackend::Memory => Ok(Arc::new(InMemoryApiKeyRepository::new())),
        StorageBackend::Postgres => {
            let url = config
                .database_url
                .as_deref()
                .context("storage.database_url is required for the postgres backend")?;

            info!("Connecting to PostgreSQL...");
            let repository = PostgresApiKeyRepository::connect(url, config.max_connections).await?;
            repository.ensure_schema().await?;
            info!("PostgreSQL connection established");

            Ok(Arc::new(repository))
        }
    }
}

/// Build the abuse tracker and seed its blacklist from configuration
pub async fn create_abuse_tracker(config: &AbuseConfig) -> anyhow::Result<Arc<dyn AbuseTracker>> {
    validate_abuse_config(config)?;

    let policy = AbusePolicy::new(
        config.max_failed_attempts,
        window_duration("abuse.block_duration_secs", config.block_duration_secs)?,
    )
    .with_forgive_on_success(config.forgive_on_success);
    let blocked = parse_identities(&config.blocked_identities)?;

    info!(
        "Abuse tracking: backend={:?}, max_failed_attempts={}, window={}s, seeded={}",
        config.backend,
        config.max_failed_attempts,
        config.block_duration_secs,
        blocked.len()
    );

    match config.backend {
        AbuseBackend::Memory => Ok(Arc::new(
            InMemoryAbuseTracker::new(policy).with_blocked(blocked),
        )),
        AbuseBackend::Redis => {
            let url = config
                .redis_url
                .as_deref()
                .context("abuse.redis_url is required for the redis backend")?;

            let tracker = RedisAbuseTracker::connect(url, config.key_prefix.clone(), policy).await?;
            tracker.seed_blacklist(&blocked).await?;

            Ok(Arc::new(tracker))
        }
    }
}

/// Build the configured mail transport
pub fn create_mail_transport(config: &MailConfig) -> anyhow::Result<Arc<dyn MailTransport>> {
    match config.transport {
        MailTransportKind::Log => Ok(Arc::new(LogMailTransport::new())),
        MailTransportKind::Http => {
            let url = config
                .relay_url
                .clone()
                .context("mail.relay_url is required for the http transport")?;

            Ok(Arc::new(HttpMailTransport::new(url, config.relay_token.clone())?))
        }
    }
}

/// Longest accepted window, ten years
const MAX_WINDOW_SECS: i64 = 10 * 365 * 86_400;

/// Reject limits that would disable blocking or throttling
pub fn validate_abuse_config(config: &AbuseConfig) -> anyhow::Result<()> {
    if config.max_failed_attempts == 0 {
        bail!("abuse.max_failed_attempts must be at least 1");
    }

    if config.rate_limit_requests == 0 {
        bail!("abuse.rate_limit_requests must be at least 1");
    }

    window_duration("abuse.block_duration_secs", config.block_duration_secs)?;
    window_duration("abuse.rate_limit_window_secs", config.rate_limit_window_secs)?;

    Ok(())
}

fn window_duration(name: &str, secs: i64) -> anyhow::Result<Duration> {
    if !(1..=MAX_WINDOW_SECS).contains(&secs) {
        bail!(
            "{} must be between 1 and {} seconds, got {}",
            name,
            MAX_WINDOW_SECS,
            secs
        );
    }

    Ok(Duration::seconds(secs))
}

fn parse_identities(raw: &[String]) -> anyhow::Result<Vec<ClientIdentity>> {
    raw.iter()
        .map(|value| {
            ClientIdentity::new(value.as_str())
                .with_context(|| format!("invalid blocked identity '{}'", value))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_default_state_uses_in_memory_backends() {
        let state = create_app_state().await.unwrap();

        assert!(!state.trust_proxy);
        assert_eq!(state.contact_service.transport_name(), "log");
        assert_eq!(state.rate_limiter.limit(), 10);
        assert_eq!(state.abuse_tracker.policy().max_failed_attempts, 5);
    }

    #[tokio::test]
    async fn test_configured_key_prefix() {
        let mut config = AppConfig::default();
        config.api_keys.prefix = "site".to_string();

        let state = create_app_state_with_config(&config).await.unwrap();
        let created = state
            .api_key_service
            .create("form", domain::OwnerId::new("owner-1").unwrap(), None)
            .await
            .unwrap();

        assert!(created.secret.starts_with("site_"));
    }

    #[tokio::test]
    async fn test_blocked_identities_are_seeded() {
        let config = AbuseConfig {
            blocked_identities: vec!["6.6.6.6".to_string()],
            ..AbuseConfig::default()
        };

        let tracker = create_abuse_tracker(&config).await.unwrap();

        assert!(tracker
            .is_blacklisted(&ClientIdentity::new("6.6.6.6").unwrap())
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn test_invalid_blocked_identity_rejected() {
        let config = AbuseConfig {
            blocked_identities: vec!["6.6.6.6 7.7.7.7".to_string()],
            ..AbuseConfig::default()
        };

        assert!(create_abuse_tracker(&config).await.is_err());
    }

    async fn rejects(config: AbuseConfig) -> String {
        match create_abuse_tracker(&config).await {
            Ok(_) => panic!("config should be rejected"),
            Err(e) => e.to_string(),
        }
    }

    #[tokio::test]
    async fn test_zero_max_failed_attempts_rejected() {
        let message = rejects(AbuseConfig {
            max_failed_attempts: 0,
            ..AbuseConfig::default()
        })
        .await;

        assert!(message.contains("max_failed_attempts"));
    }

    #[tokio::test]
    async fn test_non_positive_block_duration_rejected() {
        for secs in [0, -1, i64::MIN] {
            let message = rejects(AbuseConfig {
                block_duration_secs: secs,
                ..AbuseConfig::default()
            })
            .await;

            assert!(message.contains("block_duration_secs"));
        }
    }

    #[tokio::test]
    async fn test_huge_block_duration_rejected() {
        for secs in [MAX_WINDOW_SECS + 1, i64::MAX / 1000, i64::MAX] {
            let message = rejects(AbuseConfig {
                block_duration_secs: secs,
                ..AbuseConfig::default()
            })
            .await;

            assert!(message.contains("block_duration_secs"));
        }
    }

    #[tokio::test]
    async fn test_bad_rate_limit_window_rejected() {
        for secs in [0, -5, i64::MAX] {
            let message = rejects(AbuseConfig {
                rate_limit_window_secs: secs,
                ..AbuseConfig::default()
            })
            .await;

            assert!(message.contains("rate_limit_window_secs"));
        }
    }

    #[tokio::test]
    async fn test_zero_rate_limit_requests_rejected() {
        let message = rejects(AbuseConfig {
            rate_limit_requests: 0,
            ..AbuseConfig::default()
        })
        .await;

        assert!(message.contains("rate_limit_requests"));
    }

    #[tokio::test]
    async fn test_invalid_abuse_config_fails_startup() {
        let mut config = AppConfig::default();
        config.abuse.block_duration_secs = -1;

        assert!(create_app_state_with_config(&config).await.is_err());
    }

    #[test]
    fn test_window_bounds_accepted() {
        assert_eq!(window_duration("w", 1).unwrap(), Duration::seconds(1));
        assert!(window_duration("w", MAX_WINDOW_SECS).is_ok());
    }

    #[tokio::test]
    async fn test_postgres_requires_url() {
        let config = StorageConfig {
            backend: StorageBackend::Postgres,
            ..StorageConfig::default()
        };

        assert!(create_api_key_repository(&config).await.is_err());
    }

    #[test]
    fn test_http_transport_requires_relay_url() {
        let config = MailConfig {
            transport: MailTransportKind::Http,
            ..MailConfig::default()
        };

        assert!(create_mail_transport(&config).is_err());
    }
}
