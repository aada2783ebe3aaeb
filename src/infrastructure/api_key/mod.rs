//! API Key infrastructure implementations
//!
//! Key generation, the in-memory and PostgreSQL stores, and the lifecycle
//! service built on top of them.

mod generator;
mod postgres_repository;
mod repository;
mod service;

pub use generator::{
    hash_secret, ApiKeyGenerator, GeneratedApiKey, OsSecretSource, SecretSource,
    DEFAULT_KEY_PREFIX, MIN_KEY_BYTES,
};
pub use postgres_repository::PostgresApiKeyRepository;
pub use repository::InMemoryApiKeyRepository;
pub use service::{ApiKeyService, CreatedApiKey};

#[cfg(test)]
pub use generator::SeededSecretSource;
