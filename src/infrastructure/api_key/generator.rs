//! API Key generation
//!
//! Generates random API keys and the SHA-256 digest that is stored in their
//! place. The digest is lowercase hex everywhere, for generation and lookup.

use std::fmt::Debug;
use std::sync::Arc;

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use rand::rngs::OsRng;
use rand::RngCore;
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

/// Default prefix for issued keys
pub const DEFAULT_KEY_PREFIX: &str = "mail";

/// Smallest accepted amount of entropy per key
pub const MIN_KEY_BYTES: usize = 24;

const DEFAULT_KEY_BYTES: usize = 32;

/// Source of random bytes for key material
pub trait SecretSource: Send + Sync + Debug {
    fn fill(&self, dest: &mut [u8]);
}

/// Operating system CSPRNG
#[derive(Debug, Clone, Copy, Default)]
pub struct OsSecretSource;

impl SecretSource for OsSecretSource {
    fn fill(&self, dest: &mut [u8]) {
        OsRng.fill_bytes(dest);
    }
}

/// Deterministic source for tests
#[cfg(test)]
#[derive(Debug)]
pub struct SeededSecretSource {
    rng: std::sync::Mutex<rand::rngs::StdRng>,
}

#[cfg(test)]
impl SeededSecretSource {
    pub fn new(seed: u64) -> Self {
        use rand::SeedableRng;

        Self {
            rng: std::sync::Mutex::new(rand::rngs::StdRng::seed_from_u64(seed)),
        }
    }
}

#[cfg(test)]
impl SecretSource for SeededSecretSource {
    fn fill(&self, dest: &mut [u8]) {
        self.rng.lock().unwrap().fill_bytes(dest);
    }
}

/// Result of generating a new API key
#[derive(Clone)]
pub struct GeneratedApiKey {
    /// The full API key (only shown once at creation)
    pub key: String,
    /// The hashed key for storage
    pub hash: String,
}

impl Debug for GeneratedApiKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeneratedApiKey")
            .field("key", &"[redacted]")
            .field("hash", &self.hash)
            .finish()
    }
}

/// Generator for secure API keys
#[derive(Debug, Clone)]
pub struct ApiKeyGenerator {
    /// Prepended as `<prefix>_`; empty means no prefix
    prefix: String,
    key_bytes: usize,
    source: Arc<dyn SecretSource>,
}

impl ApiKeyGenerator {
    /// Create a new API key generator
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            key_bytes: DEFAULT_KEY_BYTES,
            source: Arc::new(OsSecretSource),
        }
    }

    /// Set the number of random bytes, never below `MIN_KEY_BYTES`
    pub fn with_key_bytes(mut self, bytes: usize) -> Self {
        self.key_bytes = bytes.max(MIN_KEY_BYTES);
        self
    }

    /// Replace the randomness source
    pub fn with_source(mut self, source: Arc<dyn SecretSource>) -> Self {
        self.source = source;
        self
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Generate a new API key
    pub fn generate(&self) -> GeneratedApiKey {
        let mut random_bytes = vec![0u8; self.key_bytes];
        self.source.fill(&mut random_bytes);

        let encoded = URL_SAFE_NO_PAD.encode(&random_bytes);
        let key = if self.prefix.is_empty() {
            encoded
        } else {
            format!("{}_{}", self.prefix, encoded)
        };

        let hash = digest_hex(&key);

        GeneratedApiKey { key, hash }
    }

    /// Hash an API key for storage or lookup. Empty keys have no hash.
    pub fn hash_key(&self, key: &str) -> Option<String> {
        hash_secret(key)
    }

    /// Verify an API key against a stored hash in constant time
    pub fn verify_key(&self, key: &str, stored_hash: &str) -> bool {
        match hash_secret(key) {
            Some(computed) => computed.as_bytes().ct_eq(stored_hash.as_bytes()).into(),
            None => false,
        }
    }
}

impl Default for ApiKeyGenerator {
    fn default() -> Self {
        Self::new(DEFAULT_KEY_PREFIX)
    }
}

/// SHA-256 of the full secret as lowercase hex, `None` for an empty secret
pub fn hash_secret(secret: &str) -> Option<String> {
    if secret.is_empty() {
        return None;
    }

    Some(digest_hex(secret))
}

fn digest_hex(value: &str) -> String {
    hex::encode(Sha256::digest(value.as_bytes()))
}
