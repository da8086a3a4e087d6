// piiguard-core/src/vault/mod.rs
//! Token store contract used by tokenize and detokenize.
//!
//! A store owns the durability of `TokenMapping` records. Expiry is checked
//! lazily on read: a mapping past `expires_at` is reported as missing even
//! if it is still physically present.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::PiiGuardError;

pub mod memory;

pub use memory::MemoryTokenStore;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenMapping {
    pub token: String,
    pub entity_type: String,
    #[serde(rename = "value")]
    pub original_value: String,
    pub expires_at: DateTime<Utc>,
}

impl TokenMapping {
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }
}

#[async_trait]
pub trait TokenStore: Send + Sync {
    /// Persists a mapping. Writing the same token twice overwrites it.
    async fn put(&self, mapping: TokenMapping) -> Result<(), PiiGuardError>;

    /// Looks a token up. Missing tokens yield `TokenNotFound` and expired
    /// ones `TokenExpired`; `PiiGuardError::is_missing_token` covers both.
    async fn get(&self, token: &str) -> Result<TokenMapping, PiiGuardError>;
}
