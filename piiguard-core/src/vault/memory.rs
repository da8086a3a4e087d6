// piiguard-core/src/vault/memory.rs
//! Process-local token store.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use log::debug;
use tokio::sync::RwLock;

use crate::errors::PiiGuardError;
use crate::vault::{TokenMapping, TokenStore};

#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    entries: RwLock<HashMap<String, TokenMapping>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    /// Physically removes expired mappings. Returns how many were dropped.
    pub async fn purge_expired(&self) -> usize {
        let now = Utc::now();
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|_, m| !m.is_expired_at(now));
        before - entries.len()
    }
}

#[async_trait]
impl TokenStore for MemoryTokenStore {
    async fn put(&self, mapping: TokenMapping) -> Result<(), PiiGuardError> {
        debug!("Storing token mapping for type '{}'", mapping.entity_type);
        self.entries.write().await.insert(mapping.token.clone(), mapping);
        Ok(())
    }

    async fn get(&self, token: &str) -> Result<TokenMapping, PiiGuardError> {
        let entries = self.entries.read().await;
        match entries.get(token) {
            None => Err(PiiGuardError::TokenNotFound(token.to_string())),
            Some(m) if m.is_expired() => Err(PiiGuardError::TokenExpired(token.to_string())),
            Some(m) => Ok(m.clone()),
        }
    }
}
