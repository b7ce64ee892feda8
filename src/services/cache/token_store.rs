//! Typed token cache consumed by the gate.
//!
//! The contract key is the raw token string. Failures never reach the caller:
//! a failed write means the next request validates again, and an entry that
//! cannot be decoded back into a [`Token`] is a miss.
use async_trait::async_trait;
use sha2::{Digest, Sha256};
use std::time::Duration;

use crate::services::cache::client::CacheClient;
use crate::services::identity::token::Token;

#[async_trait]
pub trait TokenCache: Send + Sync {
    fn backend_name(&self) -> &'static str;

    /// Stores `token` under `key`, expiring after `ttl`. Best effort.
    async fn set(&self, key: &str, token: &Token, ttl: Duration);

    /// `None` on miss, backend failure, or an undecodable entry.
    async fn get(&self, key: &str) -> Option<Token>;
}

/// [`TokenCache`] over any [`CacheClient`], storing tokens as JSON.
///
/// Storage keys are `<prefix>:<sha256(token)>` so raw credentials are never
/// written to a shared backend.
#[derive(Clone, Debug)]
pub struct CachedTokenStore<C: CacheClient> {
    cache: C,
    prefix: String,
}

impl<C: CacheClient> CachedTokenStore<C> {
    pub const DEFAULT_PREFIX: &'static str = "keystone:token";

    pub fn new(cache: C) -> Self {
        Self::new_with_prefix(cache, Self::DEFAULT_PREFIX)
    }

    pub fn new_with_prefix(cache: C, prefix: impl Into<String>) -> Self {
        Self {
            cache,
            prefix: prefix.into(),
        }
    }

    pub fn key(&self, raw: &str) -> String {
        let digest = Sha256::digest(raw.as_bytes());
        format!("{}:{}", self.prefix, hex::encode(digest))
    }

    pub fn client(&self) -> &C {
        &self.cache
    }
}

#[async_trait]
impl<C: CacheClient> TokenCache for CachedTokenStore<C> {
    fn backend_name(&self) -> &'static str {
        self.cache.backend_name()
    }

    async fn set(&self, key: &str, token: &Token, ttl: Duration) {
        let value = match serde_json::to_string(token) {
            Ok(value) => value,
            Err(err) => {
                tracing::warn!(error = %err, "failed to encode token for cache");
                return;
            }
        };

        if let Err(err) = self.cache.set_with_ttl(&self.key(key), &value, ttl).await {
            tracing::warn!(
                backend = self.cache.backend_name(),
                error = %err,
                "token cache write failed"
            );
        }
    }

    async fn get(&self, key: &str) -> Option<Token> {
        let full_key = self.key(key);

        let raw = match self.cache.get_string(&full_key).await {
            Ok(raw) => raw?,
            Err(err) => {
                tracing::warn!(
                    backend = self.cache.backend_name(),
                    error = %err,
                    "token cache read failed"
                );
                return None;
            }
        };

        match serde_json::from_str::<Token>(&raw) {
            Ok(token) => Some(token),
            Err(err) => {
                tracing::warn!(
                    backend = self.cache.backend_name(),
                    error = %err,
                    "dropping undecodable token cache entry"
                );
                self.cache.del(&full_key).await.ok();
                None
            }
        }
    }
}
