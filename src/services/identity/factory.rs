//! Factory: build the keystone gate from application `Config`.
use std::sync::Arc;

use thiserror::Error;

use crate::config::{Config, TokenCacheBackend};
use crate::services::cache::{CacheError, CachedTokenStore, MemoryCache, ValkeyClient};
use crate::services::identity::gate::KeystoneAuth;
use crate::services::identity::validator::{Validator, ValidatorBuildError};

#[derive(Debug, Error)]
pub enum GateError {
    #[error(transparent)]
    Validator(#[from] ValidatorBuildError),
    #[error("token cache unavailable: {0}")]
    Cache(#[from] CacheError),
}

pub async fn build_keystone_auth(config: &Config) -> Result<Arc<KeystoneAuth>, GateError> {
    let validator = Validator::new(
        &config.keystone_endpoint,
        &config.keystone_user_agent,
        config.keystone_timeout,
    )?;

    let mut auth = KeystoneAuth::new(validator).with_cache_time(config.token_cache_time);

    match &config.token_cache {
        TokenCacheBackend::Disabled => {}
        TokenCacheBackend::Memory => {
            auth = auth.with_cache(Arc::new(CachedTokenStore::new_with_prefix(
                MemoryCache::new(),
                config.token_cache_prefix.clone(),
            )));
        }
        TokenCacheBackend::Valkey(url) => {
            auth = auth.with_cache(Arc::new(CachedTokenStore::new_with_prefix(
                ValkeyClient::new(url).await?,
                config.token_cache_prefix.clone(),
            )));
        }
    }

    Ok(Arc::new(auth))
}
