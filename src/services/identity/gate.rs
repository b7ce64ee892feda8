//! The authentication gate.
//!
//! `authenticate` runs the whole per-request flow on a header map:
//!
//! ```text
//! sanitize -> Invalid -> no token?      -> done
//!                     -> cache hit?     -> project -> Confirmed
//!                     -> validate ok?   -> project -> cache write -> Confirmed
//!                     -> validate err or unprojectable -> done
//! ```
//!
//! It never fails. Whatever happens, the caller forwards the request
//! afterwards and the downstream handler makes the access decision.
use std::{sync::Arc, time::Duration};

use axum::http::HeaderMap;
use chrono::Utc;

use crate::services::cache::TokenCache;
use crate::services::identity::headers::{
    IdentityHeaders, IdentityStatus, X_AUTH_TOKEN, apply_identity_headers,
    encode_identity_headers, set_status, strip_identity_headers,
};
use crate::services::identity::observer::{AuthEvent, AuthObserver, TracingObserver};
use crate::services::identity::token::Token;
use crate::services::identity::validator::{ValidateError, Validator};

#[derive(Clone)]
pub struct KeystoneAuth {
    validator: Validator,
    cache: Option<Arc<dyn TokenCache>>,
    cache_time: Duration,
    observer: Arc<dyn AuthObserver>,
}

impl std::fmt::Debug for KeystoneAuth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeystoneAuth")
            .field("validator", &self.validator)
            .field("cache", &self.cache_backend())
            .field("cache_time", &self.cache_time)
            .finish()
    }
}

impl KeystoneAuth {
    pub const DEFAULT_CACHE_TIME: Duration = Duration::from_secs(5 * 60);

    pub fn new(validator: Validator) -> Self {
        Self {
            validator,
            cache: None,
            cache_time: Self::DEFAULT_CACHE_TIME,
            observer: Arc::new(TracingObserver),
        }
    }

    pub fn with_cache(mut self, cache: Arc<dyn TokenCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Upper bound on how long a validated token is cached. Zero keeps the default.
    pub fn with_cache_time(mut self, cache_time: Duration) -> Self {
        if !cache_time.is_zero() {
            self.cache_time = cache_time;
        }
        self
    }

    pub fn with_observer(mut self, observer: Arc<dyn AuthObserver>) -> Self {
        self.observer = observer;
        self
    }

    pub fn cache_time(&self) -> Duration {
        self.cache_time
    }

    /// Name of the configured cache backend, `None` when caching is off.
    pub fn cache_backend(&self) -> Option<&'static str> {
        self.cache.as_ref().map(|c| c.backend_name())
    }

    /// Rewrites `headers` in place and returns the resolved identity, if any.
    ///
    /// On return `X-Identity-Status` is always set and no caller-supplied
    /// identity header is left.
    pub async fn authenticate(&self, headers: &mut HeaderMap) -> Option<Token> {
        strip_identity_headers(headers);
        set_status(headers, IdentityStatus::Invalid);

        let raw = match headers.get(X_AUTH_TOKEN).map(|v| v.to_str()) {
            Some(Ok(raw)) if !raw.is_empty() => raw.to_string(),
            _ => {
                self.observer.observe(AuthEvent::NoToken);
                return None;
            }
        };

        let (token, identity) = match self.resolve(&raw).await {
            Ok(resolved) => resolved,
            Err(error) => {
                self.observer.observe(AuthEvent::Rejected { error: &error });
                return None;
            }
        };

        apply_identity_headers(headers, identity);
        set_status(headers, IdentityStatus::Confirmed);

        Some(token)
    }

    /// Cache lookup, then validation and cache write on a miss.
    ///
    /// A token whose identity cannot be written as headers is `Malformed`
    /// and never cached.
    pub async fn resolve(&self, raw: &str) -> Result<(Token, IdentityHeaders), ValidateError> {
        if let Some(cache) = &self.cache
            && let Some(token) = cache.get(raw).await
        {
            let identity = project(&token)?;
            self.observer.observe(AuthEvent::CacheHit { token: &token });
            return Ok((token, identity));
        }

        let token = self.validator.validate(raw).await?;
        let identity = project(&token)?;

        let mut cache_ttl = None;
        if let Some(cache) = &self.cache
            && let Some(ttl) = self.ttl_for(&token)
        {
            cache.set(raw, &token, ttl).await;
            cache_ttl = Some(ttl);
        }

        self.observer.observe(AuthEvent::Validated {
            token: &token,
            cache_ttl,
        });

        Ok((token, identity))
    }

    /// `min(cache_time, expires_at - now)`, or `None` when the token has no
    /// remaining lifetime.
    pub fn ttl_for(&self, token: &Token) -> Option<Duration> {
        let remaining = (token.expires_at - Utc::now()).to_std().ok()?;
        if remaining.is_zero() {
            return None;
        }
        Some(remaining.min(self.cache_time))
    }
}

fn project(token: &Token) -> Result<IdentityHeaders, ValidateError> {
    encode_identity_headers(token.headers()).map_err(|header| {
        ValidateError::Malformed(format!("{header} value is not a valid header value"))
    })
}
