//! Hook for observing gate outcomes.
//!
//! The gate never fails a request on its own authority, so validation errors
//! would otherwise vanish. Every outcome is handed to an [`AuthObserver`];
//! [`TracingObserver`] is the default and logs through `tracing`.
use std::time::Duration;

use crate::services::identity::token::Token;
use crate::services::identity::validator::ValidateError;

#[derive(Debug)]
pub enum AuthEvent<'a> {
    /// Request carried no `X-Auth-Token`.
    NoToken,
    CacheHit { token: &'a Token },
    /// Resolved by the authority. `cache_ttl` is `None` when nothing was cached.
    Validated {
        token: &'a Token,
        cache_ttl: Option<Duration>,
    },
    Rejected { error: &'a ValidateError },
}

pub trait AuthObserver: Send + Sync {
    fn observe(&self, event: AuthEvent<'_>);
}

#[derive(Clone, Copy, Debug, Default)]
pub struct TracingObserver;

impl AuthObserver for TracingObserver {
    fn observe(&self, event: AuthEvent<'_>) {
        match event {
            AuthEvent::NoToken => tracing::debug!("request without auth token"),
            AuthEvent::CacheHit { token } => {
                tracing::debug!(user_id = %token.user.id, "token from cache")
            }
            AuthEvent::Validated { token, cache_ttl } => tracing::debug!(
                user_id = %token.user.id,
                expires_at = %token.expires_at,
                cache_ttl = ?cache_ttl,
                "token validated"
            ),
            AuthEvent::Rejected { error } => {
                tracing::warn!(error = %error, "failed to validate token")
            }
        }
    }
}
