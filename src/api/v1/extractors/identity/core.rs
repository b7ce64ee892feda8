use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use crate::error::AppError;
use crate::services::identity::{IdentityStatus, Token};

use super::Identity;

/// Requires a confirmed identity.
///
/// The keystone middleware puts the resolved `Token` into the request
/// extensions; requests it marked `Invalid` are rejected with 401 here, in the
/// handler's extractor, not by the gate.
impl<S> FromRequestParts<S> for Identity
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        if IdentityStatus::from_headers(&parts.headers) != IdentityStatus::Confirmed {
            return Err(AppError::Unauthorized);
        }

        parts
            .extensions
            .get::<Token>()
            .cloned()
            .map(Identity)
            .ok_or(AppError::Unauthorized)
    }
}
