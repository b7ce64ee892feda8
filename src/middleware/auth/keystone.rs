//! Keystone token gate as an axum middleware.
//!
//! Unlike a rejecting bearer middleware this one never short-circuits: the
//! request is rewritten by [`KeystoneAuth::authenticate`] and then handed to
//! `next` exactly once, annotated with `X-Identity-Status`. On success the
//! resolved [`Token`](crate::services::identity::Token) is also placed in the
//! request extensions for [`Identity`](crate::api::v1::extractors::Identity).

use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    extract::State,
    http::Request,
    middleware::{self, Next},
    response::Response,
};

use crate::services::identity::{KeystoneAuth, Token};

/// Puts the gate in front of every route of `router`.
///
/// ```ignore
/// let auth = Arc::new(KeystoneAuth::new(validator));
/// let app = middleware::auth::keystone::apply(api::v1::routes(), auth);
/// ```
pub fn apply<S>(router: Router<S>, auth: Arc<KeystoneAuth>) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    router.layer(middleware::from_fn_with_state(auth, keystone_middleware))
}

pub async fn keystone_middleware(
    State(auth): State<Arc<KeystoneAuth>>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    match auth.authenticate(req.headers_mut()).await {
        Some(token) => {
            req.extensions_mut().insert(token);
        }
        None => {
            req.extensions_mut().remove::<Token>();
        }
    }

    next.run(req).await
}
