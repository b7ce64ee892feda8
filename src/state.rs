/*
 * Responsibility
 * - Shared context attached to the Router (AppState)
 *   - auth: the keystone gate (also handed to the middleware)
 * - Cheap to Clone (Arc inside)
 */
use std::sync::Arc;

use crate::services::identity::KeystoneAuth;

#[derive(Clone, Debug)]
pub struct AppState {
    pub auth: Arc<KeystoneAuth>,
}

impl AppState {
    pub fn new(auth: Arc<KeystoneAuth>) -> Self {
        Self { auth }
    }
}
