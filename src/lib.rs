//! Authentication gate for axum services backed by OpenStack Keystone.
//!
//! Every request passes through [`middleware::auth::keystone`], which strips
//! caller-supplied identity headers, validates `X-Auth-Token` against the
//! identity API (optionally through a token cache), and rewrites the request
//! with `X-Identity-Status` plus the `X-User-*`, `X-Project-*`, `X-Domain-*`
//! and `X-Roles` headers. It never rejects a request; handlers decide.
//!
//! ```ignore
//! use std::sync::Arc;
//! use keystone_gate::{middleware, services::identity::{KeystoneAuth, Validator}};
//!
//! let validator = Validator::new(&endpoint, "my-service/1.0", Validator::DEFAULT_TIMEOUT)?;
//! let auth = Arc::new(KeystoneAuth::new(validator));
//! let app = middleware::auth::keystone::apply(router, auth);
//! ```
pub mod api;
pub mod app;
pub mod config;
pub mod error;
pub mod middleware;
pub mod services;
pub mod state;
