/*
 * Responsibility
 * - Public surface of the middleware stack
 * - auth::keystone: identity gate, http: request id / tracing / limits
 */
pub mod auth;
pub mod http;
