/*
 * Responsibility
 * - identity: token validation, caching decision, header rewriting (the gate)
 * - cache: key/value backends the gate caches validated tokens in
 */
pub mod cache;
pub mod identity;
