/*!
 * Identity extractor
 *
 * Responsibility:
 * - Hand the gate's confirmed identity to handlers as a typed value
 * - axum-specific code lives in core, the type in types
 *
 * Public API:
 * - Identity
 */

mod core;
mod types;

pub use types::Identity;
