/*
 * Responsibility
 * - The identity a handler sees once the keystone gate confirmed the caller
 * - Same data the gate projected onto X-User-* / X-Project-* / X-Domain-* / X-Roles
 */
use crate::services::identity::{DomainScope, ProjectScope, Token};

/// Confirmed caller of the current request.
#[derive(Debug, Clone)]
pub struct Identity(pub Token);

impl Identity {
    pub fn user_id(&self) -> &str {
        &self.0.user.id
    }

    pub fn project(&self) -> Option<&ProjectScope> {
        self.0.project()
    }

    pub fn domain(&self) -> Option<&DomainScope> {
        self.0.domain()
    }

    /// `false` both when the token carried no roles and when it carried no role list.
    pub fn has_role(&self, name: &str) -> bool {
        self.0
            .roles
            .as_deref()
            .is_some_and(|roles| roles.iter().any(|r| r.name == name))
    }
}
