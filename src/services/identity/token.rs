//! Identity record produced by a successful token validation.
//!
//! The authority answers with one of three token shapes (unscoped,
//! project-scoped, domain-scoped). `Token` keeps that distinction as an
//! explicit [`Scope`] variant instead of two independent optionals, and keeps
//! `roles` as `Option<Vec<_>>` so "no role information" and "zero roles" stay
//! distinguishable until the headers are built.
use axum::http::HeaderName;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::services::identity::headers::{
    X_DOMAIN_ID, X_DOMAIN_NAME, X_PROJECT_DOMAIN_ID, X_PROJECT_DOMAIN_NAME, X_PROJECT_ID,
    X_PROJECT_NAME, X_ROLES, X_USER_DOMAIN_ID, X_USER_DOMAIN_NAME, X_USER_ID, X_USER_NAME,
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub name: String,
    pub domain_id: String,
    pub domain_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectScope {
    pub id: String,
    pub name: String,
    pub domain_id: String,
    // Sourced from the project's embedded domain object, which the authority may omit.
    pub domain_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DomainScope {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Scope {
    Unscoped,
    Project(ProjectScope),
    Domain(DomainScope),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    pub id: String,
    pub name: String,
}

/// A validated identity. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub user: User,
    pub scope: Scope,
    pub roles: Option<Vec<Role>>,
}

impl Token {
    /// `issued_at <= now < expires_at`
    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        self.issued_at <= now && now < self.expires_at
    }

    pub fn project(&self) -> Option<&ProjectScope> {
        match &self.scope {
            Scope::Project(project) => Some(project),
            _ => None,
        }
    }

    pub fn domain(&self) -> Option<&DomainScope> {
        match &self.scope {
            Scope::Domain(domain) => Some(domain),
            _ => None,
        }
    }

    /// Role names joined with `,` in authority order, or `None` when the
    /// authority returned no role list at all.
    pub fn role_names(&self) -> Option<String> {
        self.roles.as_ref().map(|roles| {
            roles
                .iter()
                .map(|r| r.name.as_str())
                .collect::<Vec<_>>()
                .join(",")
        })
    }

    /// Flattens the record into the identity headers handed to downstream
    /// handlers. Absent optional fields produce no entry.
    pub fn headers(&self) -> Vec<(HeaderName, String)> {
        let mut headers = vec![
            (X_USER_ID, self.user.id.clone()),
            (X_USER_NAME, self.user.name.clone()),
            (X_USER_DOMAIN_ID, self.user.domain_id.clone()),
            (X_USER_DOMAIN_NAME, self.user.domain_name.clone()),
        ];

        match &self.scope {
            Scope::Unscoped => {}
            Scope::Project(project) => {
                headers.push((X_PROJECT_ID, project.id.clone()));
                headers.push((X_PROJECT_NAME, project.name.clone()));
                headers.push((X_PROJECT_DOMAIN_ID, project.domain_id.clone()));
                if let Some(domain_name) = &project.domain_name {
                    headers.push((X_PROJECT_DOMAIN_NAME, domain_name.clone()));
                }
            }
            Scope::Domain(domain) => {
                headers.push((X_DOMAIN_ID, domain.id.clone()));
                headers.push((X_DOMAIN_NAME, domain.name.clone()));
            }
        }

        if let Some(roles) = self.role_names() {
            headers.push((X_ROLES, roles));
        }

        headers
    }
}
