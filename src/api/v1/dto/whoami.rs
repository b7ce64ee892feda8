/*
 * Responsibility
 * - Response DTO of GET /whoami
 */
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::services::identity::{Scope, Token};

#[derive(Debug, Serialize)]
pub struct WhoAmIResponse {
    pub user: UserView,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project: Option<ProjectView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub domain: Option<DomainView>,
    // `None` when the authority sent no role list, `Some([])` when it sent an empty one.
    pub roles: Option<Vec<String>>,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct UserView {
    pub id: String,
    pub name: String,
    pub domain_id: String,
    pub domain_name: String,
}

#[derive(Debug, Serialize)]
pub struct ProjectView {
    pub id: String,
    pub name: String,
    pub domain_id: String,
    pub domain_name: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct DomainView {
    pub id: String,
    pub name: String,
}

impl From<Token> for WhoAmIResponse {
    fn from(token: Token) -> Self {
        let (project, domain) = match token.scope {
            Scope::Unscoped => (None, None),
            Scope::Project(p) => (
                Some(ProjectView {
                    id: p.id,
                    name: p.name,
                    domain_id: p.domain_id,
                    domain_name: p.domain_name,
                }),
                None,
            ),
            Scope::Domain(d) => (
                None,
                Some(DomainView {
                    id: d.id,
                    name: d.name,
                }),
            ),
        };

        Self {
            user: UserView {
                id: token.user.id,
                name: token.user.name,
                domain_id: token.user.domain_id,
                domain_name: token.user.domain_name,
            },
            project,
            domain,
            roles: token
                .roles
                .map(|roles| roles.into_iter().map(|r| r.name).collect()),
            expires_at: token.expires_at,
        }
    }
}
