//! Token validation against the Keystone v3 identity API.
//!
//! One call per token, never retried here. The shared `reqwest::Client` pools
//! connections and carries the timeout that bounds how long a request can wait
//! on the authority.
use std::time::Duration;

use axum::http::StatusCode;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use thiserror::Error;
use url::Url;

use crate::services::identity::headers::{X_AUTH_TOKEN, X_SUBJECT_TOKEN};
use crate::services::identity::token::{DomainScope, ProjectScope, Role, Scope, Token, User};

#[derive(Debug, Error)]
pub enum ValidateError {
    #[error("identity request failed: {0}")]
    Transport(#[source] reqwest::Error),
    #[error("identity authority rejected the token: {status}")]
    Rejected { status: StatusCode },
    #[error("malformed identity response: {0}")]
    Malformed(String),
    #[error("identity authority error {code}: {message}")]
    Authority { code: u16, message: String },
    #[error("response didn't contain token context")]
    MissingToken,
    #[error("token is not valid at {now} (issued {issued_at}, expires {expires_at})")]
    Expired {
        issued_at: DateTime<Utc>,
        expires_at: DateTime<Utc>,
        now: DateTime<Utc>,
    },
}

// Wire shapes of `GET /auth/tokens`. Unknown fields are ignored.

#[derive(Debug, Deserialize)]
struct AuthResponse {
    #[serde(default)]
    error: Option<AuthorityError>,
    #[serde(default)]
    token: Option<TokenBody>,
}

#[derive(Debug, Deserialize)]
struct AuthorityError {
    #[serde(default)]
    code: u16,
    #[serde(default)]
    message: String,
}

#[derive(Debug, Deserialize)]
struct TokenBody {
    expires_at: DateTime<Utc>,
    issued_at: DateTime<Utc>,
    user: UserBody,
    #[serde(default)]
    project: Option<ProjectBody>,
    #[serde(default)]
    domain: Option<DomainBody>,
    #[serde(default)]
    roles: Option<Vec<RoleBody>>,
}

#[derive(Debug, Deserialize)]
struct UserBody {
    id: String,
    name: String,
    domain_id: String,
    domain: DomainBody,
}

#[derive(Debug, Deserialize)]
struct ProjectBody {
    id: String,
    name: String,
    domain_id: String,
    #[serde(default)]
    domain: Option<NamedBody>,
}

#[derive(Debug, Deserialize)]
struct DomainBody {
    id: String,
    name: String,
}

#[derive(Debug, Deserialize)]
struct NamedBody {
    name: String,
}

#[derive(Debug, Deserialize)]
struct RoleBody {
    #[serde(default)]
    id: String,
    name: String,
}

impl TryFrom<TokenBody> for Token {
    type Error = ValidateError;

    fn try_from(body: TokenBody) -> Result<Self, Self::Error> {
        let scope = match (body.project, body.domain) {
            (None, None) => Scope::Unscoped,
            (Some(project), None) => Scope::Project(ProjectScope {
                id: project.id,
                name: project.name,
                domain_id: project.domain_id,
                domain_name: project.domain.map(|d| d.name),
            }),
            (None, Some(domain)) => Scope::Domain(DomainScope {
                id: domain.id,
                name: domain.name,
            }),
            (Some(_), Some(_)) => {
                return Err(ValidateError::Malformed(
                    "token is both project and domain scoped".to_string(),
                ));
            }
        };

        Ok(Token {
            issued_at: body.issued_at,
            expires_at: body.expires_at,
            user: User {
                id: body.user.id,
                name: body.user.name,
                domain_id: body.user.domain_id,
                domain_name: body.user.domain.name,
            },
            scope,
            roles: body.roles.map(|roles| {
                roles
                    .into_iter()
                    .map(|r| Role {
                        id: r.id,
                        name: r.name,
                    })
                    .collect()
            }),
        })
    }
}

/// Validates raw tokens against `{endpoint}/auth/tokens?nocatalog`.
#[derive(Clone, Debug)]
pub struct Validator {
    client: reqwest::Client,
    tokens_url: Url,
}

impl Validator {
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

    pub fn new(
        endpoint: &Url,
        user_agent: &str,
        timeout: Duration,
    ) -> Result<Self, ValidatorBuildError> {
        let client = reqwest::Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .build()
            .map_err(ValidatorBuildError::Client)?;

        Self::with_client(endpoint, client)
    }

    /// Reuses an existing client. The client's own timeout and user agent apply.
    pub fn with_client(endpoint: &Url, client: reqwest::Client) -> Result<Self, ValidatorBuildError> {
        Ok(Self {
            client,
            tokens_url: tokens_url(endpoint)?,
        })
    }

    pub fn tokens_url(&self) -> &Url {
        &self.tokens_url
    }

    pub async fn validate(&self, token: &str) -> Result<Token, ValidateError> {
        let resp = self
            .client
            .get(self.tokens_url.clone())
            .header(X_AUTH_TOKEN, token)
            .header(X_SUBJECT_TOKEN, token)
            .send()
            .await
            .map_err(ValidateError::Transport)?;

        let status = resp.status();
        if status.as_u16() >= 400 {
            return Err(ValidateError::Rejected { status });
        }

        let bytes = resp.bytes().await.map_err(ValidateError::Transport)?;
        let body: AuthResponse =
            serde_json::from_slice(&bytes).map_err(|e| ValidateError::Malformed(e.to_string()))?;

        if let Some(err) = body.error {
            return Err(ValidateError::Authority {
                code: err.code,
                message: err.message,
            });
        }
        // Keystone answers a successful validation with 200 only.
        if status != StatusCode::OK {
            return Err(ValidateError::Rejected { status });
        }

        let token = Token::try_from(body.token.ok_or(ValidateError::MissingToken)?)?;

        let now = Utc::now();
        if !token.is_valid_at(now) {
            return Err(ValidateError::Expired {
                issued_at: token.issued_at,
                expires_at: token.expires_at,
                now,
            });
        }

        Ok(token)
    }
}

#[derive(Debug, Error)]
pub enum ValidatorBuildError {
    #[error("failed to build http client: {0}")]
    Client(#[source] reqwest::Error),
    #[error("invalid identity endpoint {endpoint}: {source}")]
    Endpoint {
        endpoint: String,
        #[source]
        source: url::ParseError,
    },
}

fn tokens_url(endpoint: &Url) -> Result<Url, ValidatorBuildError> {
    let base = endpoint.as_str().trim_end_matches('/');
    Url::parse(&format!("{base}/auth/tokens?nocatalog")).map_err(|source| {
        ValidatorBuildError::Endpoint {
            endpoint: endpoint.to_string(),
            source,
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokens_url_appends_path_once() {
        let with_slash = Url::parse("https://keystone.example:5000/v3/").unwrap();
        let without = Url::parse("https://keystone.example:5000/v3").unwrap();

        assert_eq!(
            tokens_url(&with_slash).unwrap().as_str(),
            "https://keystone.example:5000/v3/auth/tokens?nocatalog"
        );
        assert_eq!(tokens_url(&with_slash).unwrap(), tokens_url(&without).unwrap());
    }

    #[test]
    fn wire_token_with_both_scopes_is_malformed() {
        let body: TokenBody = serde_json::from_value(serde_json::json!({
            "expires_at": "2099-01-01T00:00:00.000000Z",
            "issued_at": "2015-10-08T07:40:33.099Z",
            "user": {
                "id": "u-1", "name": "arc", "domain_id": "d-1",
                "domain": { "id": "d-1", "name": "dom" }
            },
            "project": { "id": "p-1", "name": "Arc", "domain_id": "d-1" },
            "domain": { "id": "d-1", "name": "dom" }
        }))
        .unwrap();

        assert!(matches!(
            Token::try_from(body),
            Err(ValidateError::Malformed(_))
        ));
    }

    #[test]
    fn wire_roles_null_stays_absent() {
        let body: TokenBody = serde_json::from_value(serde_json::json!({
            "expires_at": "2099-01-01T00:00:00Z",
            "issued_at": "2015-10-08T07:40:33Z",
            "user": {
                "id": "u-1", "name": "arc", "domain_id": "d-1",
                "domain": { "id": "d-1", "name": "dom" }
            },
            "roles": null
        }))
        .unwrap();

        let token = Token::try_from(body).unwrap();
        assert_eq!(token.scope, Scope::Unscoped);
        assert!(token.roles.is_none());
    }
}
