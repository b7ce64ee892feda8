//! Identity header names and inbound sanitization.
//!
//! Every header in [`UNTRUSTED_IDENTITY_HEADERS`] is an assertion that only
//! the gate is allowed to make. They are stripped from every inbound request
//! before anything else runs, so a caller can never plant a trusted-looking
//! value that survives to the downstream handler.
use axum::http::{HeaderMap, HeaderName, HeaderValue};

pub const X_AUTH_TOKEN: HeaderName = HeaderName::from_static("x-auth-token");
pub const X_SUBJECT_TOKEN: HeaderName = HeaderName::from_static("x-subject-token");

pub const X_IDENTITY_STATUS: HeaderName = HeaderName::from_static("x-identity-status");
pub const X_DOMAIN_ID: HeaderName = HeaderName::from_static("x-domain-id");
pub const X_DOMAIN_NAME: HeaderName = HeaderName::from_static("x-domain-name");
pub const X_PROJECT_ID: HeaderName = HeaderName::from_static("x-project-id");
pub const X_PROJECT_NAME: HeaderName = HeaderName::from_static("x-project-name");
pub const X_PROJECT_DOMAIN_ID: HeaderName = HeaderName::from_static("x-project-domain-id");
pub const X_PROJECT_DOMAIN_NAME: HeaderName = HeaderName::from_static("x-project-domain-name");
pub const X_USER_ID: HeaderName = HeaderName::from_static("x-user-id");
pub const X_USER_NAME: HeaderName = HeaderName::from_static("x-user-name");
pub const X_USER_DOMAIN_ID: HeaderName = HeaderName::from_static("x-user-domain-id");
pub const X_USER_DOMAIN_NAME: HeaderName = HeaderName::from_static("x-user-domain-name");
pub const X_ROLES: HeaderName = HeaderName::from_static("x-roles");

pub const UNTRUSTED_IDENTITY_HEADERS: [&str; 29] = [
    "x-identity-status",
    "x-service-identity-status",
    "x-domain-id",
    "x-service-domain-id",
    "x-domain-name",
    "x-service-domain-name",
    "x-project-id",
    "x-service-project-id",
    "x-project-name",
    "x-service-project-name",
    "x-project-domain-id",
    "x-service-project-domain-id",
    "x-project-domain-name",
    "x-service-project-domain-name",
    "x-user-id",
    "x-service-user-id",
    "x-user-name",
    "x-service-user-name",
    "x-user-domain-id",
    "x-service-user-domain-id",
    "x-user-domain-name",
    "x-service-user-domain-name",
    "x-roles",
    "x-service-roles",
    "x-service-catalog",
    // deprecated
    "x-tenant-id",
    "x-tenant",
    "x-user",
    "x-role",
];

/// Value of `X-Identity-Status` after the gate ran.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentityStatus {
    Confirmed,
    Invalid,
}

impl IdentityStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Confirmed => "Confirmed",
            Self::Invalid => "Invalid",
        }
    }

    pub fn from_headers(headers: &HeaderMap) -> Self {
        match headers.get(X_IDENTITY_STATUS).map(|v| v.as_bytes()) {
            Some(b"Confirmed") => Self::Confirmed,
            _ => Self::Invalid,
        }
    }

    pub fn header_value(&self) -> HeaderValue {
        HeaderValue::from_static(self.as_str())
    }
}

/// Removes every identity assertion a client could have injected.
///
/// `HeaderMap::remove` drops all values of a repeated header, and removing an
/// absent header is a no-op, so calling this twice is the same as once.
pub fn strip_identity_headers(headers: &mut HeaderMap) {
    for name in UNTRUSTED_IDENTITY_HEADERS {
        headers.remove(name);
    }
}

/// Sets the status header, replacing whatever was there.
pub fn set_status(headers: &mut HeaderMap, status: IdentityStatus) {
    headers.insert(X_IDENTITY_STATUS, status.header_value());
}

/// Identity headers ready to be written onto a request.
pub type IdentityHeaders = Vec<(HeaderName, HeaderValue)>;

/// Encodes projected identity values as header values.
///
/// All or nothing: if any value cannot be carried in an HTTP header (control
/// characters), the name of the first offending header is returned and
/// nothing is encoded.
pub fn encode_identity_headers(
    projected: Vec<(HeaderName, String)>,
) -> Result<IdentityHeaders, HeaderName> {
    projected
        .into_iter()
        .map(|(name, value)| match HeaderValue::from_bytes(value.as_bytes()) {
            Ok(value) => Ok((name, value)),
            Err(_) => Err(name),
        })
        .collect()
}

/// Writes encoded identity headers onto the request, replacing any value.
pub fn apply_identity_headers(headers: &mut HeaderMap, encoded: IdentityHeaders) {
    for (name, value) in encoded {
        headers.insert(name, value);
    }
}
