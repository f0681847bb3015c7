//! Delegated (third-party) access check.
//!
//! Used only when the caller's app id differs from the resource owner it asks
//! for. The caller must present a second token, issued by the same directory
//! for `api://{resource owner}`, whose roles grant the required capability.
//!
//! Role matching here is by suffix (`granted.ends_with(required)`), unlike the
//! exact match applied to the primary token. Namespaced grants such as
//! `tenant.API.Read` rely on it.

use axum::http::{HeaderMap, HeaderName};

use crate::services::token::TokenVerifier;

use super::denial::Denial;
use super::role::normalize;

pub const SECONDARY_TOKEN_HEADER: &str = "X-Secondary-Token";
pub const SECONDARY_TOKEN_HEADER_NAME: HeaderName = HeaderName::from_static("x-secondary-token");

pub const CLIENT_AUDIENCE_SCHEME: &str = "api://";

/// Audience a delegation token must carry to act on `client_id`.
pub fn client_audience(client_id: &str) -> String {
    format!("{}{}", CLIENT_AUDIENCE_SCHEME, client_id)
}

/// True when any granted role ends with `required`.
pub fn grants_role(granted: &[String], required: &str) -> bool {
    granted.iter().any(|role| role.ends_with(required))
}

pub struct DelegationValidator<'a> {
    verifier: &'a dyn TokenVerifier,
    issuer: &'a str,
}

impl<'a> DelegationValidator<'a> {
    pub fn new(verifier: &'a dyn TokenVerifier, issuer: &'a str) -> Self {
        Self { verifier, issuer }
    }

    /// Validate the delegation proof in `headers` for `requested_client_id`.
    ///
    /// Returns the roles granted by the secondary token (token order) for the
    /// audit record. Every path that is not an explicit pass is a denial.
    pub async fn validate(
        &self,
        headers: &HeaderMap,
        requested_client_id: &str,
        required_role: Option<&str>,
    ) -> Result<Vec<String>, Denial> {
        let raw = headers
            .get(&SECONDARY_TOKEN_HEADER_NAME)
            .ok_or(Denial::MissingDelegationProof)?;

        // A header that was sent but cannot be read is still a supplied proof.
        let token = raw
            .to_str()
            .map_err(|_| Denial::InvalidDelegationToken {
                reason: "header value is not valid ASCII".to_string(),
            })?
            .trim();

        let claims = self
            .verifier
            .verify(self.issuer, token)
            .await
            .map_err(|err| Denial::InvalidDelegationToken {
                reason: err.to_string(),
            })?;

        let expected = client_audience(requested_client_id);
        match claims.first_audience() {
            Some(audience) if audience == expected => {}
            found => {
                return Err(Denial::DelegationAudienceMismatch {
                    found: found.map(str::to_string),
                    expected,
                });
            }
        }

        if let Some(role) = normalize(required_role)
            && !grants_role(&claims.roles, role)
        {
            return Err(Denial::MissingDelegatedRole {
                role: role.to_string(),
            });
        }

        Ok(claims.roles)
    }
}
