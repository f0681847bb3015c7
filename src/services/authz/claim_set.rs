use std::collections::BTreeSet;

use thiserror::Error;

use crate::services::token::TokenClaims;

/// Verified primary-token claims, as seen by the permission gate.
///
/// Built once per request by the authentication middleware and never mutated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClaimSet {
    audiences: Vec<String>,
    app_id: String,
    roles: BTreeSet<String>,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ClaimSetError {
    #[error("token carries no application id (appid/azp)")]
    MissingAppId,
}

impl ClaimSet {
    pub fn new<I, R>(audiences: Vec<String>, app_id: impl Into<String>, roles: I) -> Self
    where
        I: IntoIterator<Item = R>,
        R: Into<String>,
    {
        Self {
            audiences,
            app_id: app_id.into(),
            roles: roles.into_iter().map(Into::into).collect(),
        }
    }

    pub fn first_audience(&self) -> Option<&str> {
        self.audiences.first().map(String::as_str)
    }

    pub fn app_id(&self) -> &str {
        &self.app_id
    }

    pub fn roles(&self) -> &BTreeSet<String> {
        &self.roles
    }

    pub fn has_role(&self, role: &str) -> bool {
        self.roles.contains(role)
    }
}

impl TryFrom<TokenClaims> for ClaimSet {
    type Error = ClaimSetError;

    fn try_from(claims: TokenClaims) -> Result<Self, Self::Error> {
        let app_id = claims
            .app_id()
            .ok_or(ClaimSetError::MissingAppId)?
            .to_string();

        Ok(Self::new(claims.aud, app_id, claims.roles))
    }
}
