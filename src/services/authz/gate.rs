//! Permission gate: the single authorization entry point for protected handlers.
//!
//! Decision order (linear, no retries):
//! principal -> audience -> role (if required) -> identity compare
//! -> { same app: granted | other app: delegation check -> granted }
//!
//! A failed step ends the request with a `Denial`; nothing after it runs.

use std::sync::Arc;

use axum::http::HeaderMap;

use crate::config::DirectoryConfig;
use crate::services::token::TokenVerifier;

use super::audience::validate_audience;
use super::claim_set::ClaimSet;
use super::context::{AuthContext, AuthContextBuilder};
use super::delegation::DelegationValidator;
use super::denial::{Denial, PermissionError};
use super::role::{normalize, require_role};

/// Target type understood by `has_permission`: the id is a resource owner's app id.
pub const CLIENT_ID_TARGET: &str = "ClientId";

/// Inputs of one authorization decision.
#[derive(Debug, Clone, Copy)]
pub struct PermissionRequest<'a> {
    pub principal: Option<&'a ClaimSet>,
    /// Resource owner the caller wants to act on. `None` skips the identity check.
    pub client_id: Option<&'a str>,
    pub required_role: Option<&'a str>,
    pub headers: &'a HeaderMap,
}

#[derive(Clone)]
pub struct PermissionGate {
    directory: Arc<DirectoryConfig>,
    verifier: Arc<dyn TokenVerifier>,
}

impl std::fmt::Debug for PermissionGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PermissionGate")
            .field("directory", &self.directory)
            .finish_non_exhaustive()
    }
}

impl PermissionGate {
    pub fn new(directory: DirectoryConfig, verifier: Arc<dyn TokenVerifier>) -> Self {
        Self {
            directory: Arc::new(directory),
            verifier,
        }
    }

    pub fn directory(&self) -> &DirectoryConfig {
        &self.directory
    }

    pub fn verifier(&self) -> &dyn TokenVerifier {
        self.verifier.as_ref()
    }

    /// Run every applicable check and return the granted context or the first denial.
    pub async fn authorize(&self, request: PermissionRequest<'_>) -> Result<AuthContext, Denial> {
        let result = self.evaluate(request).await;

        match &result {
            Ok(ctx) => tracing::debug!(
                requester = ctx.requester_id(),
                requested_client = ?ctx.requested_client_id(),
                required_role = ?ctx.required_role(),
                audience = ctx.audience(),
                roles = ?ctx.roles(),
                third_party = ctx.is_third_party_access_attempt(),
                client_roles = ?ctx.client_roles(),
                api_client_id = ctx.api_client_id(),
                tenant_id = ctx.tenant_id(),
                "authorization granted"
            ),
            Err(denial) => tracing::warn!(
                requester = ?request.principal.map(ClaimSet::app_id),
                requested_client = ?request.client_id,
                required_role = ?request.required_role,
                reason = %denial,
                "authorization denied"
            ),
        }

        result
    }

    /// Audience and optional role only; no resource-owner comparison.
    pub async fn validate_token(
        &self,
        principal: Option<&ClaimSet>,
        required_role: Option<&str>,
        headers: &HeaderMap,
    ) -> Result<AuthContext, Denial> {
        self.authorize(PermissionRequest {
            principal,
            client_id: None,
            required_role,
            headers,
        })
        .await
    }

    /// Explicit form of a `hasPermission(targetId, targetType, permission)` check.
    ///
    /// Only `ClientId` targets are understood; anything else is reported as
    /// `UnsupportedTargetType` instead of a denial.
    pub async fn has_permission(
        &self,
        principal: Option<&ClaimSet>,
        target_id: &str,
        target_type: &str,
        permission: &str,
        headers: &HeaderMap,
    ) -> Result<AuthContext, PermissionError> {
        if target_type != CLIENT_ID_TARGET {
            return Err(PermissionError::UnsupportedTargetType(
                target_type.to_string(),
            ));
        }

        let ctx = self
            .authorize(PermissionRequest {
                principal,
                client_id: Some(target_id),
                required_role: Some(permission),
                headers,
            })
            .await?;
        Ok(ctx)
    }

    async fn evaluate(&self, request: PermissionRequest<'_>) -> Result<AuthContext, Denial> {
        let claims = request
            .principal
            .ok_or(Denial::MissingOrInvalidPrincipal)?;

        let audience = validate_audience(claims, &self.directory.app_id_uri)?;

        let required_role = normalize(request.required_role);
        require_role(claims, required_role)?;

        let client_id = request.client_id.filter(|id| !id.is_empty());
        let builder = AuthContextBuilder::new(&self.directory, claims, audience)
            .requested(client_id, required_role);

        match client_id {
            Some(client_id) if client_id != claims.app_id() => {
                let client_roles =
                    DelegationValidator::new(self.verifier.as_ref(), &self.directory.issuer)
                        .validate(request.headers, client_id, required_role)
                        .await?;
                Ok(builder.third_party(client_roles))
            }
            _ => Ok(builder.first_party()),
        }
    }
}
