use std::collections::BTreeSet;

use serde::Serialize;

use crate::config::DirectoryConfig;

use super::claim_set::ClaimSet;

/// Record of a granted authorization decision.
///
/// Only ever produced for a request that passed every applicable check, so
/// there is no "partially filled" state. `client_roles` is present exactly when
/// the request was a third-party access attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthContext {
    audience: String,
    requester_id: String,
    requested_client_id: Option<String>,
    required_role: Option<String>,
    roles: BTreeSet<String>,
    is_third_party_access_attempt: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    client_roles: Option<Vec<String>>,
    api_client_id: String,
    tenant_id: String,
}

impl AuthContext {
    pub fn audience(&self) -> &str {
        &self.audience
    }

    pub fn requester_id(&self) -> &str {
        &self.requester_id
    }

    pub fn requested_client_id(&self) -> Option<&str> {
        self.requested_client_id.as_deref()
    }

    pub fn required_role(&self) -> Option<&str> {
        self.required_role.as_deref()
    }

    pub fn roles(&self) -> &BTreeSet<String> {
        &self.roles
    }

    pub fn is_third_party_access_attempt(&self) -> bool {
        self.is_third_party_access_attempt
    }

    pub fn client_roles(&self) -> Option<&[String]> {
        self.client_roles.as_deref()
    }

    pub fn api_client_id(&self) -> &str {
        &self.api_client_id
    }

    pub fn tenant_id(&self) -> &str {
        &self.tenant_id
    }
}

/// Collects the pieces of an `AuthContext` while the gate runs its checks.
///
/// Finishing is split into `first_party` / `third_party` so the
/// third-party flag and the delegated roles can't disagree.
pub struct AuthContextBuilder {
    audience: String,
    requester_id: String,
    requested_client_id: Option<String>,
    required_role: Option<String>,
    roles: BTreeSet<String>,
    api_client_id: String,
    tenant_id: String,
}

impl AuthContextBuilder {
    pub fn new(directory: &DirectoryConfig, claims: &ClaimSet, audience: &str) -> Self {
        Self {
            audience: audience.to_string(),
            requester_id: claims.app_id().to_string(),
            requested_client_id: None,
            required_role: None,
            roles: claims.roles().clone(),
            api_client_id: directory.client_id.clone(),
            tenant_id: directory.tenant_id.clone(),
        }
    }

    pub fn requested(mut self, client_id: Option<&str>, required_role: Option<&str>) -> Self {
        self.requested_client_id = client_id.map(str::to_string);
        self.required_role = required_role.map(str::to_string);
        self
    }

    pub fn first_party(self) -> AuthContext {
        self.finish(None)
    }

    pub fn third_party(self, client_roles: Vec<String>) -> AuthContext {
        self.finish(Some(client_roles))
    }

    fn finish(self, client_roles: Option<Vec<String>>) -> AuthContext {
        AuthContext {
            audience: self.audience,
            requester_id: self.requester_id,
            requested_client_id: self.requested_client_id,
            required_role: self.required_role,
            roles: self.roles,
            is_third_party_access_attempt: client_roles.is_some(),
            client_roles,
            api_client_id: self.api_client_id,
            tenant_id: self.tenant_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{API_CLIENT_ID, APP_ID_URI, TENANT_ID, directory, principal};
    use serde_json::json;

    #[test]
    fn first_party_context_has_no_client_roles() {
        let claims = principal("app-1", &["API.Read"]);
        let ctx = AuthContextBuilder::new(&directory(), &claims, APP_ID_URI)
            .requested(Some("app-1"), Some("API.Read"))
            .first_party();

        assert!(!ctx.is_third_party_access_attempt());
        assert_eq!(ctx.client_roles(), None);
        assert_eq!(ctx.api_client_id(), API_CLIENT_ID);
        assert_eq!(ctx.tenant_id(), TENANT_ID);
    }

    #[test]
    fn serializes_in_camel_case() {
        let claims = principal("app-1", &["API.Read"]);
        let ctx = AuthContextBuilder::new(&directory(), &claims, APP_ID_URI)
            .requested(Some("app-2"), Some("API.Read"))
            .third_party(vec!["tenant.API.Read".to_string()]);

        let value = serde_json::to_value(&ctx).expect("json");
        assert_eq!(
            value,
            json!({
                "audience": APP_ID_URI,
                "requesterId": "app-1",
                "requestedClientId": "app-2",
                "requiredRole": "API.Read",
                "roles": ["API.Read"],
                "isThirdPartyAccessAttempt": true,
                "clientRoles": ["tenant.API.Read"],
                "apiClientId": API_CLIENT_ID,
                "tenantId": TENANT_ID,
            })
        );
    }
}
