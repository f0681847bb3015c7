use super::claim_set::ClaimSet;
use super::denial::Denial;

/// Treat an empty role the same as no role: the check is opt-in per call site.
pub(crate) fn normalize(required_role: Option<&str>) -> Option<&str> {
    required_role.filter(|role| !role.is_empty())
}

/// Require `required_role` in the primary token's role set (exact, case-sensitive).
pub fn require_role(claims: &ClaimSet, required_role: Option<&str>) -> Result<(), Denial> {
    match normalize(required_role) {
        None => Ok(()),
        Some(role) if claims.has_role(role) => Ok(()),
        Some(role) => Err(Denial::MissingRole {
            role: role.to_string(),
        }),
    }
}
