use super::claim_set::ClaimSet;
use super::denial::Denial;

/// Check the primary token was issued for this API.
///
/// Only the first audience entry counts, compared by exact string equality.
/// Returns the matched audience so the caller can echo it for audit.
pub fn validate_audience<'a>(claims: &'a ClaimSet, expected: &str) -> Result<&'a str, Denial> {
    match claims.first_audience() {
        Some(audience) if audience == expected => Ok(audience),
        found => Err(Denial::AudienceMismatch {
            expected: expected.to_string(),
            found: found.map(str::to_string),
        }),
    }
}
