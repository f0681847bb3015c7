use thiserror::Error;

use super::delegation::SECONDARY_TOKEN_HEADER;

/// Why a request was refused. The `Display` text is the client-facing reason
/// placed in the 403 body, so it never carries more than the denial itself.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Denial {
    #[error("Missing or invalid Authorization token")]
    MissingOrInvalidPrincipal,

    #[error("Incorrect audience on Authorization token")]
    AudienceMismatch {
        expected: String,
        found: Option<String>,
    },

    #[error("Authorization token is missing required role {role}")]
    MissingRole { role: String },

    #[error("Provided Authorization token does not grant access to this resource")]
    MissingDelegationProof,

    #[error("{header} is invalid: {reason}", header = SECONDARY_TOKEN_HEADER)]
    InvalidDelegationToken { reason: String },

    #[error("Invalid audience claim on {header}", header = SECONDARY_TOKEN_HEADER)]
    DelegationAudienceMismatch {
        expected: String,
        found: Option<String>,
    },

    #[error("{header} is missing required role {role}", header = SECONDARY_TOKEN_HEADER)]
    MissingDelegatedRole { role: String },
}

/// Outcome of a `has_permission` check that did not grant access.
///
/// `UnsupportedTargetType` is a wiring bug in the caller, not a security event,
/// so it is kept apart from `Denied`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PermissionError {
    #[error(transparent)]
    Denied(#[from] Denial),

    #[error("target type {0} is not supported by the permission gate")]
    UnsupportedTargetType(String),
}
