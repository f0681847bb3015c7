use async_trait::async_trait;
use jsonwebtoken::Algorithm;
use thiserror::Error;

use super::claims::TokenClaims;

/// Errors returned while verifying a raw JWT against an issuer.
///
/// The `Display` text is what ends up in delegation denials, so it never
/// includes token contents.
#[derive(Debug, Error)]
pub enum VerifyError {
    #[error("token header has no key id")]
    MissingKeyId,
    #[error("unsupported signing algorithm {0:?}")]
    UnsupportedAlgorithm(Algorithm),
    #[error("no signing key found for key id {0}")]
    KeyNotFound(String),
    #[error("signing key does not match token algorithm")]
    KeyAlgorithmMismatch,
    #[error("signing key discovery failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("{0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),
}

/// Decodes and cryptographically verifies a raw token issued by `issuer`.
///
/// Implementations check signature, `iss`, `exp` and `nbf`. Audience is left to
/// the caller because primary and delegation tokens expect different audiences.
#[async_trait]
pub trait TokenVerifier: Send + Sync {
    async fn verify(&self, issuer: &str, token: &str) -> Result<TokenClaims, VerifyError>;
}
