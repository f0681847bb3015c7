pub mod claims;
pub mod jwks;
pub mod verifier;

pub use claims::TokenClaims;
pub use jwks::JwksTokenVerifier;
pub use verifier::TokenVerifier;
