//! Issuer-scoped JWT verification with cached OIDC discovery and JWKS.
//!
//! Flow for every token:
//! 1. read the header (alg must be asymmetric and allow-listed, `kid` required)
//! 2. resolve `{issuer}/.well-known/openid-configuration` -> `jwks_uri` (cached)
//! 3. fetch the JWKS (cached), refreshing once when the `kid` is unknown
//! 4. verify signature + `iss` + `exp`/`nbf` with jsonwebtoken
//!
//! Caches live in `DashMap`s so concurrent requests never block each other.

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use dashmap::DashMap;
use jsonwebtoken::jwk::{AlgorithmParameters, Jwk, JwkSet, KeyAlgorithm};
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode, decode_header};
use serde::Deserialize;

use super::claims::TokenClaims;
use super::verifier::{TokenVerifier, VerifyError};

const ALLOWED_ALGORITHMS: [Algorithm; 5] = [
    Algorithm::RS256,
    Algorithm::RS384,
    Algorithm::RS512,
    Algorithm::ES256,
    Algorithm::ES384,
];

/// Floor between two JWKS fetches triggered by an unknown `kid`.
const MIN_REFRESH_INTERVAL: Duration = Duration::from_secs(30);

#[derive(Debug, Clone)]
struct CachedJwks {
    jwks: JwkSet,
    fetched_at: Instant,
    expires_at: Instant,
}

#[derive(Debug, Clone)]
struct CachedDiscovery {
    jwks_uri: String,
    expires_at: Instant,
}

#[derive(Debug, Deserialize)]
struct DiscoveryDocument {
    jwks_uri: String,
}

#[derive(Debug, Clone)]
pub struct JwksTokenVerifier {
    client: reqwest::Client,
    discovery_cache: Arc<DashMap<String, CachedDiscovery>>,
    jwks_cache: Arc<DashMap<String, CachedJwks>>,
    cache_ttl: Duration,
    min_refresh_interval: Duration,
    leeway_seconds: u64,
}

impl JwksTokenVerifier {
    pub fn new(
        cache_ttl: Duration,
        http_timeout: Duration,
        leeway_seconds: u64,
    ) -> Result<Self, VerifyError> {
        let client = reqwest::Client::builder().timeout(http_timeout).build()?;

        Ok(Self {
            client,
            discovery_cache: Arc::new(DashMap::new()),
            jwks_cache: Arc::new(DashMap::new()),
            cache_ttl,
            min_refresh_interval: MIN_REFRESH_INTERVAL,
            leeway_seconds,
        })
    }

    pub fn with_min_refresh_interval(mut self, interval: Duration) -> Self {
        self.min_refresh_interval = interval;
        self
    }

    async fn resolve_jwks_uri(&self, issuer: &str) -> Result<String, VerifyError> {
        let discovery_url = format!(
            "{}/.well-known/openid-configuration",
            issuer.trim_end_matches('/')
        );

        if let Some(entry) = self.discovery_cache.get(&discovery_url)
            && entry.expires_at > Instant::now()
        {
            return Ok(entry.jwks_uri.clone());
        }

        tracing::debug!(%discovery_url, "fetching openid configuration");
        let doc: DiscoveryDocument = self
            .client
            .get(&discovery_url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        self.discovery_cache.insert(
            discovery_url,
            CachedDiscovery {
                jwks_uri: doc.jwks_uri.clone(),
                expires_at: Instant::now() + self.cache_ttl,
            },
        );
        Ok(doc.jwks_uri)
    }

    async fn get_jwks(&self, jwks_uri: &str) -> Result<JwkSet, VerifyError> {
        if let Some(entry) = self.jwks_cache.get(jwks_uri)
            && entry.expires_at > Instant::now()
        {
            return Ok(entry.jwks.clone());
        }
        self.refresh_jwks(jwks_uri).await
    }

    /// A cached set younger than the refresh floor is not refetched; forged
    /// `kid`s must not turn every request into an outbound call.
    fn refresh_allowed(&self, jwks_uri: &str) -> bool {
        self.jwks_cache
            .get(jwks_uri)
            .is_none_or(|entry| entry.fetched_at.elapsed() >= self.min_refresh_interval)
    }

    async fn refresh_jwks(&self, jwks_uri: &str) -> Result<JwkSet, VerifyError> {
        tracing::debug!(%jwks_uri, "fetching signing keys");
        let jwks: JwkSet = self
            .client
            .get(jwks_uri)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        self.jwks_cache.insert(
            jwks_uri.to_string(),
            CachedJwks {
                jwks: jwks.clone(),
                fetched_at: Instant::now(),
                expires_at: Instant::now() + self.cache_ttl,
            },
        );
        Ok(jwks)
    }

    async fn decoding_key(
        &self,
        issuer: &str,
        kid: &str,
        alg: Algorithm,
    ) -> Result<DecodingKey, VerifyError> {
        let jwks_uri = self.resolve_jwks_uri(issuer).await?;
        let jwks = self.get_jwks(&jwks_uri).await?;

        // Unknown kid usually means the issuer rotated keys since the last fetch.
        let jwk = match jwks.find(kid) {
            Some(jwk) => jwk.clone(),
            None if !self.refresh_allowed(&jwks_uri) => {
                tracing::debug!(%jwks_uri, kid, "unknown kid, keys fetched recently");
                return Err(VerifyError::KeyNotFound(kid.to_string()));
            }
            None => self
                .refresh_jwks(&jwks_uri)
                .await?
                .find(kid)
                .cloned()
                .ok_or_else(|| VerifyError::KeyNotFound(kid.to_string()))?,
        };

        ensure_jwk_matches_algorithm(&jwk, alg)?;
        Ok(DecodingKey::from_jwk(&jwk)?)
    }
}

#[async_trait]
impl TokenVerifier for JwksTokenVerifier {
    async fn verify(&self, issuer: &str, token: &str) -> Result<TokenClaims, VerifyError> {
        let header = decode_header(token)?;
        if !ALLOWED_ALGORITHMS.contains(&header.alg) {
            return Err(VerifyError::UnsupportedAlgorithm(header.alg));
        }
        let kid = header.kid.as_deref().ok_or(VerifyError::MissingKeyId)?;

        let decoding_key = self.decoding_key(issuer, kid, header.alg).await?;

        let mut validation = Validation::new(header.alg);
        validation.set_issuer(&[issuer]);
        // audience is checked by the caller (primary vs delegation token)
        validation.validate_aud = false;
        validation.validate_nbf = true;
        validation.leeway = self.leeway_seconds;
        validation
            .required_spec_claims
            .extend(["exp".to_string(), "iss".to_string()]);

        let data = decode::<TokenClaims>(token, &decoding_key, &validation)?;
        Ok(data.claims)
    }
}

fn ensure_jwk_matches_algorithm(jwk: &Jwk, alg: Algorithm) -> Result<(), VerifyError> {
    if let Some(key_alg) = &jwk.common.key_algorithm
        && !key_algorithm_matches(key_alg, alg)
    {
        return Err(VerifyError::KeyAlgorithmMismatch);
    }

    let family_ok = match &jwk.algorithm {
        AlgorithmParameters::RSA(_) => {
            matches!(alg, Algorithm::RS256 | Algorithm::RS384 | Algorithm::RS512)
        }
        AlgorithmParameters::EllipticCurve(_) => {
            matches!(alg, Algorithm::ES256 | Algorithm::ES384)
        }
        _ => false,
    };
    if !family_ok {
        return Err(VerifyError::KeyAlgorithmMismatch);
    }
    Ok(())
}

fn key_algorithm_matches(key_alg: &KeyAlgorithm, alg: Algorithm) -> bool {
    matches!(
        (key_alg, alg),
        (KeyAlgorithm::RS256, Algorithm::RS256)
            | (KeyAlgorithm::RS384, Algorithm::RS384)
            | (KeyAlgorithm::RS512, Algorithm::RS512)
            | (KeyAlgorithm::ES256, Algorithm::ES256)
            | (KeyAlgorithm::ES384, Algorithm::ES384)
    )
}
