/*
 * Responsibility
 * - Load environment variables / .env (directory identity, CORS, token verification knobs)
 * - Validate values up front (missing or empty -> refuse to start)
 * - Hand the gate an immutable `DirectoryConfig` instead of ambient globals
 */
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;
use url::Url;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnv {
    Development,
    Production,
}

impl AppEnv {
    fn parse(raw: &str) -> Self {
        match raw.to_ascii_lowercase().as_str() {
            "production" | "prod" => Self::Production,
            _ => Self::Development,
        }
    }

    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("missing configuration: {0}")]
    Missing(&'static str),
    #[error("invalid configuration: {0}")]
    Invalid(&'static str),
}

/// Identity of this API inside the directory (tenant).
///
/// - `app_id_uri` is the audience every primary token must carry.
/// - `issuer` is shared by primary and secondary tokens.
/// - `client_id` / `tenant_id` are echoed into every `AuthContext` for audit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryConfig {
    pub client_id: String,
    pub tenant_id: String,
    pub app_id_uri: String,
    pub issuer: String,
}

impl DirectoryConfig {
    pub fn new(
        client_id: impl Into<String>,
        tenant_id: impl Into<String>,
        app_id_uri: impl Into<String>,
    ) -> Self {
        let tenant_id = tenant_id.into();
        let issuer = Self::default_issuer(&tenant_id);
        Self {
            client_id: client_id.into(),
            tenant_id,
            app_id_uri: app_id_uri.into(),
            issuer,
        }
    }

    pub fn with_issuer(mut self, issuer: impl Into<String>) -> Self {
        self.issuer = issuer.into();
        self
    }

    /// v1.0 token issuer for a tenant.
    pub fn default_issuer(tenant_id: &str) -> String {
        format!("https://sts.windows.net/{}/", tenant_id)
    }
}

pub struct Config {
    pub addr: SocketAddr,

    pub app_env: AppEnv,
    pub cors_allowed_origins: Vec<String>,

    pub directory: DirectoryConfig,
    pub anonymous_access: bool,

    pub access_token_leeway_seconds: u64,
    pub jwks_cache_ttl: Duration,
    pub jwks_http_timeout: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the config from any key -> value source (the process env in production).
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let port: u16 = lookup("PORT")
            .and_then(|s| s.parse().ok())
            .unwrap_or(3000);

        let addr: SocketAddr = SocketAddr::from_str(&format!("0.0.0.0:{}", port))
            .map_err(|_| ConfigError::Invalid("PORT"))?;

        let app_env = AppEnv::parse(&lookup("APP_ENV").unwrap_or_default());

        let cors_allowed_origins = lookup("CORS_ALLOWED_ORIGINS")
            .unwrap_or_default()
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>();

        let client_id = required(&lookup, "AZURE_AD_CLIENT_ID")?;
        let tenant_id = required(&lookup, "AZURE_AD_TENANT_ID")?;
        let app_id_uri = required(&lookup, "AZURE_AD_APP_ID_URI")?;

        let mut directory = DirectoryConfig::new(client_id, tenant_id, app_id_uri);
        if let Some(issuer) = lookup("AZURE_AD_ISSUER").filter(|s| !s.trim().is_empty()) {
            directory = directory.with_issuer(issuer.trim());
        }
        Url::parse(&directory.issuer).map_err(|_| ConfigError::Invalid("AZURE_AD_ISSUER"))?;

        let anonymous_access = lookup("ANONYMOUS_ACCESS")
            .map(|v| parse_flag(&v))
            .unwrap_or(false);

        let seconds = |key: &str| lookup(key).and_then(|v| v.trim().parse::<u64>().ok());

        let access_token_leeway_seconds = seconds("ACCESS_TOKEN_LEEWAY_SECONDS").unwrap_or(60);
        let jwks_cache_ttl = Duration::from_secs(seconds("JWKS_CACHE_TTL_SECONDS").unwrap_or(3600));
        let jwks_http_timeout =
            Duration::from_secs(seconds("JWKS_HTTP_TIMEOUT_SECONDS").unwrap_or(10));

        Ok(Self {
            addr,
            app_env,
            cors_allowed_origins,
            directory,
            anonymous_access,
            access_token_leeway_seconds,
            jwks_cache_ttl,
            jwks_http_timeout,
        })
    }
}

fn required(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &'static str,
) -> Result<String, ConfigError> {
    let value = lookup(key).ok_or(ConfigError::Missing(key))?;
    if value.trim().is_empty() {
        return Err(ConfigError::Invalid(key));
    }
    Ok(value.trim().to_string())
}

fn parse_flag(raw: &str) -> bool {
    matches!(
        raw.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}
