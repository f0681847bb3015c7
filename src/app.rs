/*
 * Responsibility
 * - tracing / panic hook setup
 * - Config -> token verifier -> permission gate -> AppState
 * - Router assembly (/health and everything under /api) and middleware stacking
 * - axum::serve()
 */
use std::{panic, process, sync::Arc};

use anyhow::{Context, Result};
use axum::{Router, routing::get};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::api;
use crate::api::handlers::health::health;
use crate::config::Config;
use crate::middleware;
use crate::middleware::http::HttpLimits;
use crate::services::authz::PermissionGate;
use crate::services::token::JwksTokenVerifier;
use crate::state::AppState;

fn init_tracing() {
    // RUST_LOG wins; e.g. RUST_LOG=info,protected_api=debug,tower_http=debug
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,tower_http=info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn init_panic_hook(abort_on_panic: bool) {
    let default_hook = panic::take_hook();

    panic::set_hook(Box::new(move |info| {
        tracing::error!(?info, "panic");

        // development: crash loudly; production: keep serving
        if abort_on_panic {
            process::abort();
        } else {
            default_hook(info);
        }
    }))
}

pub async fn run() -> Result<()> {
    init_tracing();
    let config = Config::from_env().context("loading configuration")?;
    init_panic_hook(!config.app_env.is_production());

    tracing::info!(
        env = ?config.app_env,
        addr = %config.addr,
        issuer = %config.directory.issuer,
        audience = %config.directory.app_id_uri,
        anonymous_access = config.anonymous_access,
        "starting protected API"
    );

    let state = build_state(&config)?;
    let app = build_router(state, &config);

    let listener = tokio::net::TcpListener::bind(config.addr)
        .await
        .with_context(|| format!("binding {}", config.addr))?;
    axum::serve(listener, app).await.context("serving")?;

    Ok(())
}

fn build_state(config: &Config) -> Result<AppState> {
    let verifier = JwksTokenVerifier::new(
        config.jwks_cache_ttl,
        config.jwks_http_timeout,
        config.access_token_leeway_seconds,
    )
    .context("building token verifier")?;

    let gate = PermissionGate::new(config.directory.clone(), Arc::new(verifier));

    Ok(AppState::new(Arc::new(gate), config.anonymous_access))
}

fn build_router(state: AppState, config: &Config) -> Router {
    let router = Router::new()
        .route("/health", get(health))
        .nest("/api", api::routes(state.clone()))
        .with_state(state);

    let router = middleware::http::apply(router, HttpLimits::default());
    let router = middleware::security_headers::apply(router, config.app_env);
    middleware::cors::apply(router, config.app_env, &config.cors_allowed_origins)
}
