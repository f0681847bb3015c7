//! Primary bearer token verification -> `ClaimSet` in request extensions.
//!
//! Checked here: signature (issuer JWKS), issuer, expiry / not-before.
//! Not checked here: audience, roles, delegation. Those belong to the
//! permission gate, which reports them as 403 instead of 401.
//!
//! With anonymous access enabled a request without `Authorization` passes
//! through untouched; a present but invalid token is still rejected.

use axum::{
    Router,
    body::Body,
    extract::{OriginalUri, State},
    http::{Request, header},
    middleware::{self, Next},
    response::Response,
};

use crate::error::AppError;
use crate::services::authz::ClaimSet;
use crate::state::AppState;

/// Protect every route of `router` with bearer authentication.
///
/// ```ignore
/// let api = Router::new().route("/{client_id}/data", get(read_data));
/// let api = middleware::auth::access::apply(api, state.clone());
/// app = app.nest("/api", api);
/// ```
pub fn apply(router: Router<AppState>, state: AppState) -> Router<AppState> {
    // route_layer: unmatched paths stay 404 instead of turning into 401
    router.route_layer(middleware::from_fn_with_state(state, access_middleware))
}

async fn access_middleware(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let path = req
        .extensions()
        .get::<OriginalUri>()
        .map(|uri| uri.path().to_string())
        .unwrap_or_else(|| req.uri().path().to_string());

    let Some(auth) = req.headers().get(header::AUTHORIZATION) else {
        if state.anonymous_access {
            return Ok(next.run(req).await);
        }
        tracing::debug!(path, "missing Authorization header");
        return Err(AppError::unauthorized(path));
    };

    let token = auth
        .to_str()
        .ok()
        .and_then(bearer_token)
        .ok_or_else(|| AppError::unauthorized(path.clone()))?;

    let gate = &state.gate;
    let claims = match gate.verifier().verify(&gate.directory().issuer, token).await {
        Ok(claims) => claims,
        Err(err) => {
            tracing::warn!(error = %err, path, "access token verification failed");
            return Err(AppError::unauthorized(path));
        }
    };

    let principal = match ClaimSet::try_from(claims) {
        Ok(principal) => principal,
        Err(err) => {
            tracing::warn!(error = %err, path, "access token carries no usable identity");
            return Err(AppError::unauthorized(path));
        }
    };

    // middleware -> Principal extractor
    req.extensions_mut().insert(principal);

    Ok(next.run(req).await)
}

/// `Bearer <token>`, scheme matched case-insensitively.
fn bearer_token(value: &str) -> Option<&str> {
    let (scheme, token) = value.split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    (!token.is_empty()).then_some(token)
}
