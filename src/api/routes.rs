/*
 * Responsibility
 * - URL structure of the protected API (mounted under /api)
 * - Bearer authentication applies to every route defined here
 * - Authorization (audience/role/delegation) happens inside each handler via the gate
 */
use axum::{Router, routing::get};

use crate::api::handlers::secure::{debug, read_data, token_info, write_data};
use crate::middleware;
use crate::state::AppState;

pub fn routes(state: AppState) -> Router<AppState> {
    let router = Router::new()
        .route("/token", get(token_info))
        .route("/{client_id}/data", get(read_data).put(write_data))
        .route("/{client_id}/debug", get(debug));

    middleware::auth::access::apply(router, state)
}
