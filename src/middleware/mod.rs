/*
 * Responsibility
 * - Router-level middleware (bearer auth, CORS, transport, security headers)
 * - Each module exposes apply(router, ...) -> router
 */
pub mod auth;
pub mod cors;
pub mod http;
pub mod security_headers;
