/*!
 * Request extractors
 *
 * Public API:
 * - Principal (verified primary-token claims placed by middleware::auth::access)
 */
mod principal;

pub use principal::Principal;
