/*
 * Responsibility
 * - HTTP surface: handlers, extractors, and the routes() entry point
 */
pub mod extractors;
pub mod handlers;
mod routes;

pub use routes::routes;
