/*
 * Responsibility
 * - Authorization decisions for protected operations (audience, roles, delegated access)
 * - Pure request-scoped logic: no shared mutable state, safe under any parallelism
 * - HTTP mapping of outcomes lives in crate::error, not here
 */
pub mod audience;
pub mod claim_set;
pub mod context;
pub mod delegation;
pub mod denial;
pub mod gate;
pub mod role;

pub use claim_set::ClaimSet;
pub use context::AuthContext;
pub use delegation::SECONDARY_TOKEN_HEADER_NAME;
pub use denial::{Denial, PermissionError};
pub use gate::{CLIENT_ID_TARGET, PermissionGate, PermissionRequest};
