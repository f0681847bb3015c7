/*
 * Responsibility
 * - Shared context attached to the Router (AppState)
 *   - gate: PermissionGate (directory config + token verifier)
 *   - anonymous_access: let unauthenticated requests reach handlers (the gate denies them)
 * - Cheap to clone (Arc inside)
 */
use std::sync::Arc;

use crate::services::authz::PermissionGate;

#[derive(Clone, Debug)]
pub struct AppState {
    pub gate: Arc<PermissionGate>,
    pub anonymous_access: bool,
}

impl AppState {
    pub fn new(gate: Arc<PermissionGate>, anonymous_access: bool) -> Self {
        Self {
            gate,
            anonymous_access,
        }
    }
}
