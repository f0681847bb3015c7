use std::convert::Infallible;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use crate::services::authz::ClaimSet;

/// Verified primary-token claims for the current request, if any.
///
/// The access middleware stores a `ClaimSet` in request extensions. With
/// anonymous access enabled a request may arrive without one; the permission
/// gate turns that into a denial, so this extractor never rejects.
pub struct Principal(pub Option<ClaimSet>);

impl<S> FromRequestParts<S> for Principal
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Principal(parts.extensions.get::<ClaimSet>().cloned()))
    }
}
