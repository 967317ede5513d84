//! Acting user resolution
//!
//! Authentication happens upstream. The upstream layer forwards the id of the
//! acting user in a header (`x-actor-id` unless configured otherwise); this
//! middleware copies it into the request extensions so handlers can stamp
//! `created_by` / `updated_by`.

use std::convert::Infallible;

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{request::Parts, HeaderMap},
    middleware::Next,
    response::Response,
};

use crate::AppState;

/// Id of the user performing the request, if one was forwarded
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Actor(pub Option<i64>);

impl Actor {
    /// Read the actor from `header`. Missing, non-integer or non-positive
    /// values yield an anonymous actor.
    pub fn from_headers(headers: &HeaderMap, header: &str) -> Self {
        let id = headers
            .get(header)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.trim().parse::<i64>().ok())
            .filter(|id| *id > 0);
        Actor(id)
    }

    pub fn id(self) -> Option<i64> {
        self.0
    }
}

/// Resolve the actor header into a request extension
pub async fn actor_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let actor = Actor::from_headers(request.headers(), &state.config.api.actor_header);
    tracing::trace!(actor = ?actor.id(), "Resolved acting user");
    request.extensions_mut().insert(actor);
    next.run(request).await
}

/// Handlers see an anonymous actor when the middleware did not run
impl<S> FromRequestParts<S> for Actor
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(parts.extensions.get::<Actor>().copied().unwrap_or_default())
    }
}
