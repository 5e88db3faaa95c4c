//! Acting user for audit columns, taken from a header set by a trusted proxy.

use crate::AppState;
use crate::errors::{Error, Result};
use crate::types::Actor;
use axum::{extract::FromRequestParts, http::request::Parts};
use tracing::{instrument, trace};

/// Who is making a write request.
///
/// Reads `auth.proxy_header.header_name`. When `auth.proxy_header.enabled` is set the header is
/// mandatory and its absence is rejected with 401; otherwise a missing header yields `None`.
#[derive(Debug, Clone, PartialEq)]
pub struct CurrentActor(pub Actor);

impl CurrentActor {
    pub fn into_actor(self) -> Actor {
        self.0
    }
}

fn actor_from_parts(parts: &Parts, header_name: &str) -> Actor {
    parts
        .headers
        .get(header_name)
        .and_then(|h| h.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

impl FromRequestParts<AppState> for CurrentActor {
    type Rejection = Error;

    #[instrument(skip(parts, state))]
    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self> {
        let proxy_header = &state.config.auth.proxy_header;
        let actor = actor_from_parts(parts, &proxy_header.header_name);

        if actor.is_none() && proxy_header.enabled {
            trace!("Missing {} header on write request", proxy_header.header_name);
            return Err(Error::Unauthenticated {
                message: Some(format!("Missing {} header", proxy_header.header_name)),
            });
        }

        Ok(CurrentActor(actor))
    }
}
