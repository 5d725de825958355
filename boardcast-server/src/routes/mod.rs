/// API route handlers
///
/// This module contains all route handlers organized by resource:
///
/// - `health`: Health check endpoint
/// - `boards`: Board lifecycle, membership, and snapshot endpoints
/// - `lists`: List creation and deletion
/// - `tasks`: Task mutations including the reorder batch
/// - `activities`: Paginated activity history
///
/// Identity is resolved outside this system; requests arrive with the
/// pre-validated actor id in the `X-User-Id` header, extracted by
/// [`Actor`]. Mutation requests may also carry `X-Connection-Id`, the
/// caller's websocket connection id, so events skip the originator.

pub mod activities;
pub mod boards;
pub mod health;
pub mod lists;
pub mod tasks;

use axum::{extract::FromRequestParts, http::request::Parts};
use uuid::Uuid;

use crate::error::ApiError;
use crate::hub::ConnectionId;

/// The acting user, taken from the `X-User-Id` header
///
/// The identity collaborator has already authenticated the request;
/// this extractor only parses the id it attached.
#[derive(Debug, Clone, Copy)]
pub struct Actor(pub Uuid);

#[axum::async_trait]
impl<S: Send + Sync> FromRequestParts<S> for Actor {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get("x-user-id")
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| ApiError::Unauthorized("Missing X-User-Id header".to_string()))?;

        let id = header
            .parse::<Uuid>()
            .map_err(|_| ApiError::BadRequest("X-User-Id is not a valid UUID".to_string()))?;

        Ok(Actor(id))
    }
}

/// The originating websocket connection, from `X-Connection-Id`
///
/// Optional: mutations from clients without an open socket publish to
/// the whole room.
#[derive(Debug, Clone, Copy)]
pub struct Origin(pub Option<ConnectionId>);

#[axum::async_trait]
impl<S: Send + Sync> FromRequestParts<S> for Origin {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let origin = parts
            .headers
            .get("x-connection-id")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse::<Uuid>().ok())
            .map(ConnectionId::from_uuid);

        Ok(Origin(origin))
    }
}
