//! Request extractors: bearer authentication, JSON bodies and path ids.

use std::str::FromStr;
use std::sync::Arc;

use axum::Json;
use axum::extract::{FromRequest, FromRequestParts, OptionalFromRequestParts, Request};
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use domain::{Actor, DomainError};
use serde::de::DeserializeOwned;
use storage::Store;

use super::AppState;
use crate::error::ApiError;

/// The authenticated caller, resolved from `Authorization: Bearer <token>`.
pub struct AuthUser(pub Actor);

fn bearer_token(parts: &Parts) -> Option<&str> {
    let value = parts.headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    scheme.eq_ignore_ascii_case("bearer").then(|| token.trim())
}

impl<S: Store + 'static> FromRequestParts<Arc<AppState<S>>> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState<S>>,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts).ok_or(DomainError::Unauthenticated)?;
        let actor = state.users.authenticate(token).await?;
        Ok(AuthUser(actor))
    }
}

/// Anonymous requests yield `None`; a presented but unknown token is still 401.
impl<S: Store + 'static> OptionalFromRequestParts<Arc<AppState<S>>> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState<S>>,
    ) -> Result<Option<Self>, Self::Rejection> {
        if !parts.headers.contains_key(AUTHORIZATION) {
            return Ok(None);
        }
        <AuthUser as FromRequestParts<_>>::from_request_parts(parts, state)
            .await
            .map(Some)
    }
}

/// An authenticated caller holding the admin role.
///
/// Reads only the request head, so it rejects with 401 or 403 before any
/// body extractor runs.
pub struct AdminUser(pub Actor);

impl<S: Store + 'static> FromRequestParts<Arc<AppState<S>>> for AdminUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState<S>>,
    ) -> Result<Self, Self::Rejection> {
        let AuthUser(actor) =
            <AuthUser as FromRequestParts<_>>::from_request_parts(parts, state).await?;
        actor.require_admin()?;
        Ok(AdminUser(actor))
    }
}

/// JSON body extractor whose rejections render as `{"message": ...}`.
pub struct Payload<T>(pub T);

impl<T, S> FromRequest<S> for Payload<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(Payload(value)),
            Err(rejection) => Err(ApiError::Rejected {
                status: rejection.status(),
                message: rejection.body_text(),
            }),
        }
    }
}

/// Parses a path segment into a typed id. Malformed ids are reported as a
/// missing entity, the same as well-formed ids that match nothing.
pub fn parse_id<T: FromStr>(raw: &str, entity: &'static str) -> Result<T, ApiError> {
    raw.parse().map_err(|_| ApiError::not_found(entity, raw))
}
