//! Request extractors for the signed-in user and the admin allow-list.
//!
//! Clients send the identity provider's ID token as `Authorization: Bearer <token>`.

use std::sync::Arc;

use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;

use crate::api::response::ApiError;
use crate::identity::Identity;
use crate::AppState;

/// Bearer token from the `Authorization` header, if one was sent.
fn bearer_token(parts: &Parts) -> Result<Option<&str>, ApiError> {
    let Some(value) = parts.headers.get(AUTHORIZATION) else {
        return Ok(None);
    };

    let value = value
        .to_str()
        .map_err(|_| ApiError::unauthorized("Malformed Authorization header"))?;

    match value.split_once(' ') {
        Some((scheme, token)) if scheme.eq_ignore_ascii_case("bearer") && !token.trim().is_empty() => {
            Ok(Some(token.trim()))
        }
        _ => Err(ApiError::unauthorized(
            "Authorization header must be 'Bearer <token>'",
        )),
    }
}

/// The signed-in user if a token was sent. A token that fails verification is
/// rejected rather than treated as anonymous.
pub struct MaybeUser(pub Option<Identity>);

#[axum::async_trait]
impl FromRequestParts<Arc<AppState>> for MaybeUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, ApiError> {
        match bearer_token(parts)? {
            Some(token) => Ok(MaybeUser(Some(state.identity.verify(token).await?))),
            None => Ok(MaybeUser(None)),
        }
    }
}

/// Requires a verified signed-in user.
pub struct CurrentUser(pub Identity);

#[axum::async_trait]
impl FromRequestParts<Arc<AppState>> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, ApiError> {
        let MaybeUser(user) = MaybeUser::from_request_parts(parts, state).await?;
        user.map(CurrentUser)
            .ok_or_else(|| ApiError::unauthorized("Sign in required"))
    }
}

/// Requires a signed-in user whose uid is on the admin allow-list.
pub struct RequireAdmin(pub Identity);

#[axum::async_trait]
impl FromRequestParts<Arc<AppState>> for RequireAdmin {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, ApiError> {
        let CurrentUser(user) = CurrentUser::from_request_parts(parts, state).await?;

        if !state.store.is_admin(&user.uid).await? {
            tracing::warn!(uid = %user.uid, "Rejected non-admin request");
            return Err(ApiError::forbidden("Admin access required"));
        }

        Ok(RequireAdmin(user))
    }
}
