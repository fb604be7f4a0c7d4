//! Bearer-token guard.
//!
//! The guard only checks that a token is present and unexpired. Signature
//! verification belongs to whatever sits in front of this service.

use axum::{
  extract::FromRequestParts,
  http::{HeaderMap, header, request::Parts},
};
use chrono::{DateTime, Utc};
use fusion_auth::{bearer_token, is_expired};
use fusion_core::{Backend, identity::IdentityProvider};

use crate::{AppState, error::ApiError};

pub const MISSING_TOKEN: &str = "Missing Authorization header. Format: Bearer <token>";
pub const EXPIRED_TOKEN: &str = "The incoming token has expired";

/// Whether guarded routes demand a bearer token.
#[derive(Debug, Clone, Copy, Default)]
pub struct AuthPolicy {
  pub require_token: bool,
}

/// Present in a handler's arguments means the request passed the guard.
pub struct Authorized;

/// Check the `Authorization` header against `policy` at the given instant.
pub fn verify_bearer(
  headers: &HeaderMap,
  policy: &AuthPolicy,
  now: DateTime<Utc>,
) -> Result<(), ApiError> {
  if !policy.require_token {
    return Ok(());
  }

  let token = headers
    .get(header::AUTHORIZATION)
    .and_then(|v| v.to_str().ok())
    .and_then(bearer_token)
    .ok_or(ApiError::Unauthorized(MISSING_TOKEN))?;

  if is_expired(token, now) {
    return Err(ApiError::Unauthorized(EXPIRED_TOKEN));
  }
  Ok(())
}

impl<B, I> FromRequestParts<AppState<B, I>> for Authorized
where
  B: Backend,
  I: IdentityProvider + 'static,
{
  type Rejection = ApiError;

  async fn from_request_parts(
    parts: &mut Parts,
    state: &AppState<B, I>,
  ) -> Result<Self, Self::Rejection> {
    verify_bearer(&parts.headers, &state.auth, state.fusion.clock().now())?;
    Ok(Authorized)
  }
}
