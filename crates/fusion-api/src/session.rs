//! Handlers for `/login` and `/refresh`.
//!
//! Both proxy to the identity provider. Any provider failure is answered
//! with 401; the cause is only logged.

use axum::{Json, body::Bytes, extract::State};
use fusion_core::{
  Backend,
  identity::{IdentityProvider, RefreshedTokens, TokenSet},
};
use serde::Deserialize;

use crate::{AppState, error::ApiError, json_body};

// ─── Login ───────────────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
pub struct LoginBody {
  pub username: Option<String>,
  pub password: Option<String>,
}

/// `POST /login` — body: `{"username": "...", "password": "..."}`
pub async fn login<B, I>(
  State(state): State<AppState<B, I>>,
  body: Bytes,
) -> Result<Json<TokenSet>, ApiError>
where
  B: Backend,
  I: IdentityProvider + 'static,
{
  let LoginBody { username, password } = json_body(&body)?;
  let (Some(username), Some(password)) = (present(username), present(password)) else {
    return Err(ApiError::BadRequest("Username and password required".into()));
  };

  let tokens = state
    .identity
    .authenticate(&username, &password)
    .await
    .map_err(|error| {
      tracing::warn!(%username, %error, "login failed");
      ApiError::AuthenticationFailed("Authentication failed")
    })?;

  tracing::info!(%username, "user authenticated");
  Ok(Json(tokens))
}

// ─── Refresh ─────────────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshBody {
  pub refresh_token: Option<String>,
}

/// `POST /refresh` — body: `{"refreshToken": "..."}`
pub async fn refresh<B, I>(
  State(state): State<AppState<B, I>>,
  body: Bytes,
) -> Result<Json<RefreshedTokens>, ApiError>
where
  B: Backend,
  I: IdentityProvider + 'static,
{
  let RefreshBody { refresh_token } = json_body(&body)?;
  let Some(refresh_token) = present(refresh_token) else {
    return Err(ApiError::BadRequest("Refresh token required".into()));
  };

  let tokens = state.identity.refresh(&refresh_token).await.map_err(|error| {
    tracing::warn!(%error, "token refresh failed");
    ApiError::AuthenticationFailed("Token refresh failed")
  })?;

  tracing::info!("token refreshed");
  Ok(Json(tokens))
}

fn present(value: Option<String>) -> Option<String> { value.filter(|v| !v.is_empty()) }
