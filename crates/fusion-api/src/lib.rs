//! JSON HTTP API for the fusion service.
//!
//! Exposes an axum [`Router`] backed by a [`FusionService`] and an
//! [`IdentityProvider`]. TLS and the listening socket are the caller's
//! responsibility.
//!
//! | Method | Path | Guarded |
//! |--------|------|---------|
//! | `GET`  | `/fused?subjectId=<id>` | yes |
//! | `GET`  | `/history?limit=<n>&offset=<cursor>` | yes |
//! | `POST` | `/custom` | yes |
//! | `POST` | `/login` | no |
//! | `POST` | `/refresh` | no |
//!
//! "Guarded" routes require a non-expired bearer token when
//! [`AuthPolicy::require_token`] is set.

pub mod auth;
pub mod custom;
pub mod error;
pub mod fused;
pub mod history;
pub mod session;

use std::sync::Arc;

use axum::{
  Router,
  body::Bytes,
  routing::{get, post},
};
use fusion_core::{Backend, FusionService, identity::IdentityProvider};
use serde::de::DeserializeOwned;

pub use auth::{AuthPolicy, Authorized};
pub use error::ApiError;

// ─── Application state ───────────────────────────────────────────────────────

/// Shared state threaded through all handlers.
pub struct AppState<B: Backend, I> {
  pub fusion:   Arc<FusionService<B>>,
  pub identity: Arc<I>,
  pub auth:     Arc<AuthPolicy>,
}

impl<B: Backend, I> Clone for AppState<B, I> {
  fn clone(&self) -> Self {
    Self {
      fusion:   Arc::clone(&self.fusion),
      identity: Arc::clone(&self.identity),
      auth:     Arc::clone(&self.auth),
    }
  }
}

// ─── Router ──────────────────────────────────────────────────────────────────

/// Build the API router for `state`.
///
/// The returned `Router<()>` can be nested or layered by the caller.
pub fn router<B, I>(state: AppState<B, I>) -> Router<()>
where
  B: Backend,
  I: IdentityProvider + 'static,
{
  Router::new()
    .route("/fused", get(fused::handler::<B, I>))
    .route("/history", get(history::handler::<B, I>))
    .route("/custom", post(custom::handler::<B, I>))
    .route("/login", post(session::login::<B, I>))
    .route("/refresh", post(session::refresh::<B, I>))
    .with_state(state)
}

/// Decode a JSON request body. An empty body decodes as `T::default()`, so
/// a bare `POST` reports the missing fields rather than a parse error.
pub(crate) fn json_body<T>(bytes: &Bytes) -> Result<T, ApiError>
where
  T: DeserializeOwned + Default,
{
  if bytes.iter().all(u8::is_ascii_whitespace) {
    return Ok(T::default());
  }
  serde_json::from_slice(bytes).map_err(|e| ApiError::BadRequest(format!("Invalid JSON body: {e}")))
}

#[cfg(test)]
mod tests;
