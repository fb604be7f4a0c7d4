//! `POST /custom` — body: `{"name": "...", "description": "..."}`

use axum::{Json, body::Bytes, extract::State, http::StatusCode, response::IntoResponse};
use fusion_core::{Backend, identity::IdentityProvider, record::NewCustomRecord};

use crate::{AppState, auth::Authorized, error::ApiError, json_body};

pub const INVALID_INPUT: &str = "Invalid input: name and description required";

pub async fn handler<B, I>(
  _: Authorized,
  State(state): State<AppState<B, I>>,
  body: Bytes,
) -> Result<impl IntoResponse, ApiError>
where
  B: Backend,
  I: IdentityProvider + 'static,
{
  let input: NewCustomRecord = json_body(&body)?;

  let record = state.fusion.store_custom(input).await.map_err(|e| {
    if e.is_validation() {
      ApiError::BadRequest(INVALID_INPUT.to_owned())
    } else {
      e.into()
    }
  })?;
  Ok((StatusCode::CREATED, Json(record)))
}
