//! `GET /fused[?subjectId=<id>]`
//!
//! `characterId` is accepted as an alias. A missing or blank identifier
//! falls back to [`DEFAULT_SUBJECT_ID`].

use axum::{
  Json,
  extract::{Query, State, rejection::QueryRejection},
};
use fusion_core::{
  Backend, identity::IdentityProvider, orchestrator::DEFAULT_SUBJECT_ID, record::FusedRecord,
};
use serde::Deserialize;

use crate::{AppState, auth::Authorized, error::ApiError};

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FusedParams {
  #[serde(alias = "characterId")]
  pub subject_id: Option<String>,
}

impl FusedParams {
  pub fn subject_id(&self) -> &str {
    self
      .subject_id
      .as_deref()
      .map(str::trim)
      .filter(|id| !id.is_empty())
      .unwrap_or(DEFAULT_SUBJECT_ID)
  }
}

pub async fn handler<B, I>(
  _: Authorized,
  State(state): State<AppState<B, I>>,
  params: Result<Query<FusedParams>, QueryRejection>,
) -> Result<Json<FusedRecord>, ApiError>
where
  B: Backend,
  I: IdentityProvider + 'static,
{
  let Query(params) = params?;
  let record = state.fusion.fused_record(params.subject_id()).await?;
  Ok(Json(record))
}
