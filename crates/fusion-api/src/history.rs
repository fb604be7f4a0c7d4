//! `GET /history[?limit=<n>&offset=<cursor>]`
//!
//! Both parameters are read as raw strings so that junk values fall back
//! to defaults instead of failing the request.

use axum::{
  Json,
  extract::{Query, State, rejection::QueryRejection},
};
use fusion_core::{
  Backend, identity::IdentityProvider, orchestrator::HistoryQuery, record::FusedRecord,
};
use serde::Deserialize;

use crate::{AppState, auth::Authorized, error::ApiError};

#[derive(Debug, Default, Deserialize)]
pub struct HistoryParams {
  pub limit:  Option<String>,
  /// Creation timestamp (epoch millis) of the last record already seen.
  #[serde(alias = "cursor")]
  pub offset: Option<String>,
}

pub async fn handler<B, I>(
  _: Authorized,
  State(state): State<AppState<B, I>>,
  params: Result<Query<HistoryParams>, QueryRejection>,
) -> Result<Json<Vec<FusedRecord>>, ApiError>
where
  B: Backend,
  I: IdentityProvider + 'static,
{
  let Query(params) = params?;
  let query = HistoryQuery::parse(params.limit.as_deref(), params.offset.as_deref());
  let records = state.fusion.history(query).await?;
  Ok(Json(records))
}
