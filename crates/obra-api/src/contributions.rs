//! Handlers for `/contributions`.

use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
};
use obra_core::{
  access::{Authorizer as _, guarded_delete},
  ledger::{Contribution, LedgerSummary, NewContribution},
  store::RegistryStore,
  worker::UNKNOWN_ACTOR,
};
use uuid::Uuid;

use crate::{Actor, ApiState, DeleteParams, delete_status, error::ApiError};

/// `GET /contributions`
pub async fn list<S>(
  State(state): State<ApiState<S>>,
) -> Result<Json<Vec<Contribution>>, ApiError>
where
  S: RegistryStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  Ok(Json(
    state.store.list_contributions().await.map_err(ApiError::store)?,
  ))
}

/// `POST /contributions`
pub async fn create<S>(
  State(state): State<ApiState<S>>,
  Actor(principal): Actor,
  Json(mut body): Json<NewContribution>,
) -> Result<(StatusCode, Json<Contribution>), ApiError>
where
  S: RegistryStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  body.created_by = principal.actor_id().unwrap_or(UNKNOWN_ACTOR).to_owned();
  let body = body
    .normalize(&state.catalog)
    .map_err(|e| ApiError::Unprocessable(e.to_string()))?;
  let entry = state
    .store
    .add_contribution(body)
    .await
    .map_err(ApiError::store)?;
  Ok((StatusCode::CREATED, Json(entry)))
}

/// `DELETE /contributions/{id}?confirm=true`
pub async fn delete_one<S>(
  State(state): State<ApiState<S>>,
  Actor(principal): Actor,
  Path(id): Path<Uuid>,
  Query(params): Query<DeleteParams>,
) -> Result<StatusCode, ApiError>
where
  S: RegistryStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let outcome = guarded_delete(
    &principal,
    &params.confirm,
    "Excluir este lançamento?",
    state.store.delete_contribution(id),
  )
  .await
  .map_err(ApiError::store)?;
  delete_status(outcome, "contribution")
}

/// `GET /contributions/summary`
pub async fn summary<S>(
  State(state): State<ApiState<S>>,
) -> Result<Json<LedgerSummary>, ApiError>
where
  S: RegistryStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let entries = state
    .store
    .list_contributions()
    .await
    .map_err(ApiError::store)?;
  Ok(Json(LedgerSummary::of(&entries)))
}
