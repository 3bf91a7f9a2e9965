//! Handlers for `/workers` and `/summary`.

use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
};
use obra_core::{
  access::{Authorizer as _, guarded_delete},
  form::RegistrationForm,
  store::RegistryStore,
  view::{WorkerFilter, WorkerSummary, WorkerView, derive_view},
  worker::{WorkerPatch, WorkerRecord},
};

use crate::{Actor, ApiState, DeleteParams, delete_status, error::ApiError};

/// `GET /workers?search=&worker_type=&sector=&payment_kind=&year=`
pub async fn list<S>(
  State(state): State<ApiState<S>>,
  Query(filter): Query<WorkerFilter>,
) -> Result<Json<WorkerView>, ApiError>
where
  S: RegistryStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let records = state.store.list_workers().await.map_err(ApiError::store)?;
  Ok(Json(derive_view(&records, &filter)))
}

/// `POST /workers`
pub async fn create<S>(
  State(state): State<ApiState<S>>,
  Actor(principal): Actor,
  Json(mut form): Json<RegistrationForm>,
) -> Result<(StatusCode, Json<WorkerRecord>), ApiError>
where
  S: RegistryStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let input = form
    .submit(&state.catalog, principal.actor_id(), || {})
    .map_err(|e| ApiError::Unprocessable(e.to_string()))?;
  let record = state.store.add_worker(input).await.map_err(ApiError::store)?;
  Ok((StatusCode::CREATED, Json(record)))
}

/// `GET /workers/{id}`
pub async fn get_one<S>(
  State(state): State<ApiState<S>>,
  Path(id): Path<String>,
) -> Result<Json<WorkerRecord>, ApiError>
where
  S: RegistryStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  state
    .store
    .get_worker(&id)
    .await
    .map_err(ApiError::store)?
    .map(Json)
    .ok_or_else(|| ApiError::NotFound(format!("worker {id} not found")))
}

/// `PATCH /workers/{id}`
///
/// Text is trimmed and the record invariants re-checked. A patch touching
/// `sector` or `field` must leave the record at a location the catalog knows.
pub async fn update<S>(
  State(state): State<ApiState<S>>,
  Path(id): Path<String>,
  Json(patch): Json<WorkerPatch>,
) -> Result<Json<WorkerRecord>, ApiError>
where
  S: RegistryStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  if patch.is_empty() {
    return Err(ApiError::BadRequest("empty patch".into()));
  }
  let patch = patch
    .normalize()
    .map_err(|e| ApiError::Unprocessable(e.to_string()))?;

  if patch.sector.is_some() || patch.field.is_some() {
    let current = state
      .store
      .get_worker(&id)
      .await
      .map_err(ApiError::store)?
      .ok_or_else(|| ApiError::NotFound(format!("worker {id} not found")))?;
    let sector = patch.sector.as_deref().unwrap_or(&current.sector);
    let field = patch.field.as_deref().unwrap_or(&current.field);
    state
      .catalog
      .validate(sector, field)
      .map_err(|e| ApiError::Unprocessable(e.to_string()))?;
  }

  state
    .store
    .update_worker(&id, patch)
    .await
    .map_err(ApiError::store)?
    .map(Json)
    .ok_or_else(|| ApiError::NotFound(format!("worker {id} not found")))
}

/// `DELETE /workers/{id}?confirm=true`
pub async fn delete_one<S>(
  State(state): State<ApiState<S>>,
  Actor(principal): Actor,
  Path(id): Path<String>,
  Query(params): Query<DeleteParams>,
) -> Result<StatusCode, ApiError>
where
  S: RegistryStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let outcome = guarded_delete(
    &principal,
    &params.confirm,
    "Excluir este obreiro?",
    state.store.delete_worker(&id),
  )
  .await
  .map_err(ApiError::store)?;
  tracing::debug!(%id, ?outcome, "worker delete requested");
  delete_status(outcome, "worker")
}

/// `GET /summary`
pub async fn summary<S>(
  State(state): State<ApiState<S>>,
) -> Result<Json<WorkerSummary>, ApiError>
where
  S: RegistryStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  Ok(Json(state.store.worker_summary().await.map_err(ApiError::store)?))
}
