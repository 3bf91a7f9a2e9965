//! Handlers for `/pastors`.

use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
};
use obra_core::{
  access::{Authorizer as _, guarded_delete},
  pastor::{NewPastorRegistration, PastorRegistration},
  store::RegistryStore,
  worker::UNKNOWN_ACTOR,
};
use uuid::Uuid;

use crate::{Actor, ApiState, DeleteParams, delete_status, error::ApiError};

/// `GET /pastors`
pub async fn list<S>(
  State(state): State<ApiState<S>>,
) -> Result<Json<Vec<PastorRegistration>>, ApiError>
where
  S: RegistryStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  Ok(Json(state.store.list_pastors().await.map_err(ApiError::store)?))
}

/// `POST /pastors`
///
/// `createdBy` is always taken from the authenticated user.
pub async fn create<S>(
  State(state): State<ApiState<S>>,
  Actor(principal): Actor,
  Json(mut body): Json<NewPastorRegistration>,
) -> Result<(StatusCode, Json<PastorRegistration>), ApiError>
where
  S: RegistryStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  body.created_by = principal.actor_id().unwrap_or(UNKNOWN_ACTOR).to_owned();
  let body = body
    .normalize()
    .map_err(|e| ApiError::Unprocessable(e.to_string()))?;
  let registration = state.store.add_pastor(body).await.map_err(ApiError::store)?;
  Ok((StatusCode::CREATED, Json(registration)))
}

/// `DELETE /pastors/{id}?confirm=true`
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
    "Excluir este cadastro de pastor?",
    state.store.delete_pastor(id),
  )
  .await
  .map_err(ApiError::store)?;
  delete_status(outcome, "pastor registration")
}
