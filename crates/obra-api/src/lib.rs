//! JSON REST API for Obra.
//!
//! Exposes an axum [`Router`] backed by any [`obra_core::store::RegistryStore`].
//! Authentication, TLS, and transport concerns are the caller's
//! responsibility: an upstream layer inserts the acting
//! [`Principal`] into request extensions, and requests without one act as
//! [`Principal::anonymous`].
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", obra_api::api_router(store.clone(), catalog.clone()))
//! ```

pub mod contributions;
pub mod error;
pub mod pastors;
pub mod workers;

use std::{convert::Infallible, sync::Arc};

use axum::{
  Json, Router,
  extract::{FromRequestParts, State},
  http::{StatusCode, request::Parts},
  routing::get,
};
use obra_core::{
  access::{DeleteOutcome, Principal},
  catalog::Catalog,
  store::RegistryStore,
};
use serde::Deserialize;

pub use error::ApiError;

// ─── State ────────────────────────────────────────────────────────────────────

/// Shared state threaded through all API handlers.
pub struct ApiState<S> {
  pub store:   Arc<S>,
  pub catalog: Arc<Catalog>,
}

impl<S> Clone for ApiState<S> {
  fn clone(&self) -> Self {
    Self {
      store:   Arc::clone(&self.store),
      catalog: Arc::clone(&self.catalog),
    }
  }
}

// ─── Acting user ──────────────────────────────────────────────────────────────

/// The [`Principal`] attached to the request, or an anonymous one.
pub struct Actor(pub Principal);

impl<St: Send + Sync> FromRequestParts<St> for Actor {
  type Rejection = Infallible;

  async fn from_request_parts(
    parts: &mut Parts,
    _state: &St,
  ) -> Result<Self, Self::Rejection> {
    Ok(Actor(
      parts
        .extensions
        .get::<Principal>()
        .cloned()
        .unwrap_or_else(Principal::anonymous),
    ))
  }
}

// ─── Deletes ──────────────────────────────────────────────────────────────────

/// Query string accepted by every `DELETE` route.
#[derive(Debug, Default, Deserialize)]
pub struct DeleteParams {
  /// The client's answer to its confirmation prompt.
  #[serde(default)]
  pub confirm: bool,
}

pub(crate) fn delete_status(outcome: DeleteOutcome, what: &str) -> Result<StatusCode, ApiError> {
  match outcome {
    DeleteOutcome::Deleted => Ok(StatusCode::NO_CONTENT),
    DeleteOutcome::NotFound => Err(ApiError::NotFound(format!("{what} not found"))),
    DeleteOutcome::Declined => {
      Err(ApiError::Conflict("deletion not confirmed; pass confirm=true".into()))
    }
    DeleteOutcome::Forbidden => {
      Err(ApiError::Forbidden("not allowed to delete records".into()))
    }
  }
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// `GET /catalog`
async fn get_catalog<S: Send + Sync + 'static>(
  State(state): State<ApiState<S>>,
) -> Json<Catalog> {
  Json(state.catalog.as_ref().clone())
}

/// Build a fully-materialised API router for `store`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(store: Arc<S>, catalog: Arc<Catalog>) -> Router<()>
where
  S: RegistryStore + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  Router::new()
    // Workers
    .route("/workers", get(workers::list::<S>).post(workers::create::<S>))
    .route(
      "/workers/{id}",
      get(workers::get_one::<S>)
        .patch(workers::update::<S>)
        .delete(workers::delete_one::<S>),
    )
    .route("/summary", get(workers::summary::<S>))
    .route("/catalog", get(get_catalog::<S>))
    // Pastor registrations
    .route("/pastors", get(pastors::list::<S>).post(pastors::create::<S>))
    .route("/pastors/{id}", axum::routing::delete(pastors::delete_one::<S>))
    // Contribution ledger
    .route(
      "/contributions",
      get(contributions::list::<S>).post(contributions::create::<S>),
    )
    .route("/contributions/summary", get(contributions::summary::<S>))
    .route(
      "/contributions/{id}",
      axum::routing::delete(contributions::delete_one::<S>),
    )
    .with_state(ApiState { store, catalog })
}

#[cfg(test)]
mod tests;
