//! HTTP server for Obra.
//!
//! Wraps the JSON API from `obra-api` in Basic authentication, adds an
//! unauthenticated health probe, and traces every request.

pub mod auth;
pub mod error;

pub use error::Error;

use std::{path::PathBuf, sync::Arc};

use axum::{Json, Router, extract::State, middleware, routing::get};
use obra_core::{catalog::Catalog, store::RegistryStore};
use serde::Deserialize;
use serde_json::{Value, json};
use tower_http::trace::TraceLayer;

use auth::{AuthConfig, require_auth};

// ─── Configuration ────────────────────────────────────────────────────────────

/// One account allowed to use the API.
#[derive(Deserialize, Clone, Debug)]
pub struct UserConfig {
  pub username:      String,
  /// PHC string produced by argon2, e.g. `$argon2id$v=19$…`
  pub password_hash: String,
  #[serde(default)]
  pub admin:         bool,
  #[serde(default)]
  pub can_delete:    bool,
}

/// Runtime server configuration, deserialised from `config.toml` and `OBRA_*`.
#[derive(Deserialize, Clone, Debug)]
pub struct ServerConfig {
  pub host:               String,
  pub port:               u16,
  pub store_path:         PathBuf,
  /// Largest accepted collection snapshot, in bytes.
  #[serde(default)]
  pub max_snapshot_bytes: Option<usize>,
  #[serde(default)]
  pub users:              Vec<UserConfig>,
  /// Replaces the built-in sector/field catalog when present.
  #[serde(default)]
  pub catalog:            Option<Catalog>,
}

impl ServerConfig {
  pub fn catalog(&self) -> Catalog { self.catalog.clone().unwrap_or_default() }
}

// ─── Application state ────────────────────────────────────────────────────────

/// Shared state threaded through the server's own handlers.
pub struct AppState<S> {
  pub store:  Arc<S>,
  pub config: Arc<ServerConfig>,
  pub auth:   Arc<AuthConfig>,
}

impl<S> Clone for AppState<S> {
  fn clone(&self) -> Self {
    Self {
      store:  Arc::clone(&self.store),
      config: Arc::clone(&self.config),
      auth:   Arc::clone(&self.auth),
    }
  }
}

impl<S> AppState<S> {
  pub fn new(store: S, config: ServerConfig) -> Self {
    let auth = AuthConfig {
      users: config.users.clone(),
    };
    Self {
      store:  Arc::new(store),
      config: Arc::new(config),
      auth:   Arc::new(auth),
    }
  }
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// `GET /health`
async fn health<S>(State(state): State<AppState<S>>) -> Json<Value>
where
  S: RegistryStore + 'static,
{
  Json(json!({
    "status": "ok",
    "loaded": state.store.is_loaded(),
  }))
}

/// Build the full application router: `/health` plus the API under `/api`.
pub fn router<S>(state: AppState<S>) -> Router
where
  S: RegistryStore + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let api = obra_api::api_router(state.store.clone(), Arc::new(state.config.catalog()))
    .layer(middleware::from_fn_with_state(state.auth.clone(), require_auth));

  Router::new()
    .route("/health", get(health::<S>))
    .with_state(state)
    .nest("/api", api)
    .layer(TraceLayer::new_for_http())
}

#[cfg(test)]
mod tests {
  use super::*;

  use argon2::{Argon2, PasswordHasher, password_hash::SaltString};
  use axum::{
    body::Body,
    http::{Request, StatusCode, header},
  };
  use base64::Engine as _;
  use base64::engine::general_purpose::STANDARD as B64;
  use obra_store_sqlite::SqliteStore;
  use rand_core::OsRng;
  use tower::ServiceExt as _;

  fn hash(password: &str) -> String {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
      .hash_password(password.as_bytes(), &salt)
      .unwrap()
      .to_string()
  }

  async fn make_app() -> Router {
    let store = SqliteStore::open_in_memory().await.unwrap();
    let config = ServerConfig {
      host:               "127.0.0.1".to_string(),
      port:               5282,
      store_path:         PathBuf::from(":memory:"),
      max_snapshot_bytes: None,
      users:              vec![
        UserConfig {
          username:      "secretaria".to_string(),
          password_hash: hash("secret"),
          admin:         false,
          can_delete:    false,
        },
        UserConfig {
          username:      "pastor".to_string(),
          password_hash: hash("presidente"),
          admin:         true,
          can_delete:    false,
        },
      ],
      catalog:            None,
    };
    router(AppState::new(store, config))
  }

  fn auth_header(user: &str, pass: &str) -> String {
    format!("Basic {}", B64.encode(format!("{user}:{pass}")))
  }

  async fn call(
    app: &Router,
    method: &str,
    uri: &str,
    creds: Option<(&str, &str)>,
    body: Option<Value>,
  ) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some((user, pass)) = creds {
      builder = builder.header(header::AUTHORIZATION, auth_header(user, pass));
    }
    let req = match body {
      Some(b) => builder
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(b.to_string()))
        .unwrap(),
      None => builder.body(Body::empty()).unwrap(),
    };
    let resp = app.clone().oneshot(req).await.unwrap();
    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
  }

  fn new_worker() -> Value {
    json!({
      "fullName": "Maria Silva",
      "workerType": "pastor",
      "sector": "Setor Central",
      "field": "Sede",
    })
  }

  #[tokio::test]
  async fn health_needs_no_credentials() {
    let app = make_app().await;
    let (status, body) = call(&app, "GET", "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["loaded"], true);
  }

  #[tokio::test]
  async fn api_rejects_missing_or_wrong_credentials() {
    let app = make_app().await;

    let req = Request::builder().uri("/api/workers").body(Body::empty()).unwrap();
    let resp = app.clone().oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    assert!(resp.headers().contains_key(header::WWW_AUTHENTICATE));

    let (status, _) =
      call(&app, "GET", "/api/workers", Some(("secretaria", "nope")), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
  }

  #[tokio::test]
  async fn authenticated_user_is_recorded_as_creator() {
    let app = make_app().await;
    let creds = Some(("secretaria", "secret"));

    let (status, record) = call(&app, "POST", "/api/workers", creds, Some(new_worker())).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(record["createdBy"], "secretaria");

    let (status, view) = call(&app, "GET", "/api/workers", creds, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(view["summary"]["total"], 1);
  }

  #[tokio::test]
  async fn delete_rights_follow_the_account() {
    let app = make_app().await;
    let (_, record) = call(
      &app,
      "POST",
      "/api/workers",
      Some(("secretaria", "secret")),
      Some(new_worker()),
    )
    .await;
    let uri = format!("/api/workers/{}?confirm=true", record["id"].as_str().unwrap());

    let (status, _) = call(&app, "DELETE", &uri, Some(("secretaria", "secret")), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = call(&app, "DELETE", &uri, Some(("pastor", "presidente")), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
  }

  #[test]
  fn config_deserialises_with_defaults() {
    let cfg: ServerConfig = serde_json::from_value(json!({
      "host": "0.0.0.0",
      "port": 8080,
      "store_path": "/var/lib/obra/obra.db",
      "users": [{ "username": "a", "password_hash": "x" }],
    }))
    .unwrap();
    assert!(cfg.max_snapshot_bytes.is_none());
    assert!(!cfg.users[0].admin && !cfg.users[0].can_delete);
    assert_eq!(cfg.catalog(), Catalog::default());
  }
}
