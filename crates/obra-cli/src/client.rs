//! Async HTTP client wrapping the obra JSON API.

use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use obra_core::{
  access::DeleteOutcome,
  catalog::Catalog,
  form::RegistrationForm,
  ledger::LedgerSummary,
  view::{WorkerSummary, WorkerView},
  worker::WorkerRecord,
};
use reqwest::{Client, Response, StatusCode};
use serde::Deserialize;

/// Connection settings for the obra API.
#[derive(Debug, Clone)]
pub struct ApiConfig {
  pub base_url: String,
  pub username: String,
  pub password: String,
}

/// Async HTTP client for the obra JSON REST API.
///
/// Cheap to clone; the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Clone)]
pub struct ApiClient {
  client: Client,
  config: ApiConfig,
}

#[derive(Deserialize)]
struct ErrorBody {
  error: String,
}

/// Turn a non-success response into an error carrying the server's message.
async fn ensure_success(resp: Response, what: &str) -> Result<Response> {
  let status = resp.status();
  if status.is_success() {
    return Ok(resp);
  }
  let message = resp
    .json::<ErrorBody>()
    .await
    .map(|b| b.error)
    .unwrap_or_else(|_| status.to_string());
  Err(anyhow!("{what} → {status}: {message}"))
}

impl ApiClient {
  pub fn new(config: ApiConfig) -> Result<Self> {
    let client = Client::builder()
      .timeout(Duration::from_secs(30))
      .build()
      .context("failed to build HTTP client")?;
    Ok(Self { client, config })
  }

  pub fn username(&self) -> Option<&str> {
    (!self.config.username.is_empty()).then_some(self.config.username.as_str())
  }

  fn url(&self, path: &str) -> String {
    format!(
      "{}/api{}",
      self.config.base_url.trim_end_matches('/'),
      path
    )
  }

  fn auth(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
    match self.username() {
      Some(user) => req.basic_auth(user, Some(&self.config.password)),
      None => req,
    }
  }

  async fn get_json<T: serde::de::DeserializeOwned>(&self, path: &str) -> Result<T> {
    let resp = self
      .auth(self.client.get(self.url(path)))
      .send()
      .await
      .with_context(|| format!("GET {path} failed"))?;
    let resp = ensure_success(resp, &format!("GET {path}")).await?;
    resp
      .json()
      .await
      .with_context(|| format!("deserialising GET {path}"))
  }

  // ── Workers ───────────────────────────────────────────────────────────────

  /// `GET /api/workers` with no filter; filtering happens locally.
  pub async fn list_workers(&self) -> Result<Vec<WorkerRecord>> {
    let view: WorkerView = self.get_json("/workers").await?;
    Ok(view.records)
  }

  /// `POST /api/workers`
  pub async fn create_worker(&self, form: &RegistrationForm) -> Result<WorkerRecord> {
    let resp = self
      .auth(self.client.post(self.url("/workers")))
      .json(form)
      .send()
      .await
      .context("POST /workers failed")?;
    let resp = ensure_success(resp, "POST /workers").await?;
    resp.json().await.context("deserialising created worker")
  }

  /// `DELETE /api/workers/{id}?confirm=true`, sent only after the user
  /// answered yes.
  pub async fn delete_worker(&self, id: &str) -> Result<DeleteOutcome> {
    let resp = self
      .auth(self.client.delete(self.url(&format!("/workers/{id}"))))
      .query(&[("confirm", "true")])
      .send()
      .await
      .context("DELETE /workers failed")?;
    match resp.status() {
      StatusCode::FORBIDDEN => Ok(DeleteOutcome::Forbidden),
      StatusCode::NOT_FOUND => Ok(DeleteOutcome::NotFound),
      StatusCode::CONFLICT => Ok(DeleteOutcome::Declined),
      _ => {
        ensure_success(resp, "DELETE /workers").await?;
        Ok(DeleteOutcome::Deleted)
      }
    }
  }

  /// `GET /api/summary`
  pub async fn summary(&self) -> Result<WorkerSummary> { self.get_json("/summary").await }

  // ── Reference data ────────────────────────────────────────────────────────

  /// `GET /api/catalog`
  pub async fn catalog(&self) -> Result<Catalog> { self.get_json("/catalog").await }

  /// `GET /api/contributions/summary`
  pub async fn ledger_summary(&self) -> Result<LedgerSummary> {
    self.get_json("/contributions/summary").await
  }
}
