//! [`SqliteStore`], the SQLite implementation of [`RegistryStore`].

use std::{
  collections::BTreeMap,
  path::Path,
  sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
  },
};

use chrono::Utc;
use rusqlite::OptionalExtension as _;
use serde::Serialize;
use tokio::sync::Mutex;
use uuid::Uuid;

use obra_core::{
  ledger::{Contribution, NewContribution},
  pastor::{NewPastorRegistration, PastorRegistration},
  store::RegistryStore,
  view::{self, WorkerSummary},
  worker::{
    NewWorker, PaymentKind, WorkerPatch, WorkerRecord, WorkerType, next_worker_id,
  },
};

use crate::{
  Result,
  schema::SCHEMA,
  slot::{CONTRIBUTIONS_KEY, PASTORS_KEY, WORKERS_KEY, decode_slot, encode_slot},
};

// ─── In-memory state ─────────────────────────────────────────────────────────

#[derive(Default)]
struct Collections {
  workers:       Vec<WorkerRecord>,
  pastors:       Vec<PastorRegistration>,
  contributions: Vec<Contribution>,
}

// ─── Store ───────────────────────────────────────────────────────────────────

/// An Obra registry backed by a single SQLite file.
///
/// Collections live in memory and every mutation writes the affected
/// collection back as a whole. Mutations hold the state lock across the
/// write, so one store instance never interleaves two snapshot writes.
///
/// Cloning is cheap; the connection and state are reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn:               tokio_rusqlite::Connection,
  state:              Arc<Mutex<Collections>>,
  loaded:             Arc<AtomicBool>,
  max_snapshot_bytes: Option<usize>,
}

impl SqliteStore {
  /// Open (or create) a store at `path`, initialise the schema and load.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    Self::init(conn).await
  }

  /// Open an in-memory store, mostly for tests.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    Self::init(conn).await
  }

  async fn init(conn: tokio_rusqlite::Connection) -> Result<Self> {
    let store = Self {
      conn,
      state: Arc::default(),
      loaded: Arc::new(AtomicBool::new(false)),
      max_snapshot_bytes: None,
    };
    store
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    store.load().await?;
    Ok(store)
  }

  /// Reject snapshot writes larger than `limit` bytes.
  pub fn with_max_snapshot_bytes(mut self, limit: Option<usize>) -> Self {
    self.max_snapshot_bytes = limit;
    self
  }

  async fn read_slot(&self, key: &'static str) -> Result<Option<String>> {
    let raw: Option<String> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT value FROM slots WHERE key = ?1",
              rusqlite::params![key],
              |row| row.get(0),
            )
            .optional()?,
        )
      })
      .await?;
    Ok(raw)
  }

  /// Replace the stored value for `key`.
  pub(crate) async fn write_slot(&self, key: &'static str, value: String) -> Result<()> {
    let at = Utc::now().to_rfc3339();
    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO slots (key, value, updated_at) VALUES (?1, ?2, ?3)
           ON CONFLICT(key) DO UPDATE SET
             value      = excluded.value,
             updated_at = excluded.updated_at",
          rusqlite::params![key, value, at],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn persist<T: Serialize>(&self, key: &'static str, items: &[T]) -> Result<()> {
    let json = encode_slot(key, items, self.max_snapshot_bytes)?;
    let bytes = json.len();
    self.write_slot(key, json).await?;
    tracing::debug!(key, items = items.len(), bytes, "snapshot written");
    Ok(())
  }
}

// ─── RegistryStore impl ──────────────────────────────────────────────────────

impl RegistryStore for SqliteStore {
  type Error = crate::Error;

  // ── Lifecycle ─────────────────────────────────────────────────────────────

  async fn load(&self) -> Result<()> {
    let workers = self.read_slot(WORKERS_KEY).await?;
    let pastors = self.read_slot(PASTORS_KEY).await?;
    let contributions = self.read_slot(CONTRIBUTIONS_KEY).await?;

    let mut state = self.state.lock().await;
    state.workers = decode_slot(WORKERS_KEY, workers);
    state.pastors = decode_slot(PASTORS_KEY, pastors);
    state.contributions = decode_slot(CONTRIBUTIONS_KEY, contributions);
    self.loaded.store(true, Ordering::Release);

    tracing::info!(
      workers = state.workers.len(),
      pastors = state.pastors.len(),
      contributions = state.contributions.len(),
      "registry loaded"
    );
    Ok(())
  }

  fn is_loaded(&self) -> bool { self.loaded.load(Ordering::Acquire) }

  // ── Workers ───────────────────────────────────────────────────────────────

  async fn add_worker(&self, input: NewWorker) -> Result<WorkerRecord> {
    let mut state = self.state.lock().await;

    let now = Utc::now();
    let id = next_worker_id(now, &state.workers);
    if id != now.timestamp_millis().to_string() {
      tracing::debug!(%id, "worker id bumped past an existing id");
    }
    let record = WorkerRecord::from_new(id, now, input);

    let mut next = state.workers.clone();
    next.push(record.clone());
    self.persist(WORKERS_KEY, &next).await?;
    state.workers = next;

    tracing::info!(id = %record.id, created_by = %record.created_by, "worker added");
    Ok(record)
  }

  async fn get_worker(&self, id: &str) -> Result<Option<WorkerRecord>> {
    let state = self.state.lock().await;
    Ok(state.workers.iter().find(|r| r.id == id).cloned())
  }

  async fn list_workers(&self) -> Result<Vec<WorkerRecord>> {
    Ok(self.state.lock().await.workers.clone())
  }

  async fn update_worker(
    &self,
    id: &str,
    patch: WorkerPatch,
  ) -> Result<Option<WorkerRecord>> {
    let mut state = self.state.lock().await;
    let Some(pos) = state.workers.iter().position(|r| r.id == id) else {
      return Ok(None);
    };

    let mut next = state.workers.clone();
    patch.apply(&mut next[pos]);
    let updated = next[pos].clone();
    self.persist(WORKERS_KEY, &next).await?;
    state.workers = next;

    tracing::info!(%id, "worker updated");
    Ok(Some(updated))
  }

  async fn delete_worker(&self, id: &str) -> Result<bool> {
    let mut state = self.state.lock().await;
    if !state.workers.iter().any(|r| r.id == id) {
      return Ok(false);
    }

    let next: Vec<_> = state.workers.iter().filter(|r| r.id != id).cloned().collect();
    self.persist(WORKERS_KEY, &next).await?;
    state.workers = next;

    tracing::info!(%id, "worker deleted");
    Ok(true)
  }

  // ── Worker aggregates ─────────────────────────────────────────────────────

  async fn total_count(&self) -> Result<usize> {
    Ok(self.state.lock().await.workers.len())
  }

  async fn count_by_type(&self) -> Result<BTreeMap<WorkerType, usize>> {
    Ok(view::count_by_type(&self.state.lock().await.workers))
  }

  async fn count_by_payment_kind(&self) -> Result<BTreeMap<PaymentKind, usize>> {
    Ok(view::count_by_payment_kind(&self.state.lock().await.workers))
  }

  async fn worker_summary(&self) -> Result<WorkerSummary> {
    Ok(WorkerSummary::of(&self.state.lock().await.workers))
  }

  // ── Pastor registrations ──────────────────────────────────────────────────

  async fn add_pastor(&self, input: NewPastorRegistration) -> Result<PastorRegistration> {
    let registration = input.normalize()?.into_registration(Uuid::new_v4(), Utc::now());

    let mut state = self.state.lock().await;
    let mut next = state.pastors.clone();
    next.push(registration.clone());
    self.persist(PASTORS_KEY, &next).await?;
    state.pastors = next;

    tracing::info!(id = %registration.id, "pastor registration added");
    Ok(registration)
  }

  async fn list_pastors(&self) -> Result<Vec<PastorRegistration>> {
    Ok(self.state.lock().await.pastors.clone())
  }

  async fn delete_pastor(&self, id: Uuid) -> Result<bool> {
    let mut state = self.state.lock().await;
    if !state.pastors.iter().any(|p| p.id == id) {
      return Ok(false);
    }

    let next: Vec<_> = state.pastors.iter().filter(|p| p.id != id).cloned().collect();
    self.persist(PASTORS_KEY, &next).await?;
    state.pastors = next;

    tracing::info!(%id, "pastor registration deleted");
    Ok(true)
  }

  // ── Contribution ledger ───────────────────────────────────────────────────

  async fn add_contribution(&self, input: NewContribution) -> Result<Contribution> {
    let entry = input.into_contribution(Uuid::new_v4(), Utc::now());

    let mut state = self.state.lock().await;
    let mut next = state.contributions.clone();
    next.push(entry.clone());
    self.persist(CONTRIBUTIONS_KEY, &next).await?;
    state.contributions = next;

    tracing::info!(id = %entry.id, amount = %entry.amount, "contribution recorded");
    Ok(entry)
  }

  async fn list_contributions(&self) -> Result<Vec<Contribution>> {
    Ok(self.state.lock().await.contributions.clone())
  }

  async fn delete_contribution(&self, id: Uuid) -> Result<bool> {
    let mut state = self.state.lock().await;
    if !state.contributions.iter().any(|c| c.id == id) {
      return Ok(false);
    }

    let next: Vec<_> = state
      .contributions
      .iter()
      .filter(|c| c.id != id)
      .cloned()
      .collect();
    self.persist(CONTRIBUTIONS_KEY, &next).await?;
    state.contributions = next;

    tracing::info!(%id, "contribution deleted");
    Ok(true)
  }
}
