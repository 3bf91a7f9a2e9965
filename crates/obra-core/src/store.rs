//! The `RegistryStore` trait.
//!
//! Implemented by storage backends (e.g. `obra-store-sqlite`). The API,
//! server and CLI depend on this abstraction, not on a concrete backend.
//!
//! Every collection is held in memory and written back as a whole snapshot
//! after each mutation. A write error leaves the in-memory collection as it
//! was before the call.

use std::collections::BTreeMap;
use std::future::Future;

use uuid::Uuid;

use crate::{
  ledger::{Contribution, NewContribution},
  pastor::{NewPastorRegistration, PastorRegistration},
  view::WorkerSummary,
  worker::{NewWorker, PaymentKind, WorkerPatch, WorkerRecord, WorkerType},
};

/// Abstraction over an Obra registry backend.
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes (e.g. tokio with `axum`).
pub trait RegistryStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Lifecycle ─────────────────────────────────────────────────────────

  /// (Re)read every collection from persistent storage.
  ///
  /// Missing or unparseable snapshots yield empty collections; only errors
  /// reaching the storage itself are returned.
  fn load(&self) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Whether [`RegistryStore::load`] has completed at least once.
  fn is_loaded(&self) -> bool;

  // ── Workers ───────────────────────────────────────────────────────────

  /// Assign `id` and `created_at`, append, persist, and return the record.
  fn add_worker(
    &self,
    input: NewWorker,
  ) -> impl Future<Output = Result<WorkerRecord, Self::Error>> + Send + '_;

  fn get_worker<'a>(
    &'a self,
    id: &'a str,
  ) -> impl Future<Output = Result<Option<WorkerRecord>, Self::Error>> + Send + 'a;

  /// All workers in insertion order.
  fn list_workers(
    &self,
  ) -> impl Future<Output = Result<Vec<WorkerRecord>, Self::Error>> + Send + '_;

  /// Apply `patch` to the matching record and persist. Returns `None`, and
  /// writes nothing, when no record has `id`.
  fn update_worker<'a>(
    &'a self,
    id: &'a str,
    patch: WorkerPatch,
  ) -> impl Future<Output = Result<Option<WorkerRecord>, Self::Error>> + Send + 'a;

  /// Remove the matching record and persist. Returns whether one was removed.
  fn delete_worker<'a>(
    &'a self,
    id: &'a str,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + 'a;

  // ── Worker aggregates ─────────────────────────────────────────────────

  fn total_count(&self) -> impl Future<Output = Result<usize, Self::Error>> + Send + '_;

  fn count_by_type(
    &self,
  ) -> impl Future<Output = Result<BTreeMap<WorkerType, usize>, Self::Error>> + Send + '_;

  /// Always carries both `cash` and `bank`.
  fn count_by_payment_kind(
    &self,
  ) -> impl Future<Output = Result<BTreeMap<PaymentKind, usize>, Self::Error>> + Send + '_;

  /// All three counters at once.
  fn worker_summary(
    &self,
  ) -> impl Future<Output = Result<WorkerSummary, Self::Error>> + Send + '_;

  // ── Pastor registrations ──────────────────────────────────────────────

  fn add_pastor(
    &self,
    input: NewPastorRegistration,
  ) -> impl Future<Output = Result<PastorRegistration, Self::Error>> + Send + '_;

  fn list_pastors(
    &self,
  ) -> impl Future<Output = Result<Vec<PastorRegistration>, Self::Error>> + Send + '_;

  fn delete_pastor(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  // ── Contribution ledger ───────────────────────────────────────────────

  /// `input` is expected to be normalized against the catalog already.
  fn add_contribution(
    &self,
    input: NewContribution,
  ) -> impl Future<Output = Result<Contribution, Self::Error>> + Send + '_;

  fn list_contributions(
    &self,
  ) -> impl Future<Output = Result<Vec<Contribution>, Self::Error>> + Send + '_;

  fn delete_contribution(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;
}
