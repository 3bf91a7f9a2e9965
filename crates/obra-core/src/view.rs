//! Filtering, sorting and counting over the worker collection.
//!
//! Everything here is a pure function of `(records, filter)`. Views are
//! recomputed on demand; no incremental cache is kept.

use std::{collections::BTreeMap, fmt, str::FromStr};

use serde::{Deserialize, Deserializer, Serialize, de};
use strum::IntoEnumIterator as _;

use crate::worker::{PaymentKind, WorkerRecord, WorkerType};

// ─── Filter ──────────────────────────────────────────────────────────────────

/// Filter criteria; every `Some` criterion must hold.
///
/// A blank value (`?sector=` from an "all" selection) deserializes as absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkerFilter {
  /// Case-insensitive substring over name, field, sector and missionary field.
  #[serde(default, deserialize_with = "blank_as_none")]
  pub search:       Option<String>,
  #[serde(default, deserialize_with = "blank_as_none")]
  pub worker_type:  Option<WorkerType>,
  #[serde(default, deserialize_with = "blank_as_none")]
  pub sector:       Option<String>,
  #[serde(default, deserialize_with = "blank_as_none")]
  pub payment_kind: Option<PaymentKind>,
  /// UTC year of `created_at`.
  #[serde(default, deserialize_with = "blank_as_none")]
  pub year:         Option<i32>,
}

impl WorkerFilter {
  pub fn is_empty(&self) -> bool {
    self.search_term().is_none()
      && self.worker_type.is_none()
      && self.sector_name().is_none()
      && self.payment_kind.is_none()
      && self.year.is_none()
  }

  fn search_term(&self) -> Option<&str> {
    self.search.as_deref().map(str::trim).filter(|s| !s.is_empty())
  }

  fn sector_name(&self) -> Option<&str> {
    self.sector.as_deref().map(str::trim).filter(|s| !s.is_empty())
  }

  pub fn matches(&self, record: &WorkerRecord) -> bool {
    if let Some(term) = self.search_term() {
      let term = term.to_lowercase();
      let hit = [
        Some(record.full_name.as_str()),
        Some(record.field.as_str()),
        Some(record.sector.as_str()),
        record.missionary_field.as_deref(),
      ]
      .into_iter()
      .flatten()
      .any(|s| s.to_lowercase().contains(&term));
      if !hit {
        return false;
      }
    }
    if self.worker_type.is_some_and(|t| t != record.worker_type) {
      return false;
    }
    if self.sector_name().is_some_and(|s| s != record.sector) {
      return false;
    }
    if self
      .payment_kind
      .is_some_and(|k| k != record.payment.kind())
    {
      return false;
    }
    if self.year.is_some_and(|y| y != record.created_year()) {
      return false;
    }
    true
  }
}

/// Query-string values arrive as text and JSON ones may be numbers; blank
/// text means the criterion is not applied.
fn blank_as_none<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
  D: Deserializer<'de>,
  T: FromStr,
  T::Err: fmt::Display,
{
  #[derive(Deserialize)]
  #[serde(untagged)]
  enum Raw {
    Number(i64),
    Text(String),
  }

  let text = match Option::<Raw>::deserialize(deserializer)? {
    None => return Ok(None),
    Some(Raw::Number(n)) => n.to_string(),
    Some(Raw::Text(s)) => s,
  };
  let text = text.trim();
  if text.is_empty() {
    return Ok(None);
  }
  text.parse().map(Some).map_err(de::Error::custom)
}

// ─── Counters ────────────────────────────────────────────────────────────────

/// Count per worker type; every type has a key.
pub fn count_by_type(records: &[WorkerRecord]) -> BTreeMap<WorkerType, usize> {
  let mut counts: BTreeMap<_, _> = WorkerType::iter().map(|t| (t, 0)).collect();
  for r in records {
    *counts.entry(r.worker_type).or_default() += 1;
  }
  counts
}

/// Count per payment kind; `cash` and `bank` are always present.
pub fn count_by_payment_kind(
  records: &[WorkerRecord],
) -> BTreeMap<PaymentKind, usize> {
  let mut counts: BTreeMap<_, _> = PaymentKind::iter().map(|k| (k, 0)).collect();
  for r in records {
    *counts.entry(r.payment.kind()).or_default() += 1;
  }
  counts
}

/// Collection-wide counters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkerSummary {
  pub total:      usize,
  pub by_type:    BTreeMap<WorkerType, usize>,
  pub by_payment: BTreeMap<PaymentKind, usize>,
}

impl WorkerSummary {
  pub fn of(records: &[WorkerRecord]) -> Self {
    Self {
      total:      records.len(),
      by_type:    count_by_type(records),
      by_payment: count_by_payment_kind(records),
    }
  }
}

// ─── Derived view ────────────────────────────────────────────────────────────

/// What the list view renders: the filtered records, newest first, plus the
/// counters. `summary` covers the whole collection; `filtered` is the number
/// of records that passed the filter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkerView {
  pub summary:  WorkerSummary,
  pub filtered: usize,
  pub records:  Vec<WorkerRecord>,
}

/// Apply `filter` and sort by `created_at` descending. The sort is stable, so
/// records created in the same instant keep their collection order.
pub fn derive_view(records: &[WorkerRecord], filter: &WorkerFilter) -> WorkerView {
  let mut filtered: Vec<WorkerRecord> = records
    .iter()
    .filter(|r| filter.matches(r))
    .cloned()
    .collect();
  filtered.sort_by(|a, b| b.created_at.cmp(&a.created_at));

  WorkerView {
    summary:  WorkerSummary::of(records),
    filtered: filtered.len(),
    records:  filtered,
  }
}

/// Distinct creation years present in the collection, most recent first.
pub fn years_present(records: &[WorkerRecord]) -> Vec<i32> {
  let mut years: Vec<i32> = records.iter().map(WorkerRecord::created_year).collect();
  years.sort_unstable_by(|a, b| b.cmp(a));
  years.dedup();
  years
}
