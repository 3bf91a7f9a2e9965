//! Worker records: the "obreiros" tracked by the registry.
//!
//! A worker record is created once through the registration form, may be
//! patched field by field afterwards, and is removed by id. The collection is
//! persisted as a whole snapshot, so everything here derives `Serialize` and
//! `Deserialize` with the camelCase layout the snapshot uses.

use std::collections::HashSet;

use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString};

use crate::{Error, Result};

/// Actor id recorded when no authenticated user is available.
pub const UNKNOWN_ACTOR: &str = "unknown";

pub(crate) fn unknown_actor() -> String { UNKNOWN_ACTOR.to_owned() }

// ─── Worker type ─────────────────────────────────────────────────────────────

/// The role a worker holds in the organization.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  PartialOrd,
  Ord,
  Hash,
  Serialize,
  Deserialize,
  Display,
  EnumString,
  EnumIter,
  AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum WorkerType {
  Pastor,
  Missionary,
  Evangelist,
  Retired,
}

impl WorkerType {
  /// Label shown to Portuguese-speaking users.
  pub fn label(self) -> &'static str {
    match self {
      Self::Pastor => "Pastor",
      Self::Missionary => "Missionário",
      Self::Evangelist => "Evangelista",
      Self::Retired => "Jubilado",
    }
  }
}

// ─── Payment ─────────────────────────────────────────────────────────────────

/// Discriminant of [`Payment`], used by filters and counters.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  PartialOrd,
  Ord,
  Hash,
  Default,
  Serialize,
  Deserialize,
  Display,
  EnumString,
  EnumIter,
  AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum PaymentKind {
  #[default]
  Cash,
  Bank,
}

impl PaymentKind {
  pub fn label(self) -> &'static str {
    match self {
      Self::Cash => "Dinheiro",
      Self::Bank => "Banco",
    }
  }
}

/// How a worker receives their support.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Payment {
  Cash,
  Bank {
    agency:           String,
    #[serde(
      rename = "savingsAccount",
      default,
      skip_serializing_if = "Option::is_none"
    )]
    savings_account:  Option<String>,
    #[serde(
      rename = "checkingAccount",
      default,
      skip_serializing_if = "Option::is_none"
    )]
    checking_account: Option<String>,
  },
}

impl Payment {
  pub fn kind(&self) -> PaymentKind {
    match self {
      Self::Cash => PaymentKind::Cash,
      Self::Bank { .. } => PaymentKind::Bank,
    }
  }
}

// ─── WorkerRecord ────────────────────────────────────────────────────────────

/// A persisted worker. `id` and `created_at` are assigned by the store and
/// never change afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkerRecord {
  pub id:               String,
  pub full_name:        String,
  pub sector:           String,
  pub field:            String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub missionary_field: Option<String>,
  pub worker_type:      WorkerType,
  pub payment:          Payment,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub notes:            Option<String>,
  #[serde(default = "unknown_actor")]
  pub created_by:       String,
  pub created_at:       DateTime<Utc>,
}

impl WorkerRecord {
  /// Build the stored record from a validated input.
  pub fn from_new(id: String, created_at: DateTime<Utc>, input: NewWorker) -> Self {
    Self {
      id,
      full_name: input.full_name,
      sector: input.sector,
      field: input.field,
      missionary_field: input.missionary_field,
      worker_type: input.worker_type,
      payment: input.payment,
      notes: input.notes,
      created_by: input.created_by,
      created_at,
    }
  }

  /// Calendar year (UTC) the record was created in.
  pub fn created_year(&self) -> i32 { self.created_at.year() }
}

// ─── NewWorker ───────────────────────────────────────────────────────────────

/// Input to [`crate::store::RegistryStore::add_worker`]: a record minus the
/// store-assigned `id` and `created_at`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewWorker {
  pub full_name:        String,
  pub sector:           String,
  pub field:            String,
  #[serde(default)]
  pub missionary_field: Option<String>,
  pub worker_type:      WorkerType,
  pub payment:          Payment,
  #[serde(default)]
  pub notes:            Option<String>,
  #[serde(default = "unknown_actor")]
  pub created_by:       String,
}

// ─── WorkerPatch ─────────────────────────────────────────────────────────────

/// Partial replacement for an existing record.
///
/// `None` leaves a field untouched. For the optional text fields the inner
/// option distinguishes "clear" (`Some(None)`, JSON `null`) from "absent".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkerPatch {
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub full_name:        Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub sector:           Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub field:            Option<String>,
  #[serde(
    default,
    deserialize_with = "double_option",
    skip_serializing_if = "Option::is_none"
  )]
  pub missionary_field: Option<Option<String>>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub worker_type:      Option<WorkerType>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub payment:          Option<Payment>,
  #[serde(
    default,
    deserialize_with = "double_option",
    skip_serializing_if = "Option::is_none"
  )]
  pub notes:            Option<Option<String>>,
}

impl WorkerPatch {
  pub fn is_empty(&self) -> bool { *self == Self::default() }

  /// Overwrite the fields present in the patch. `id`, `created_by` and
  /// `created_at` are never touched.
  pub fn apply(&self, record: &mut WorkerRecord) {
    if let Some(v) = &self.full_name {
      record.full_name = v.clone();
    }
    if let Some(v) = &self.sector {
      record.sector = v.clone();
    }
    if let Some(v) = &self.field {
      record.field = v.clone();
    }
    if let Some(v) = &self.missionary_field {
      record.missionary_field = v.clone();
    }
    if let Some(v) = self.worker_type {
      record.worker_type = v;
    }
    if let Some(v) = &self.payment {
      record.payment = v.clone();
    }
    if let Some(v) = &self.notes {
      record.notes = v.clone();
    }
  }

  /// Trim text and check the record invariants: name, sector and field
  /// stay non-blank, and a bank payment keeps its agency. Blank optional
  /// text becomes a clear (`Some(None)`).
  pub fn normalize(mut self) -> Result<Self> {
    for (name, value) in [
      ("fullName", &mut self.full_name),
      ("sector", &mut self.sector),
      ("field", &mut self.field),
    ] {
      if let Some(v) = value {
        *v = v.trim().to_owned();
        if v.is_empty() {
          return Err(Error::Invalid(format!("{name} must not be blank")));
        }
      }
    }
    self.missionary_field = self.missionary_field.map(trimmed);
    self.notes = self.notes.map(trimmed);

    if let Some(Payment::Bank {
      agency,
      savings_account,
      checking_account,
    }) = &mut self.payment
    {
      *agency = agency.trim().to_owned();
      if agency.is_empty() {
        return Err(Error::Invalid("agency is required for bank payment".into()));
      }
      *savings_account = trimmed(savings_account.take());
      *checking_account = trimmed(checking_account.take());
    }
    Ok(self)
  }
}

fn trimmed(value: Option<String>) -> Option<String> {
  value
    .map(|v| v.trim().to_owned())
    .filter(|v| !v.is_empty())
}

fn double_option<'de, T, D>(de: D) -> Result<Option<Option<T>>, D::Error>
where
  T: Deserialize<'de>,
  D: Deserializer<'de>,
{
  Option::<T>::deserialize(de).map(Some)
}

// ─── Id generation ───────────────────────────────────────────────────────────

/// Next worker id: the creation time in epoch milliseconds, bumped past the
/// largest numeric id already in use so rapid successive adds never collide.
/// When no larger number fits in an `i64`, the id gets a `-n` suffix instead.
pub fn next_worker_id<'a>(
  now: DateTime<Utc>,
  existing: impl IntoIterator<Item = &'a WorkerRecord>,
) -> String {
  let taken: HashSet<&str> = existing.into_iter().map(|r| r.id.as_str()).collect();
  let candidate = now.timestamp_millis();
  let max_taken = taken.iter().filter_map(|id| id.parse::<i64>().ok()).max();
  let base = match max_taken {
    Some(max) if max >= candidate => match max.checked_add(1) {
      Some(next) => return next.to_string(),
      None => max,
    },
    _ => return candidate.to_string(),
  };
  (1u64..)
    .map(|n| format!("{base}-{n}"))
    .find(|id| !taken.contains(id.as_str()))
    .unwrap_or_default()
}

#[cfg(test)]
mod tests {
  use chrono::TimeZone;

  use super::*;

  fn record(id: &str) -> WorkerRecord {
    WorkerRecord {
      id:               id.into(),
      full_name:        "Maria Silva".into(),
      sector:           "Setor Central".into(),
      field:            "Sede".into(),
      missionary_field: None,
      worker_type:      WorkerType::Pastor,
      payment:          Payment::Cash,
      notes:            None,
      created_by:       "admin".into(),
      created_at:       Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap(),
    }
  }

  #[test]
  fn id_is_timestamp_when_free() {
    let now = Utc.timestamp_millis_opt(1_700_000_000_000).unwrap();
    assert_eq!(next_worker_id(now, &[record("1")]), "1700000000000");
  }

  #[test]
  fn id_is_bumped_on_collision() {
    let now = Utc.timestamp_millis_opt(1_700_000_000_000).unwrap();
    let taken = [record("1700000000000"), record("1700000000001")];
    assert_eq!(next_worker_id(now, &taken), "1700000000002");
  }

  #[test]
  fn id_past_i64_max_gets_suffix() {
    let now = Utc.timestamp_millis_opt(1_700_000_000_000).unwrap();
    let max = i64::MAX.to_string();
    let taken = [record(&max)];
    assert_eq!(next_worker_id(now, &taken), format!("{max}-1"));

    let taken = [record(&max), record(&format!("{max}-1"))];
    assert_eq!(next_worker_id(now, &taken), format!("{max}-2"));
  }

  #[test]
  fn patch_touches_only_given_fields() {
    let mut r = record("1");
    let patch = WorkerPatch {
      notes: Some(Some("transferido".into())),
      ..WorkerPatch::default()
    };
    patch.apply(&mut r);

    let mut expected = record("1");
    expected.notes = Some("transferido".into());
    assert_eq!(r, expected);
  }

  #[test]
  fn patch_null_clears_optional_field() {
    let mut r = record("1");
    r.missionary_field = Some("Angola".into());
    let patch: WorkerPatch =
      serde_json::from_str(r#"{"missionaryField":null}"#).unwrap();
    assert_eq!(patch.missionary_field, Some(None));
    patch.apply(&mut r);
    assert_eq!(r.missionary_field, None);

    let absent: WorkerPatch = serde_json::from_str("{}").unwrap();
    assert!(absent.is_empty());
  }

  #[test]
  fn patch_normalize_trims_and_clears_blank_text() {
    let patch: WorkerPatch = serde_json::from_str(
      r#"{"fullName":"  Maria Souza ","notes":"   ","missionaryField":" Angola ",
          "payment":{"kind":"bank","agency":" 0001 ","savingsAccount":"  "}}"#,
    )
    .unwrap();
    let patch = patch.normalize().unwrap();
    assert_eq!(patch.full_name.as_deref(), Some("Maria Souza"));
    assert_eq!(patch.notes, Some(None));
    assert_eq!(patch.missionary_field, Some(Some("Angola".into())));
    assert_eq!(
      patch.payment,
      Some(Payment::Bank {
        agency:           "0001".into(),
        savings_account:  None,
        checking_account: None,
      })
    );
  }

  #[test]
  fn patch_normalize_rejects_blank_name_and_agency() {
    let blank_name = WorkerPatch {
      full_name: Some("   ".into()),
      ..WorkerPatch::default()
    };
    assert!(matches!(blank_name.normalize(), Err(Error::Invalid(_))));

    let blank_agency = WorkerPatch {
      payment: Some(Payment::Bank {
        agency:           " ".into(),
        savings_account:  None,
        checking_account: Some("123".into()),
      }),
      ..WorkerPatch::default()
    };
    assert!(matches!(blank_agency.normalize(), Err(Error::Invalid(_))));
  }

  #[test]
  fn snapshot_layout_is_camel_case_with_tagged_payment() {
    let mut r = record("42");
    r.payment = Payment::Bank {
      agency:           "0001".into(),
      savings_account:  None,
      checking_account: Some("12345-6".into()),
    };
    let json = serde_json::to_value(&r).unwrap();
    assert_eq!(json["fullName"], "Maria Silva");
    assert_eq!(json["workerType"], "pastor");
    assert_eq!(json["payment"]["kind"], "bank");
    assert_eq!(json["payment"]["checkingAccount"], "12345-6");
    assert!(json["payment"].get("savingsAccount").is_none());
    assert!(json.get("missionaryField").is_none());
  }

  #[test]
  fn missing_created_by_defaults_to_unknown() {
    let json = r#"{
      "id": "1", "fullName": "João", "sector": "Setor Central", "field": "Sede",
      "workerType": "retired", "payment": {"kind": "cash"},
      "createdAt": "2024-01-01T00:00:00Z"
    }"#;
    let r: WorkerRecord = serde_json::from_str(json).unwrap();
    assert_eq!(r.created_by, UNKNOWN_ACTOR);
    assert_eq!(r.created_year(), 2024);
  }
}
