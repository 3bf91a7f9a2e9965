//! The field contribution ledger.
//!
//! Each entry records money a field sent in for a given reference month.
//! Totals are derived on read.

use std::{collections::BTreeMap, fmt, str::FromStr};

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, Result, catalog::Catalog};

// ─── Reference month ─────────────────────────────────────────────────────────

/// The month a contribution refers to, written `YYYY-MM`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ReferenceMonth {
  year:  i32,
  month: u32,
}

impl ReferenceMonth {
  pub fn new(year: i32, month: u32) -> Result<Self> {
    if !(1..=12).contains(&month) {
      return Err(Error::Invalid(format!("month out of range: {month}")));
    }
    Ok(Self { year, month })
  }

  pub fn year(self) -> i32 { self.year }

  pub fn month(self) -> u32 { self.month }
}

impl fmt::Display for ReferenceMonth {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{:04}-{:02}", self.year, self.month)
  }
}

impl FromStr for ReferenceMonth {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self> {
    let invalid = || Error::Invalid(format!("expected YYYY-MM, got {s:?}"));
    let (y, m) = s.trim().split_once('-').ok_or_else(invalid)?;
    let year = y.parse().map_err(|_| invalid())?;
    let month = m.parse().map_err(|_| invalid())?;
    Self::new(year, month)
  }
}

impl TryFrom<String> for ReferenceMonth {
  type Error = Error;

  fn try_from(s: String) -> Result<Self> { s.parse() }
}

impl From<ReferenceMonth> for String {
  fn from(m: ReferenceMonth) -> Self { m.to_string() }
}

// ─── Entries ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Contribution {
  pub id:              Uuid,
  pub sector:          String,
  pub field:           String,
  pub amount:          Decimal,
  pub reference_month: ReferenceMonth,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub notes:           Option<String>,
  pub created_by:      String,
  pub received_at:     DateTime<Utc>,
}

/// Input to [`crate::store::RegistryStore::add_contribution`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewContribution {
  pub sector:          String,
  pub field:           String,
  pub amount:          Decimal,
  pub reference_month: ReferenceMonth,
  #[serde(default)]
  pub notes:           Option<String>,
  #[serde(default = "crate::worker::unknown_actor")]
  pub created_by:      String,
}

impl NewContribution {
  /// Check the location against `catalog` and the amount for positivity and
  /// cent precision.
  pub fn normalize(mut self, catalog: &Catalog) -> Result<Self> {
    self.sector = self.sector.trim().to_owned();
    self.field = self.field.trim().to_owned();
    catalog.validate(&self.sector, &self.field)?;

    if self.amount <= Decimal::ZERO {
      return Err(Error::Invalid("amount must be positive".into()));
    }
    if self.amount.normalize().scale() > 2 {
      return Err(Error::Invalid("amount has more than two decimal places".into()));
    }
    self.notes = self
      .notes
      .map(|n| n.trim().to_owned())
      .filter(|n| !n.is_empty());
    Ok(self)
  }

  pub fn into_contribution(self, id: Uuid, received_at: DateTime<Utc>) -> Contribution {
    Contribution {
      id,
      sector: self.sector,
      field: self.field,
      amount: self.amount,
      reference_month: self.reference_month,
      notes: self.notes,
      created_by: self.created_by,
      received_at,
    }
  }
}

// ─── Summary ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerSummary {
  pub total:     Decimal,
  pub entries:   usize,
  pub by_sector: BTreeMap<String, Decimal>,
  pub by_month:  BTreeMap<ReferenceMonth, Decimal>,
}

impl LedgerSummary {
  pub fn of(entries: &[Contribution]) -> Self {
    let mut summary = Self {
      entries: entries.len(),
      ..Self::default()
    };
    for c in entries {
      summary.total += c.amount;
      *summary.by_sector.entry(c.sector.clone()).or_default() += c.amount;
      *summary.by_month.entry(c.reference_month).or_default() += c.amount;
    }
    summary
  }
}
