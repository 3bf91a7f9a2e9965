//! The worker registration form.
//!
//! Holds raw user input for one new worker, keeps the sector/field selection
//! consistent with the [`Catalog`], and turns the draft into a normalized
//! [`NewWorker`] on submit.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
  catalog::Catalog,
  worker::{NewWorker, Payment, PaymentKind, UNKNOWN_ACTOR, WorkerType},
};

/// Why a submission was rejected. The form keeps its inputs either way.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormError {
  #[error("missing required fields: {}", .0.join(", "))]
  Incomplete(Vec<&'static str>),

  #[error("field {field:?} does not belong to sector {sector:?}")]
  InvalidLocation { sector: String, field: String },
}

/// Draft inputs of the registration form.
///
/// Text inputs are kept exactly as typed; trimming happens on submit.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RegistrationForm {
  pub full_name:        String,
  pub worker_type:      Option<WorkerType>,
  pub sector:           String,
  pub field:            String,
  pub missionary_field: String,
  pub payment_kind:     PaymentKind,
  pub agency:           String,
  pub savings_account:  String,
  pub checking_account: String,
  pub notes:            String,
}

impl RegistrationForm {
  pub fn new() -> Self { Self::default() }

  /// Choose a sector. Any previously selected field is cleared, since field
  /// choices depend on the sector.
  pub fn select_sector(&mut self, sector: impl Into<String>) {
    self.sector = sector.into();
    self.field.clear();
  }

  /// Fields the user may pick for the current sector.
  pub fn field_choices<'c>(&self, catalog: &'c Catalog) -> &'c [String] {
    catalog.fields_of(&self.sector)
  }

  /// Choose a field; refused when it is not offered for the current sector.
  pub fn select_field(
    &mut self,
    catalog: &Catalog,
    field: &str,
  ) -> Result<(), FormError> {
    if !catalog.contains(&self.sector, field) {
      return Err(FormError::InvalidLocation {
        sector: self.sector.clone(),
        field:  field.to_owned(),
      });
    }
    self.field = field.to_owned();
    Ok(())
  }

  /// Bank payment with no account number typed. Only a hint to the user;
  /// submission still goes through.
  pub fn needs_account_hint(&self) -> bool {
    self.payment_kind == PaymentKind::Bank
      && self.savings_account.trim().is_empty()
      && self.checking_account.trim().is_empty()
  }

  /// Required inputs that are still blank, in form order.
  pub fn missing_fields(&self) -> Vec<&'static str> {
    let mut missing = Vec::new();
    if self.full_name.trim().is_empty() {
      missing.push("fullName");
    }
    if self.worker_type.is_none() {
      missing.push("workerType");
    }
    if self.sector.trim().is_empty() {
      missing.push("sector");
    }
    if self.field.trim().is_empty() {
      missing.push("field");
    }
    if self.payment_kind == PaymentKind::Bank && self.agency.trim().is_empty() {
      missing.push("agency");
    }
    missing
  }

  /// Validate and normalize the draft.
  ///
  /// On success the form is reset to its defaults, `on_close` is invoked so
  /// the host can dismiss it, and the normalized input is returned. `actor`
  /// is the acting user; [`UNKNOWN_ACTOR`] is recorded when absent.
  pub fn submit(
    &mut self,
    catalog: &Catalog,
    actor: Option<&str>,
    on_close: impl FnOnce(),
  ) -> Result<NewWorker, FormError> {
    let missing = self.missing_fields();
    if !missing.is_empty() {
      return Err(FormError::Incomplete(missing));
    }
    let Some(worker_type) = self.worker_type else {
      return Err(FormError::Incomplete(vec!["workerType"]));
    };

    let sector = self.sector.trim();
    let field = self.field.trim();
    if !catalog.contains(sector, field) {
      return Err(FormError::InvalidLocation {
        sector: sector.to_owned(),
        field:  field.to_owned(),
      });
    }

    let payment = match self.payment_kind {
      PaymentKind::Cash => Payment::Cash,
      PaymentKind::Bank => Payment::Bank {
        agency:           self.agency.trim().to_owned(),
        savings_account:  non_blank(&self.savings_account),
        checking_account: non_blank(&self.checking_account),
      },
    };

    let input = NewWorker {
      full_name: self.full_name.trim().to_owned(),
      sector: sector.to_owned(),
      field: field.to_owned(),
      missionary_field: non_blank(&self.missionary_field),
      worker_type,
      payment,
      notes: non_blank(&self.notes),
      created_by: actor
        .map(str::trim)
        .filter(|a| !a.is_empty())
        .unwrap_or(UNKNOWN_ACTOR)
        .to_owned(),
    };

    *self = Self::default();
    on_close();
    Ok(input)
  }
}

fn non_blank(s: &str) -> Option<String> {
  let t = s.trim();
  (!t.is_empty()).then(|| t.to_owned())
}
