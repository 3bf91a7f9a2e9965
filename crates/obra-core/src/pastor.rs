//! Pastor household registrations: the pastor, spouse, children and the
//! fields the pastor has served in.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, Result};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Child {
  pub name:       String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub birth_date: Option<NaiveDate>,
}

/// A period during which the pastor led a field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldTenure {
  pub sector: String,
  pub field:  String,
  pub from:   NaiveDate,
  /// `None` while the tenure is current.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub until:  Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PastorRegistration {
  pub id:            Uuid,
  pub pastor_name:   String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub spouse_name:   Option<String>,
  #[serde(default)]
  pub children:      Vec<Child>,
  #[serde(default)]
  pub field_history: Vec<FieldTenure>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub notes:         Option<String>,
  pub created_by:    String,
  pub created_at:    DateTime<Utc>,
}

impl PastorRegistration {
  /// The tenure without an end date, if any.
  pub fn current_field(&self) -> Option<&FieldTenure> {
    self.field_history.iter().find(|t| t.until.is_none())
  }
}

/// Input to [`crate::store::RegistryStore::add_pastor`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPastorRegistration {
  pub pastor_name:   String,
  #[serde(default)]
  pub spouse_name:   Option<String>,
  #[serde(default)]
  pub children:      Vec<Child>,
  #[serde(default)]
  pub field_history: Vec<FieldTenure>,
  #[serde(default)]
  pub notes:         Option<String>,
  #[serde(default = "crate::worker::unknown_actor")]
  pub created_by:    String,
}

impl NewPastorRegistration {
  /// Trim text, drop blank optionals, and check the household is coherent.
  pub fn normalize(mut self) -> Result<Self> {
    self.pastor_name = self.pastor_name.trim().to_owned();
    if self.pastor_name.is_empty() {
      return Err(Error::Invalid("pastor name is required".into()));
    }
    self.spouse_name = trimmed(self.spouse_name);
    self.notes = trimmed(self.notes);

    for child in &mut self.children {
      child.name = child.name.trim().to_owned();
      if child.name.is_empty() {
        return Err(Error::Invalid("child name is required".into()));
      }
    }
    for tenure in &self.field_history {
      if tenure.until.is_some_and(|until| until < tenure.from) {
        return Err(Error::Invalid(format!(
          "tenure in {} ends before it starts",
          tenure.field
        )));
      }
    }
    Ok(self)
  }

  pub fn into_registration(
    self,
    id: Uuid,
    created_at: DateTime<Utc>,
  ) -> PastorRegistration {
    PastorRegistration {
      id,
      pastor_name: self.pastor_name,
      spouse_name: self.spouse_name,
      children: self.children,
      field_history: self.field_history,
      notes: self.notes,
      created_by: self.created_by,
      created_at,
    }
  }
}

fn trimmed(s: Option<String>) -> Option<String> {
  s.map(|v| v.trim().to_owned()).filter(|v| !v.is_empty())
}
