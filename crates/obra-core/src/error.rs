//! Error types for `obra-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("unknown sector: {0:?}")]
  UnknownSector(String),

  #[error("field {field:?} does not belong to sector {sector:?}")]
  FieldNotInSector { sector: String, field: String },

  #[error("invalid record: {0}")]
  Invalid(String),

  #[error("serialization error: {0}")]
  Serialization(#[from] serde_json::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
