//! Encoding and decoding of collection snapshots.
//!
//! Decoding is tolerant: a missing or malformed snapshot becomes an empty
//! collection and a logged warning, never an error.

use serde::{Serialize, de::DeserializeOwned};

use crate::{Error, Result};

pub const WORKERS_KEY: &str = "obreiros";
pub const PASTORS_KEY: &str = "pastores";
pub const CONTRIBUTIONS_KEY: &str = "contribuicoes";

/// Parse a snapshot, falling back to an empty collection.
pub fn decode_slot<T: DeserializeOwned>(key: &str, raw: Option<String>) -> Vec<T> {
  let Some(raw) = raw else {
    tracing::debug!(key, "no snapshot stored; starting empty");
    return Vec::new();
  };
  match serde_json::from_str(&raw) {
    Ok(items) => items,
    Err(e) => {
      tracing::warn!(key, error = %e, "discarding unreadable snapshot");
      Vec::new()
    }
  }
}

/// Serialize a snapshot, enforcing the optional size limit.
pub fn encode_slot<T: Serialize>(
  key: &'static str,
  items: &[T],
  limit: Option<usize>,
) -> Result<String> {
  let json = serde_json::to_string(items)?;
  if let Some(limit) = limit
    && json.len() > limit
  {
    return Err(Error::Capacity {
      key,
      size: json.len(),
      limit,
    });
  }
  Ok(json)
}
