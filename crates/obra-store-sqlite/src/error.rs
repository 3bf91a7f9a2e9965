//! Error type for `obra-store-sqlite`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("core error: {0}")]
  Core(#[from] obra_core::Error),

  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("json error: {0}")]
  Json(#[from] serde_json::Error),

  /// The snapshot for `key` would exceed the configured storage quota.
  #[error("snapshot for {key:?} is {size} bytes, over the {limit} byte limit")]
  Capacity {
    key:   &'static str,
    size:  usize,
    limit: usize,
  },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
