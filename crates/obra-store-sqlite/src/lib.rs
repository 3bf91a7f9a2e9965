//! SQLite backend for the Obra registry.
//!
//! SQLite is used purely as a key-value blob store: each collection is one
//! JSON snapshot in the `slots` table. Access goes through [`tokio_rusqlite`]
//! so database work runs on a dedicated thread without blocking the async
//! runtime.

mod schema;
mod slot;
mod store;

pub mod error;

pub use error::{Error, Result};
pub use slot::{CONTRIBUTIONS_KEY, PASTORS_KEY, WORKERS_KEY};
pub use store::SqliteStore;
