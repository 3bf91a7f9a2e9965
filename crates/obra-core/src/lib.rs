//! Core types and trait definitions for the Obra registry.
//!
//! No HTTP or database code lives here. Storage backends implement
//! [`store::RegistryStore`]; the API, server and CLI depend on that
//! abstraction and on the pure derivations in [`view`].

pub mod access;
pub mod catalog;
pub mod error;
pub mod form;
pub mod format;
pub mod ledger;
pub mod pastor;
pub mod store;
pub mod view;
pub mod worker;

pub use error::{Error, Result};
