//! The sector → field mapping.
//!
//! Fixed at configuration time. Records are validated against it when they
//! are created and never re-validated afterwards.

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// One sector and the fields that belong to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sector {
  pub name:   String,
  pub fields: Vec<String>,
}

/// Ordered list of sectors with their fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Catalog {
  sectors: Vec<Sector>,
}

impl Catalog {
  pub fn new(sectors: Vec<Sector>) -> Self { Self { sectors } }

  pub fn sectors(&self) -> impl Iterator<Item = &str> {
    self.sectors.iter().map(|s| s.name.as_str())
  }

  /// Fields of `sector`, empty when the sector is unknown.
  pub fn fields_of(&self, sector: &str) -> &[String] {
    self
      .sectors
      .iter()
      .find(|s| s.name == sector)
      .map(|s| s.fields.as_slice())
      .unwrap_or_default()
  }

  pub fn has_sector(&self, sector: &str) -> bool {
    self.sectors.iter().any(|s| s.name == sector)
  }

  pub fn contains(&self, sector: &str, field: &str) -> bool {
    self.fields_of(sector).iter().any(|f| f == field)
  }

  /// Check that `(sector, field)` is a valid pair.
  pub fn validate(&self, sector: &str, field: &str) -> Result<()> {
    if !self.has_sector(sector) {
      return Err(Error::UnknownSector(sector.to_owned()));
    }
    if !self.contains(sector, field) {
      return Err(Error::FieldNotInSector {
        sector: sector.to_owned(),
        field:  field.to_owned(),
      });
    }
    Ok(())
  }
}

impl Default for Catalog {
  fn default() -> Self {
    let sector = |name: &str, fields: &[&str]| Sector {
      name:   name.to_owned(),
      fields: fields.iter().map(|f| (*f).to_owned()).collect(),
    };
    Self::new(vec![
      sector("Setor Central", &["Sede", "Vila Nova", "Jardim América"]),
      sector("Setor Norte", &["Santa Maria", "Boa Vista", "Planalto"]),
      sector("Setor Sul", &["São José", "Bela Vista"]),
      sector("Setor Leste", &["Nova Esperança", "Alvorada", "Primavera"]),
      sector("Setor Oeste", &["Morada do Sol", "Monte Sião"]),
    ])
  }
}
