//! Display helpers for money and dates.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Locales the registry renders dates for.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Display, EnumString,
)]
pub enum Locale {
  #[default]
  #[serde(rename = "pt-BR")]
  #[strum(serialize = "pt-BR")]
  PtBr,
  #[serde(rename = "en-US")]
  #[strum(serialize = "en-US")]
  EnUs,
}

impl Locale {
  fn date_pattern(self) -> &'static str {
    match self {
      Self::PtBr => "%d/%m/%Y",
      Self::EnUs => "%m/%d/%Y",
    }
  }
}

/// Format an amount as Brazilian reais: `R$ 1.234,56`.
pub fn format_brl(amount: Decimal) -> String {
  let mut abs = amount.abs().round_dp(2);
  abs.rescale(2);
  let plain = abs.to_string();
  let (int_part, frac_part) = plain.split_once('.').unwrap_or((plain.as_str(), "00"));

  let digits: Vec<char> = int_part.chars().collect();
  let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
  for (i, c) in digits.iter().enumerate() {
    if i > 0 && (digits.len() - i) % 3 == 0 {
      grouped.push('.');
    }
    grouped.push(*c);
  }

  let sign = if amount.is_sign_negative() && !abs.is_zero() { "-" } else { "" };
  format!("{sign}R$ {grouped},{frac_part}")
}

pub fn format_date(date: NaiveDate, locale: Locale) -> String {
  date.format(locale.date_pattern()).to_string()
}

/// Date plus `HH:MM`, rendered in UTC.
pub fn format_datetime(at: DateTime<Utc>, locale: Locale) -> String {
  format!(
    "{} {}",
    at.format(locale.date_pattern()),
    at.format("%H:%M")
  )
}
