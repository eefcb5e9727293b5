//! Validated stock quantities.
//!
//! Every quantity that enters the ledger through a tracked mutation passes
//! through [`Quantity`], so stored stock never goes negative as a result of
//! an add, update, or import.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// A non-negative stock count.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(try_from = "i64", into = "i64")]
pub struct Quantity(i64);

impl Quantity {
  pub const ZERO: Self = Self(0);

  pub fn new(n: i64) -> Result<Self> {
    if n < 0 {
      return Err(Error::NegativeQuantity(n));
    }
    Ok(Self(n))
  }

  pub fn get(self) -> i64 { self.0 }

  /// Accumulate `other` onto a stored quantity, as the import reconciler
  /// does for a matched row.
  pub fn accumulate(existing: i64, other: Self) -> Result<Self> {
    existing
      .checked_add(other.0)
      .ok_or(Error::QuantityOverflow { existing, added: other.0 })
      .and_then(Self::new)
  }
}

impl FromStr for Quantity {
  type Err = Error;

  /// Parse a decimal integer literal. Surrounding whitespace and a leading
  /// `+` are accepted; anything else that is not an integer is rejected.
  fn from_str(s: &str) -> Result<Self> {
    let n: i64 = s
      .trim()
      .parse()
      .map_err(|_| Error::InvalidQuantity(s.to_owned()))?;
    Self::new(n)
  }
}

impl TryFrom<i64> for Quantity {
  type Error = Error;

  fn try_from(n: i64) -> Result<Self> { Self::new(n) }
}

impl From<Quantity> for i64 {
  fn from(q: Quantity) -> Self { q.0 }
}

impl fmt::Display for Quantity {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    fmt::Display::fmt(&self.0, f)
  }
}
