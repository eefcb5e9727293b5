//! Search Resolver: prioritised fallback search over component fields.
//!
//! A [`SearchPlan`] is an ordered list of field strategies. [`resolve`]
//! tries them in sequence against the live store and returns the first
//! non-empty result set; it never unions results across fields.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::{component::Component, store::InventoryStore};

// ─── Fields and matchers ─────────────────────────────────────────────────────

/// A single searchable component field.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum SearchField {
  Id,
  Name,
  Category,
  Location,
  Quantity,
  Value,
}

/// How a keyword is compared against a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Matcher {
  /// Case-insensitive substring match on a text column.
  Substring,
  /// Exact match on an integer column; only tried when the keyword is
  /// lexically an integer.
  ExactInteger,
}

impl SearchField {
  pub fn matcher(self) -> Matcher {
    match self {
      Self::Id | Self::Quantity => Matcher::ExactInteger,
      Self::Name | Self::Category | Self::Location | Self::Value => Matcher::Substring,
    }
  }
}

/// The prepared keyword handed to
/// [`InventoryStore::find_by_field`](crate::store::InventoryStore::find_by_field).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Needle {
  Text(String),
  Integer(i64),
}

impl Needle {
  /// Prepare `keyword` for `matcher`. Returns `None` when an integer matcher
  /// is given a non-integer keyword, in which case the strategy is skipped.
  pub fn for_matcher(keyword: &str, matcher: Matcher) -> Option<Self> {
    match matcher {
      Matcher::Substring => Some(Self::Text(keyword.to_owned())),
      Matcher::ExactInteger => keyword.parse().ok().map(Self::Integer),
    }
  }
}

// ─── Plan ────────────────────────────────────────────────────────────────────

/// An ordered list of field strategies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchPlan {
  fields: Vec<SearchField>,
}

impl SearchPlan {
  /// Name, then category, then location, then quantity.
  pub fn fallback() -> Self {
    Self {
      fields: vec![
        SearchField::Name,
        SearchField::Category,
        SearchField::Location,
        SearchField::Quantity,
      ],
    }
  }

  /// [`fallback`](Self::fallback) with an exact id match tried first.
  pub fn fallback_with_id() -> Self {
    let mut plan = Self::fallback();
    plan.fields.insert(0, SearchField::Id);
    plan
  }

  /// Field-targeted mode: query exactly one field, no fallback.
  pub fn only(field: SearchField) -> Self { Self { fields: vec![field] } }

  pub fn fields(&self) -> &[SearchField] { &self.fields }
}

impl Default for SearchPlan {
  fn default() -> Self { Self::fallback() }
}

// ─── Resolution ──────────────────────────────────────────────────────────────

/// The result of resolving a keyword.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum SearchOutcome {
  /// The first strategy that produced results, and those results.
  Matched {
    field:      SearchField,
    components: Vec<Component>,
  },
  /// No strategy in the plan matched. Not an error.
  NoMatch,
}

impl SearchOutcome {
  pub fn components(&self) -> &[Component] {
    match self {
      Self::Matched { components, .. } => components,
      Self::NoMatch => &[],
    }
  }
}

/// Resolve `keyword` by trying each strategy of `plan` in order, stopping
/// at the first that matches at least one component.
///
/// The keyword is trimmed first; a blank keyword resolves to
/// [`SearchOutcome::NoMatch`] without touching the store.
pub async fn resolve<S: InventoryStore>(
  store: &S,
  keyword: &str,
  plan: &SearchPlan,
) -> Result<SearchOutcome, S::Error> {
  let keyword = keyword.trim();
  if keyword.is_empty() {
    return Ok(SearchOutcome::NoMatch);
  }

  for &field in plan.fields() {
    let Some(needle) = Needle::for_matcher(keyword, field.matcher()) else {
      tracing::debug!(%field, keyword, "keyword is not an integer, skipping");
      continue;
    };

    let components = store.find_by_field(field, needle).await?;
    tracing::debug!(%field, keyword, hits = components.len(), "search strategy tried");

    if !components.is_empty() {
      return Ok(SearchOutcome::Matched { field, components });
    }
  }

  Ok(SearchOutcome::NoMatch)
}
