//! Header validation and row decoding.
//!
//! Pipeline:
//!   csv::StringRecord (header)
//!     └─ check_header()   → abort the batch on mismatch
//!   csv::StringRecord (row)
//!     └─ decode_row()     → NewComponent | RowErrorKind

use stocktake_core::{component::NewComponent, quantity::Quantity};

use crate::{
  EXPECTED_HEADER,
  error::{ImportError, Result, RowErrorKind},
};

/// Column positions within a record, fixed by [`EXPECTED_HEADER`].
const NAME: usize = 0;
const QUANTITY: usize = 1;
const LOCATION: usize = 2;
const CATEGORY: usize = 3;
const VALUE: usize = 4;

/// Accept the header only if it is exactly the expected field names, in
/// order, with no surrounding whitespace.
pub(crate) fn check_header(header: &csv::StringRecord) -> Result<()> {
  if header.iter().eq(EXPECTED_HEADER) {
    return Ok(());
  }
  Err(ImportError::Header { found: header.iter().map(str::to_owned).collect() })
}

/// The `name` column of a record, if present and non-blank. Used to label
/// row errors.
pub(crate) fn row_name(record: &csv::StringRecord) -> Option<String> {
  record
    .get(NAME)
    .map(str::trim)
    .filter(|n| !n.is_empty())
    .map(str::to_owned)
}

/// Decode one data row into a proposal for the reconciler.
///
/// Every column must be present, though `location`, `category` and `value`
/// may be empty. `name` must be non-blank and `quantity` a non-negative
/// whole number.
pub(crate) fn decode_row(
  record: &csv::StringRecord,
) -> std::result::Result<NewComponent, RowErrorKind> {
  if record.len() > EXPECTED_HEADER.len() {
    return Err(RowErrorKind::Malformed(format!(
      "expected {} fields, found {}",
      EXPECTED_HEADER.len(),
      record.len()
    )));
  }

  let field = |i: usize| record.get(i).ok_or(RowErrorKind::MissingField(EXPECTED_HEADER[i]));

  let name = field(NAME)?;
  if name.trim().is_empty() {
    return Err(RowErrorKind::MissingField(EXPECTED_HEADER[NAME]));
  }
  let quantity_raw = field(QUANTITY)?;
  let location = field(LOCATION)?;
  let category = field(CATEGORY)?;
  let value = field(VALUE)?;

  let quantity: Quantity = quantity_raw.parse()?;

  let proposal = NewComponent {
    name: name.to_owned(),
    quantity,
    location: Some(location.to_owned()),
    category: Some(category.to_owned()),
    value: Some(value.to_owned()),
  };
  Ok(proposal.normalized()?)
}

#[cfg(test)]
mod tests {
  use super::*;

  fn record(fields: &[&str]) -> csv::StringRecord { csv::StringRecord::from(fields.to_vec()) }

  #[test]
  fn header_must_match_exactly() {
    assert!(check_header(&record(&EXPECTED_HEADER)).is_ok());

    let padded = record(&[" name", "quantity ", "location", "category", "value"]);
    assert!(matches!(
      check_header(&padded),
      Err(ImportError::Header { ref found }) if found[0] == " name"
    ));

    let err = check_header(&record(&["name", "quantity", "location", "category"]))
      .unwrap_err();
    assert!(matches!(err, ImportError::Header { ref found } if found.len() == 4));

    let reordered = record(&["name", "location", "quantity", "category", "value"]);
    assert!(check_header(&reordered).is_err());

    let upper = record(&["Name", "quantity", "location", "category", "value"]);
    assert!(check_header(&upper).is_err());
  }

  #[test]
  fn decodes_a_full_row() {
    let c = decode_row(&record(&["R1", " 10 ", "Drawer A", "Resistor", "1k"])).unwrap();
    assert_eq!(c.name, "R1");
    assert_eq!(c.quantity.get(), 10);
    assert_eq!(c.location.as_deref(), Some("Drawer A"));
    assert_eq!(c.category.as_deref(), Some("Resistor"));
    assert_eq!(c.value.as_deref(), Some("1k"));
  }

  #[test]
  fn empty_optional_columns_become_none() {
    let c = decode_row(&record(&["R1", "1", "", "", ""])).unwrap();
    assert_eq!((c.location, c.category, c.value), (None, None, None));
  }

  #[test]
  fn rejects_bad_quantities() {
    assert_eq!(
      decode_row(&record(&["R1", "abc", "", "", ""])),
      Err(RowErrorKind::Invalid(stocktake_core::Error::InvalidQuantity("abc".into())))
    );
    assert_eq!(
      decode_row(&record(&["R1", "-2", "", "", ""])),
      Err(RowErrorKind::Invalid(stocktake_core::Error::NegativeQuantity(-2)))
    );
  }

  #[test]
  fn rejects_missing_fields() {
    assert_eq!(
      decode_row(&record(&["R1", "3", "A"])),
      Err(RowErrorKind::MissingField("category"))
    );
    assert_eq!(
      decode_row(&record(&["  ", "3", "A", "B", "C"])),
      Err(RowErrorKind::MissingField("name"))
    );
  }

  #[test]
  fn rejects_extra_fields() {
    assert!(matches!(
      decode_row(&record(&["R1", "3", "A", "B", "C", "D"])),
      Err(RowErrorKind::Malformed(_))
    ));
  }

  #[test]
  fn row_name_labels_errors() {
    assert_eq!(row_name(&record(&[" R7 ", "x"])), Some("R7".into()));
    assert_eq!(row_name(&record(&[""])), None);
  }
}
