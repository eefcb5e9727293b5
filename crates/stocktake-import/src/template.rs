//! Header-only template written when the import file is absent.

use std::path::Path;

use crate::{EXPECTED_HEADER, Result};

/// Create (or overwrite) `path` with just the expected header row.
pub fn write_template(path: &Path) -> Result<()> {
  let mut writer = csv::Writer::from_path(path)?;
  writer.write_record(EXPECTED_HEADER)?;
  writer.flush()?;
  Ok(())
}
