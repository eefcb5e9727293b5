//! Layered configuration for the `stocktake` binary.

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use serde::Deserialize;

/// Resolved settings. Sources, lowest precedence first: built-in defaults,
/// the TOML file, then `STOCKTAKE_*` environment variables.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Settings {
  pub store_path:  PathBuf,
  pub import_path: PathBuf,
}

impl Settings {
  pub fn load(file: &Path) -> anyhow::Result<Self> {
    let settings: Settings = config::Config::builder()
      .set_default("store_path", "stocktake.db")?
      .set_default("import_path", "components_import.csv")?
      .add_source(config::File::from(file).required(false))
      .add_source(config::Environment::with_prefix("STOCKTAKE"))
      .build()
      .context("failed to read config file")?
      .try_deserialize()
      .context("failed to deserialise Settings")?;

    Ok(Settings {
      store_path:  expand_tilde(&settings.store_path),
      import_path: expand_tilde(&settings.import_path),
    })
  }
}

/// Expand a leading `~` to the user's home directory.
pub fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn defaults_apply_without_a_file() {
    let dir = tempfile::tempdir().unwrap();
    let settings = Settings::load(&dir.path().join("absent.toml")).unwrap();
    assert_eq!(settings.store_path, PathBuf::from("stocktake.db"));
    assert_eq!(settings.import_path, PathBuf::from("components_import.csv"));
  }

  #[test]
  fn file_overrides_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("stocktake.toml");
    std::fs::write(&file, "store_path = \"/var/lib/parts.db\"\n").unwrap();

    let settings = Settings::load(&file).unwrap();
    assert_eq!(settings.store_path, PathBuf::from("/var/lib/parts.db"));
    assert_eq!(settings.import_path, PathBuf::from("components_import.csv"));
  }

  #[test]
  fn tilde_is_only_expanded_at_the_start() {
    assert_eq!(expand_tilde(Path::new("/a/~/b")), PathBuf::from("/a/~/b"));
    assert_eq!(expand_tilde(Path::new("parts.db")), PathBuf::from("parts.db"));
    if let Ok(home) = std::env::var("HOME") {
      assert_eq!(expand_tilde(Path::new("~/parts.db")), PathBuf::from(home).join("parts.db"));
    }
  }
}
