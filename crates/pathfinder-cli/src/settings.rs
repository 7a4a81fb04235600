//! Runtime configuration, read from an optional TOML file layered under
//! `PATHFINDER_*` environment variables.

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use pathfinder_core::{
  regenerate::GenerationOptions,
  stream::{COMMON_STREAM, COMMON_STREAM_ID},
};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
  pub store_path:          PathBuf,
  pub host:                String,
  pub port:                u16,
  /// Recorded as `created_by` on generated rows.
  pub generated_by:        String,
  pub excluded_streams:    Vec<String>,
  pub excluded_stream_ids: Vec<i64>,
  pub summary_samples:     usize,
}

impl Default for Settings {
  fn default() -> Self {
    Self {
      store_path:          PathBuf::from("pathfinder.db"),
      host:                "127.0.0.1".to_owned(),
      port:                8080,
      generated_by:        "pathfinder".to_owned(),
      excluded_streams:    vec![COMMON_STREAM.to_owned()],
      excluded_stream_ids: vec![COMMON_STREAM_ID],
      summary_samples:     3,
    }
  }
}

impl Settings {
  pub fn load(path: &Path) -> anyhow::Result<Self> {
    let settings = config::Config::builder()
      .add_source(config::File::from(path).required(false))
      .add_source(
        config::Environment::with_prefix("PATHFINDER")
          .try_parsing(true)
          .list_separator(",")
          .with_list_parse_key("excluded_streams")
          .with_list_parse_key("excluded_stream_ids"),
      )
      .build()
      .context("failed to read config file")?;

    let mut settings: Settings = settings
      .try_deserialize()
      .context("failed to deserialise Settings")?;
    settings.store_path = expand_tilde(&settings.store_path);
    Ok(settings)
  }

  pub fn generation_options(&self) -> GenerationOptions {
    GenerationOptions {
      excluded_streams:    self.excluded_streams.clone(),
      excluded_stream_ids: self.excluded_stream_ids.clone(),
      created_by:          self.generated_by.clone(),
    }
  }
}

/// Expand a leading `~` to the user's home directory.
fn expand_tilde(path: &Path) -> PathBuf {
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
  fn missing_file_falls_back_to_defaults() {
    let settings = Settings::load(Path::new("does-not-exist.toml")).unwrap();
    assert_eq!(settings.port, 8080);
    assert_eq!(settings.excluded_streams, vec!["Common".to_string()]);
    assert_eq!(settings.generation_options().excluded_stream_ids, vec![7]);
    assert_eq!(settings.generation_options().created_by, settings.generated_by);
  }

  #[test]
  fn tilde_is_expanded() {
    let Ok(home) = std::env::var("HOME") else {
      return;
    };
    assert_eq!(
      expand_tilde(Path::new("~/pathfinder.db")),
      PathBuf::from(home).join("pathfinder.db")
    );
    assert_eq!(expand_tilde(Path::new("/tmp/x.db")), PathBuf::from("/tmp/x.db"));
  }
}
