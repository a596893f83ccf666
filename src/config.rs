use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use config::{Config, Environment, FileFormat};
use anyhow::{Context, Result};

// Constants
pub const CONFIG_FILE: &str = ".markers.toml";
pub const ENV_PREFIX: &str = "MARKERS";

/// Settings shared by the hooks, layered as defaults < `.markers.toml` < `MARKERS_*` env vars.
/// Command-line values are applied on top by the caller.
#[derive(Debug, Default, Deserialize, PartialEq, Eq, Serialize)]
pub struct Settings {
  #[serde(default)]
  pub patterns: Vec<String>,
  #[serde(default)]
  pub against:  Option<String>
}

impl Settings {
  /// Loads settings for a repository whose working directory is `workdir`.
  /// A missing config file is not an error.
  pub fn load(workdir: Option<&Path>) -> Result<Self> {
    dotenv::dotenv().ok();

    let env = Environment::with_prefix(ENV_PREFIX)
      .try_parsing(true)
      .list_separator(",")
      .with_list_parse_key("patterns");

    Self::build(workdir.map(|dir| dir.join(CONFIG_FILE)), Some(env))
  }

  fn build(file: Option<PathBuf>, env: Option<Environment>) -> Result<Self> {
    let mut builder = Config::builder();

    if let Some(file) = file {
      log::debug!("Reading settings from {}", file.display());
      builder = builder.add_source(config::File::from(file).format(FileFormat::Toml).required(false));
    }

    if let Some(env) = env {
      builder = builder.add_source(env);
    }

    builder
      .build()
      .context("Failed to read marker settings")?
      .try_deserialize()
      .with_context(|| format!("Failed to parse marker settings, check {CONFIG_FILE} and {ENV_PREFIX}_* variables"))
  }

  /// Config patterns first, then `extra`, with the override for `against` taking precedence
  pub fn merge(mut self, extra: &[String], against: Option<&str>) -> Self {
    self.patterns.extend(extra.iter().cloned());
    if let Some(against) = against {
      self.against = Some(against.to_string());
    }
    self
  }
}
