//! Connection settings for the hosted backend.

use std::path::PathBuf;

use serde::Deserialize;

use crate::Result;

/// Settings for [`RestStore`](crate::RestStore), deserialised from an
/// optional TOML file plus `AGORA_*` environment variables.
#[derive(Debug, Clone, Deserialize)]
pub struct RestConfig {
  /// Project base URL, e.g. `https://example.agora.dev`.
  pub base_url: String,
  /// Project api key. Doubles as the bearer token while signed out.
  pub api_key:  String,
  /// Request timeout in seconds.
  #[serde(default = "default_timeout_secs")]
  pub timeout_secs: u64,
}

fn default_timeout_secs() -> u64 {
  30
}

impl RestConfig {
  /// Load from `path` (skipped when absent) with `AGORA_*` environment
  /// overrides, e.g. `AGORA_API_KEY`.
  pub fn load(path: impl Into<PathBuf>) -> Result<Self> {
    let settings = ::config::Config::builder()
      .add_source(::config::File::from(path.into()).required(false))
      .add_source(::config::Environment::with_prefix("AGORA"))
      .build()?;
    Ok(settings.try_deserialize::<Self>()?)
  }
}
