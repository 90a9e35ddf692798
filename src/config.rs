use color_eyre::{eyre::eyre, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use url::Url;

use crate::cache::FailurePolicy;

/// Default snapshot directory, relative to the working directory.
pub const DEFAULT_CACHE_DIR: &str = ".content-cache";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
  #[serde(default)]
  pub api: ApiConfig,
  /// Directory holding the prefetched JSON snapshots
  #[serde(default = "default_cache_dir")]
  pub cache_dir: PathBuf,
  /// Whether a failed load is retried on the next call
  #[serde(default)]
  pub failure_policy: FailurePolicy,
  /// Write logs to this file instead of stderr
  pub log_file: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApiConfig {
  /// Base URL of the content API (e.g., "https://cms.example.com")
  #[serde(default, deserialize_with = "deserialize_base_url")]
  pub base_url: Option<Url>,
  /// Per-request timeout enforced by the HTTP client
  pub timeout_secs: Option<u64>,
}

fn default_cache_dir() -> PathBuf {
  PathBuf::from(DEFAULT_CACHE_DIR)
}

fn deserialize_base_url<'de, D>(deserializer: D) -> Result<Option<Url>, D::Error>
where
  D: serde::Deserializer<'de>,
{
  let raw: Option<String> = Option::deserialize(deserializer)?;
  match raw.as_deref().map(str::trim) {
    None | Some("") => Ok(None),
    Some(s) => Url::parse(s)
      .map(Some)
      .map_err(|e| serde::de::Error::custom(format!("invalid base_url '{}': {}", s, e))),
  }
}

impl Default for Config {
  fn default() -> Self {
    Config {
      api: ApiConfig::default(),
      cache_dir: default_cache_dir(),
      failure_policy: FailurePolicy::default(),
      log_file: None,
    }
  }
}

impl Config {
  /// Load configuration from file, then apply environment overrides.
  ///
  /// Search order:
  /// 1. Explicit path if provided (must exist)
  /// 2. ./folio.yaml (current directory)
  /// 3. $XDG_CONFIG_HOME/folio/config.yaml
  ///
  /// With no file found, defaults are used.
  pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
    let path = if let Some(p) = explicit_path {
      if p.exists() {
        Some(p.to_path_buf())
      } else {
        return Err(eyre!("Config file not found: {}", p.display()));
      }
    } else {
      Self::find_config_file()
    };

    let config = match path {
      Some(p) => Self::load_from_path(&p)?,
      None => Config::default(),
    };

    config.with_env_overrides()
  }

  fn find_config_file() -> Option<PathBuf> {
    // Check current directory
    let local = PathBuf::from("folio.yaml");
    if local.exists() {
      return Some(local);
    }

    // Check XDG config directory
    if let Some(config_dir) = dirs::config_dir() {
      let xdg_path = config_dir.join("folio").join("config.yaml");
      if xdg_path.exists() {
        return Some(xdg_path);
      }
    }

    None
  }

  fn load_from_path(path: &Path) -> Result<Self> {
    let contents = std::fs::read_to_string(path)
      .map_err(|e| eyre!("Failed to read config file {}: {}", path.display(), e))?;

    Self::from_yaml(&contents)
      .map_err(|e| eyre!("Failed to parse config file {}: {}", path.display(), e))
  }

  pub fn from_yaml(contents: &str) -> Result<Self> {
    // An empty file is a valid, all-defaults config
    if contents.trim().is_empty() {
      return Ok(Config::default());
    }
    Ok(serde_yaml::from_str(contents)?)
  }

  fn with_env_overrides(mut self) -> Result<Self> {
    if let Some(raw) = Self::env_base_url() {
      self.api.base_url = Some(parse_base_url(&raw)?);
    }
    Ok(self)
  }

  /// Get the API base URL from environment variables.
  ///
  /// Checks FOLIO_API_BASE_URL first, then BLOG_API_BASE_URL as fallback.
  pub fn env_base_url() -> Option<String> {
    ["FOLIO_API_BASE_URL", "BLOG_API_BASE_URL"]
      .iter()
      .filter_map(|name| std::env::var(name).ok())
      .find(|value| !value.trim().is_empty())
  }
}

/// Parse a base URL given on the command line or in the environment.
pub fn parse_base_url(raw: &str) -> Result<Url> {
  Url::parse(raw.trim()).map_err(|e| eyre!("Invalid API base URL '{}': {}", raw, e))
}
