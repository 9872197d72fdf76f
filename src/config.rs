use color_eyre::{eyre::eyre, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::api::types::Genre;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
  pub api: ApiConfig,
  pub library: LibraryConfig,
  /// Custom title for the header (defaults to the API domain if not set)
  pub title: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
  /// Base URL of the SpecGen API
  pub url: String,
  pub timeout_secs: u64,
}

impl Default for ApiConfig {
  fn default() -> Self {
    Self {
      url: "http://localhost:3001/api".to_string(),
      timeout_secs: 15,
    }
  }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LibraryConfig {
  /// Page size for summary fetches
  pub page_size: u32,
  /// Restrict the library to one genre
  pub genre: Option<Genre>,
}

impl Default for LibraryConfig {
  fn default() -> Self {
    Self {
      page_size: 20,
      genre: None,
    }
  }
}

impl Config {
  /// Load configuration.
  ///
  /// Search order:
  /// 1. Explicit path if provided
  /// 2. ./sg9s.yaml (current directory)
  /// 3. $XDG_CONFIG_HOME/sg9s/config.yaml
  ///
  /// Unlike a credentialed client, sg9s can run without any file at all;
  /// defaults point at a local dev API.
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

    match path {
      Some(p) => Self::load_from_path(&p),
      None => Ok(Config::default()),
    }
  }

  fn find_config_file() -> Option<PathBuf> {
    let local = PathBuf::from("sg9s.yaml");
    if local.exists() {
      return Some(local);
    }

    if let Some(config_dir) = dirs::config_dir() {
      let xdg_path = config_dir.join("sg9s").join("config.yaml");
      if xdg_path.exists() {
        return Some(xdg_path);
      }
    }

    None
  }

  fn load_from_path(path: &Path) -> Result<Self> {
    let contents = std::fs::read_to_string(path)
      .map_err(|e| eyre!("Failed to read config file {}: {}", path.display(), e))?;

    let config: Config = serde_yaml::from_str(&contents)
      .map_err(|e| eyre!("Failed to parse config file {}: {}", path.display(), e))?;

    Ok(config)
  }

  /// Optional API key from the environment. Never read from the config
  /// file; a key on disk next to the cache is how keys end up in backups.
  pub fn get_api_key() -> Option<String> {
    std::env::var("SG9S_API_KEY").ok().filter(|k| !k.is_empty())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_full_config_parses() {
    let yaml = r#"
api:
  url: https://specgen.example.com/api
  timeout_secs: 30
library:
  page_size: 50
  genre: horror
title: My Library
"#;
    let config: Config = serde_yaml::from_str(yaml).unwrap();
    assert_eq!(config.api.url, "https://specgen.example.com/api");
    assert_eq!(config.api.timeout_secs, 30);
    assert_eq!(config.library.page_size, 50);
    assert_eq!(config.library.genre, Some(Genre::Horror));
    assert_eq!(config.title.as_deref(), Some("My Library"));
  }

  #[test]
  fn test_partial_config_fills_defaults() {
    let yaml = "api:\n  url: http://10.0.0.5:3001/api\n";
    let config: Config = serde_yaml::from_str(yaml).unwrap();
    assert_eq!(config.api.url, "http://10.0.0.5:3001/api");
    assert_eq!(config.api.timeout_secs, 15);
    assert_eq!(config.library.page_size, 20);
    assert!(config.library.genre.is_none());
  }

  #[test]
  fn test_empty_config_is_defaults() {
    let config: Config = serde_yaml::from_str("{}").unwrap();
    assert_eq!(config.api.url, "http://localhost:3001/api");
  }
}
