//! Configuration loading
//!
//! Settings come from a `sdkguard.toml` (or `.sdkguard.toml`) at the project
//! root, overridable from the command line:
//!
//! ```toml
//! min_sdk = 21
//! targets = ["app/src/main"]
//! exclude = ["build/", "generated/"]
//! api_table = "api-levels.toml"
//! respect_suppressions = true
//! ```

use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

use crate::analysis::ApiLevel;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Project minimum SDK; calls at or below this level are always fine
    pub min_sdk: i64,
    /// Directories to analyze, relative to the project root. Empty means
    /// the whole root.
    pub targets: Vec<PathBuf>,
    /// Path substrings to skip during discovery
    pub exclude: Vec<String>,
    /// Optional TOML overlay for the API requirement table
    pub api_table: Option<PathBuf>,
    /// Honor `noinspection` / `@SuppressLint` markers
    pub respect_suppressions: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            min_sdk: 1,
            targets: Vec::new(),
            exclude: vec!["build/".to_string(), ".gradle/".to_string()],
            api_table: None,
            respect_suppressions: true,
        }
    }
}

const CONFIG_NAMES: &[&str] = &["sdkguard.toml", ".sdkguard.toml"];

impl Config {
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = toml::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        debug!(path = %path.display(), "loaded config");
        Ok(config)
    }

    /// Look for a config file in the project root; fall back to defaults.
    pub fn from_default_locations(root: &Path) -> Result<Self, ConfigError> {
        for name in CONFIG_NAMES {
            let candidate = root.join(name);
            if candidate.is_file() {
                return Self::from_file(&candidate);
            }
        }
        Ok(Self::default())
    }

    pub fn min_sdk_level(&self) -> ApiLevel {
        ApiLevel::new(self.min_sdk)
    }
}
