//! Store configuration.
//!
//! The base path is resolved once at startup and never mutated afterwards:
//! an explicit `--base-path` argument wins, then the `CUBBY_BASE_PATH`
//! environment variable, then `~/.cubby`.

use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;

/// Environment variable overriding the default base path.
pub const BASE_PATH_ENV: &str = "CUBBY_BASE_PATH";

/// Configuration for a local file store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Base directory. Blobs live in `{base_path}/storage/`, index markers
    /// in `{base_path}/information/`.
    pub base_path: PathBuf,
}

impl Default for StoreConfig {
    fn default() -> Self {
        StoreConfig {
            base_path: default_base_path(),
        }
    }
}

fn default_base_path() -> PathBuf {
    dirs::home_dir()
        .map(|home| home.join(".cubby"))
        .unwrap_or_else(|| PathBuf::from(".cubby"))
}

impl StoreConfig {
    /// Load configuration from the environment, falling back to the default
    /// base path.
    pub fn from_env() -> Self {
        let base_path = env::var(BASE_PATH_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|_| default_base_path());
        StoreConfig { base_path }
    }

    /// Create a config with a specific base path.
    pub fn with_base_path(path: impl Into<PathBuf>) -> Self {
        StoreConfig {
            base_path: path.into(),
        }
    }
}
