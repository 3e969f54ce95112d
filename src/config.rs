//! Configuration
//!
//! One YAML document with three optional sections:
//!
//! ```yaml
//! server:
//!   port: 8000
//! pipeline:
//!   raw_dir: data/raw
//!   chunk_size: 100000
//! query:
//!   strategy: bidirectional
//!   max_depth: 16
//! ```
//!
//! Missing sections and fields take their defaults.

use crate::http::ServerConfig;
use crate::pipeline::PipelineConfig;
use crate::query::QueryConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

/// Environment variable naming the config file
pub const CONFIG_ENV: &str = "SIXDEGREES_CONFIG";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Cannot read config file {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config file {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
}

pub type ConfigResult<T> = Result<T, ConfigError>;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub pipeline: PipelineConfig,
    pub query: QueryConfig,
}

impl Config {
    /// Parse a YAML document
    pub fn from_yaml(text: &str, origin: &Path) -> ConfigResult<Self> {
        serde_yaml::from_str(text).map_err(|source| ConfigError::Parse {
            path: origin.to_path_buf(),
            source,
        })
    }

    /// Read a config file
    pub fn from_file(path: &Path) -> ConfigResult<Self> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_yaml(&text, path)?;
        info!(path = %path.display(), "Loaded configuration");
        Ok(config)
    }

    /// Resolve the configuration for a process
    ///
    /// An explicit path wins over `SIXDEGREES_CONFIG`; with neither, the
    /// defaults are used. A named file that does not exist is an error.
    pub fn load(explicit: Option<&Path>) -> ConfigResult<Self> {
        let from_env = std::env::var_os(CONFIG_ENV).map(PathBuf::from);
        match explicit.map(Path::to_path_buf).or(from_env) {
            Some(path) => Self::from_file(&path),
            None => Ok(Self::default()),
        }
    }
}
