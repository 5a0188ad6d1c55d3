//! Global configuration management
//!
//! Reads user settings from `config.toml` in the config directory: the
//! commands used to reach each external tool, dev server settings and the
//! watch debounce window.

use crate::config::defaults;
use crate::infra::dirs::CackleDirs;
use crate::infra::process::ToolCommand;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Global configuration error types
#[derive(Error, Debug)]
pub enum GlobalConfigError {
    /// Failed to read config file
    #[error("Failed to read config file '{path}': {error}")]
    ReadError { path: String, error: String },

    /// Failed to parse config file
    #[error("Failed to parse config file '{path}': {error}")]
    ParseError { path: String, error: String },
}

/// Global configuration for cackle
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct GlobalConfig {
    /// External tool commands
    #[serde(default)]
    pub tools: ToolsConfig,

    /// Dev server settings
    #[serde(default)]
    pub serve: ServeConfig,

    /// Watch settings
    #[serde(default)]
    pub watch: WatchConfig,
}

/// Commands for the external tools, as argv arrays
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ToolsConfig {
    /// Module-graph bundler (default `npx webpack`)
    pub webpack: Option<Vec<String>>,

    /// ES-module bundler (default `npx rollup`)
    pub rollup: Option<Vec<String>>,

    /// Registry client (default `npm`)
    pub npm: Option<Vec<String>>,
}

/// Dev server settings
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ServeConfig {
    /// Port of the first served package
    pub port: Option<u16>,

    /// Shared static-assets directory, relative to the project root
    pub static_dir: Option<String>,
}

/// Watch settings
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct WatchConfig {
    /// Debounce window applied by the backend before it rebuilds
    pub aggregate_timeout_ms: Option<u64>,
}

impl GlobalConfig {
    /// Load global configuration from the config directory
    ///
    /// A missing file yields the defaults; an invalid one is an error.
    pub fn load(dirs: &CackleDirs) -> Result<Self, GlobalConfigError> {
        Self::load_from_path(&dirs.global_config_path())
    }

    /// Load global configuration from a specific path
    pub fn load_from_path(path: &Path) -> Result<Self, GlobalConfigError> {
        if !path.exists() {
            tracing::debug!("No global config at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path).map_err(|e| GlobalConfigError::ReadError {
            path: path.display().to_string(),
            error: e.to_string(),
        })?;

        toml::from_str(&content).map_err(|e| GlobalConfigError::ParseError {
            path: path.display().to_string(),
            error: e.to_string(),
        })
    }

    /// Command used to run webpack
    pub fn webpack_command(&self) -> ToolCommand {
        ToolCommand::from_argv(self.tools.webpack.as_deref(), &["npx", "webpack"])
    }

    /// Command used to run rollup
    pub fn rollup_command(&self) -> ToolCommand {
        ToolCommand::from_argv(self.tools.rollup.as_deref(), &["npx", "rollup"])
    }

    /// Command used to run the registry client
    pub fn npm_command(&self) -> ToolCommand {
        ToolCommand::from_argv(self.tools.npm.as_deref(), &["npm"])
    }

    /// Effective dev server port
    #[must_use]
    pub fn serve_port(&self) -> u16 {
        self.serve.port.unwrap_or(defaults::DEFAULT_DEV_SERVER_PORT)
    }

    /// Effective shared static-assets directory
    #[must_use]
    pub fn static_dir(&self) -> &str {
        self.serve
            .static_dir
            .as_deref()
            .unwrap_or(defaults::DEFAULT_STATIC_DIR)
    }

    /// Effective watch debounce window
    #[must_use]
    pub fn aggregate_timeout_ms(&self) -> u64 {
        self.watch
            .aggregate_timeout_ms
            .unwrap_or(defaults::DEFAULT_AGGREGATE_TIMEOUT_MS)
    }
}
