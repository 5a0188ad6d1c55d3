//! Platform-specific directory management
//!
//! Locates the per-user configuration directory. Follows the XDG Base
//! Directory Specification on Linux and standard locations on macOS.
//!
//! `CACKLE_CONFIG_DIR` overrides the platform default.

use std::env;
use std::path::PathBuf;

/// Environment variable name for the config directory override
pub const ENV_CONFIG_DIR: &str = "CACKLE_CONFIG_DIR";

/// Application name used in directory paths
const APP_NAME: &str = "cackle";

/// Global config file name
const CONFIG_FILE: &str = "config.toml";

/// Platform-specific directory provider for cackle
#[derive(Debug, Clone)]
pub struct CackleDirs {
    config_dir: PathBuf,
}

impl CackleDirs {
    /// Create a new `CackleDirs` instance
    ///
    /// Checks the environment first, then falls back to platform defaults.
    #[must_use]
    pub fn new() -> Self {
        Self {
            config_dir: Self::resolve_config_dir(),
        }
    }

    /// Get the config directory path
    ///
    /// - Linux: `$XDG_CONFIG_HOME/cackle` or `~/.config/cackle`
    /// - macOS: `~/Library/Application Support/cackle`
    #[must_use]
    pub fn config_dir(&self) -> PathBuf {
        self.config_dir.clone()
    }

    /// Get the global config file path
    #[must_use]
    pub fn global_config_path(&self) -> PathBuf {
        self.config_dir.join(CONFIG_FILE)
    }

    fn resolve_config_dir() -> PathBuf {
        if let Ok(path) = env::var(ENV_CONFIG_DIR) {
            return PathBuf::from(path);
        }

        dirs::config_dir()
            .map(|p| p.join(APP_NAME))
            .unwrap_or_else(|| {
                dirs::home_dir()
                    .map(|h| h.join(".config").join(APP_NAME))
                    .unwrap_or_else(|| PathBuf::from(".").join(".config").join(APP_NAME))
            })
    }
}

impl Default for CackleDirs {
    fn default() -> Self {
        Self::new()
    }
}
