//! Registry client implementation
//!
//! Each operation runs the registry client in a directory and returns its
//! captured stdout, or its stderr as the error.

use std::path::{Path, PathBuf};

use crate::error::RegistryError;
use crate::infra::process::{run_captured, ToolCommand};

/// Options for `install`
#[derive(Debug, Clone, Default)]
pub struct InstallOptions {
    /// Packages to install; empty installs from package.json
    pub packages: Vec<String>,
    /// Record as dev dependencies
    pub save_dev: bool,
    /// Record as dependencies
    pub save: bool,
    /// Directory to run in (the client's working directory when unset)
    pub path: Option<PathBuf>,
}

/// Registry client for linking, packing and installing packages
#[derive(Debug, Clone)]
pub struct RegistryClient {
    /// Command used to reach the registry client
    command: ToolCommand,
    /// Directory used when an operation has no explicit path
    cwd: PathBuf,
}

impl RegistryClient {
    /// Create a registry client running `command` from `cwd`
    pub fn new(command: ToolCommand, cwd: PathBuf) -> Self {
        Self { command, cwd }
    }

    /// Link the package at `path` into the local environment
    pub async fn link(&self, path: &Path) -> Result<String, RegistryError> {
        self.run(&["link".to_string()], path).await
    }

    /// Pack the package at `path` into a distributable archive
    pub async fn pack(&self, path: &Path) -> Result<String, RegistryError> {
        self.run(&["pack".to_string()], path).await
    }

    /// Install packages
    pub async fn install(&self, options: &InstallOptions) -> Result<String, RegistryError> {
        let args = install_args(options);
        let dir = options.path.as_deref().unwrap_or(&self.cwd);
        self.run(&args, dir).await
    }

    async fn run(&self, args: &[String], dir: &Path) -> Result<String, RegistryError> {
        let command = self.command.describe(args);
        tracing::info!("Running {command} in {}", dir.display());

        let output = run_captured(&self.command, args, dir)
            .await
            .map_err(|e| RegistryError::Spawn {
                command: command.clone(),
                error: e.to_string(),
            })?;

        if output.success {
            Ok(output.stdout)
        } else {
            Err(RegistryError::CommandFailed {
                command,
                stderr: output.stderr.trim().to_string(),
            })
        }
    }
}

fn install_args(options: &InstallOptions) -> Vec<String> {
    let mut args = vec!["install".to_string()];
    if options.save {
        args.push("--save".to_string());
    }
    if options.save_dev {
        args.push("--save-dev".to_string());
    }
    args.extend(options.packages.iter().cloned());
    args
}
