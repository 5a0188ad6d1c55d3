//! Common test utilities and helpers
//!
//! This module provides shared utilities for integration tests.

use std::path::PathBuf;
use std::process::{Command, Output};

use cackle::core::global_config::{GlobalConfig, ToolsConfig};
use tempfile::TempDir;

/// Test project context
///
/// A temporary workspace plus a private global config directory, so the
/// external tools can be replaced by shell stand-ins.
pub struct TestProject {
    /// Temporary directory for the test project
    pub dir: TempDir,
    /// Temporary global config directory
    pub config_dir: TempDir,
}

impl TestProject {
    /// Create a new test project in a temporary directory
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().expect("Failed to create temp directory"),
            config_dir: TempDir::new().expect("Failed to create config directory"),
        }
    }

    /// Get the path to the test project directory
    pub fn path(&self) -> PathBuf {
        self.dir.path().to_path_buf()
    }

    /// Create a file in the test project
    pub fn create_file(&self, name: &str, content: &str) {
        let path = self.dir.path().join(name);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create parent directories");
        }
        std::fs::write(path, content).expect("Failed to write file");
    }

    /// Check if a file exists in the test project
    pub fn file_exists(&self, name: &str) -> bool {
        self.dir.path().join(name).exists()
    }

    /// Read a file from the test project
    pub fn read_file(&self, name: &str) -> String {
        std::fs::read_to_string(self.dir.path().join(name)).expect("Failed to read file")
    }

    /// Write the manifest
    pub fn with_manifest(self, content: &str) -> Self {
        self.create_file("cackle.toml", content);
        self
    }

    /// Add a package with a JavaScript entry point
    pub fn with_package(self, name: &str) -> Self {
        self.create_file(&format!("packages/{name}/src/index.js"), &format!("// {name}\n"));
        self
    }

    /// Replace the external tools in the global config
    pub fn with_tools(self, tools: ToolsConfig) -> Self {
        let config = GlobalConfig {
            tools,
            ..GlobalConfig::default()
        };
        let content = toml::to_string(&config).expect("Failed to serialize config");
        std::fs::write(self.config_dir.path().join("config.toml"), content)
            .expect("Failed to write config");
        self
    }

    /// Run the cackle binary in the project
    pub fn cackle(&self, args: &[&str]) -> Output {
        Command::new(env!("CARGO_BIN_EXE_cackle"))
            .current_dir(self.dir.path())
            .env("CACKLE_CONFIG_DIR", self.config_dir.path())
            .env_remove("CACKLE_CONFIG")
            .env_remove("RUST_LOG")
            .args(args)
            .output()
            .expect("Failed to execute cackle")
    }
}

impl Default for TestProject {
    fn default() -> Self {
        Self::new()
    }
}

/// A tool command running `script` with `sh -c`
#[allow(dead_code)]
pub fn sh(script: &str) -> Option<Vec<String>> {
    Some(vec![
        "sh".to_string(),
        "-c".to_string(),
        script.to_string(),
        "sh".to_string(),
    ])
}

/// A tool command that always succeeds
#[allow(dead_code)]
pub fn succeed() -> Option<Vec<String>> {
    Some(vec!["true".to_string()])
}

/// Combined stdout and stderr
#[allow(dead_code)]
pub fn output_text(output: &Output) -> String {
    format!(
        "{}{}",
        String::from_utf8_lossy(&output.stdout),
        String::from_utf8_lossy(&output.stderr)
    )
}

/// Manifest with a webpack package `ckl-a` and a rollup package `ckl-b`
#[allow(dead_code)]
pub const MIXED_MANIFEST: &str = r#"
prefix = "ckl"
packages = [
    "ckl-a",
    { ckl-b = { buildSystem = "rollup" } },
]
"#;
