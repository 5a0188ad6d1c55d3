//! Project initialization logic
//!
//! Scaffolds a new cackle workspace and installs the base tooling through
//! the registry client.

use std::path::{Path, PathBuf};

use serde_json::json;

use crate::config::defaults;
use crate::core::tree::{build_tree, tree, Node, Tree};
use crate::core::workspace::Workspace;
use crate::error::CackleError;
use crate::registry::{InstallOptions, RegistryClient};

/// Result of initialization
#[derive(Debug)]
pub struct InitResult {
    /// Files and directories created
    pub created: Vec<PathBuf>,
    /// Packages installed as dev dependencies
    pub dev_dependencies: Vec<String>,
    /// Packages installed as dependencies
    pub dependencies: Vec<String>,
}

/// Refuse to initialize over an existing manifest unless forced
pub fn validate_init(workspace: &Workspace, force: bool) -> Result<(), CackleError> {
    let manifest = workspace.manifest_path();
    if manifest.exists() && !force {
        return Err(CackleError::AlreadyInitialized { path: manifest });
    }
    Ok(())
}

/// Default manifest content with comments
pub fn manifest_template() -> String {
    format!(
        r#"# Cackle workspace manifest

# Prefix applied to package names given on the command line
prefix = "{prefix}"

# version = "0.1.0"

# Packages, either a bare name (webpack, default features) or a table:
# packages = [
#     "{prefix}-core",
#     {{ {prefix}-ui = {{ buildSystem = "rollup", features = ["react", "typescript"] }} }},
# ]
packages = []
"#,
        prefix = defaults::DEFAULT_PREFIX
    )
}

/// tsconfig.json shared by the workspace and each package
pub fn tsconfig() -> String {
    let config = json!({
        "compilerOptions": {
            "target": "es5",
            "module": "esnext",
            "moduleResolution": "node",
            "jsx": "react",
            "strict": true,
            "esModuleInterop": true,
            "declaration": true,
            "outDir": "lib",
        },
        "include": ["src"],
    });
    pretty(&config)
}

/// package.json of a new package
pub fn package_json(name: &str) -> String {
    let manifest = json!({
        "name": name,
        "version": "0.1.0",
        "main": "lib/index.js",
        "files": ["lib"],
    });
    pretty(&manifest)
}

fn pretty(value: &serde_json::Value) -> String {
    let mut out = serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string());
    out.push('\n');
    out
}

/// Layout created by `init`
pub fn project_tree() -> Tree {
    tree([
        (defaults::MANIFEST_FILE, Node::file(manifest_template())),
        (defaults::PACKAGES_DIR, Node::dir()),
        (defaults::DEFAULT_STATIC_DIR, Node::dir()),
        ("tsconfig.json", Node::file(tsconfig())),
    ])
}

/// Scaffold the workspace, then install the base tooling
///
/// The dev-dependency install finishes before the runtime dependency is
/// installed.
pub async fn init_project(
    workspace: &Workspace,
    registry: &RegistryClient,
    force: bool,
) -> Result<InitResult, CackleError> {
    validate_init(workspace, force)?;

    let created = build_tree(&project_tree(), workspace.root()).await?;
    tracing::info!("Scaffolded workspace in {}", workspace.root().display());

    let dev_dependencies: Vec<String> = defaults::BASE_TOOLING
        .iter()
        .map(ToString::to_string)
        .collect();
    registry
        .install(&InstallOptions {
            packages: dev_dependencies.clone(),
            save_dev: true,
            path: Some(workspace.root().to_path_buf()),
            ..InstallOptions::default()
        })
        .await?;

    let dependencies = vec![defaults::RUNTIME_DEPENDENCY.to_string()];
    registry
        .install(&InstallOptions {
            packages: dependencies.clone(),
            save: true,
            path: Some(workspace.root().to_path_buf()),
            ..InstallOptions::default()
        })
        .await?;

    Ok(InitResult {
        created: relative(workspace.root(), created),
        dev_dependencies,
        dependencies,
    })
}

fn relative(root: &Path, paths: Vec<PathBuf>) -> Vec<PathBuf> {
    paths
        .into_iter()
        .map(|p| p.strip_prefix(root).map(Path::to_path_buf).unwrap_or(p))
        .collect()
}
