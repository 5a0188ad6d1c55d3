//! Package creation logic

use std::path::PathBuf;

use crate::core::init::{package_json, tsconfig};
use crate::core::manifest::ManifestStore;
use crate::core::tree::{build_tree, tree, Node, Tree};
use crate::core::workspace::Workspace;
use crate::error::CackleError;

/// Layout of a new package
pub fn package_tree(name: &str) -> Tree {
    tree([
        (
            "src",
            Node::Dir(tree([("index.js", Node::file(format!("// {name}\n")))])),
        ),
        ("lib", Node::dir()),
        ("tsconfig.json", Node::file(tsconfig())),
        ("package.json", Node::file(package_json(name))),
    ])
}

/// Scaffold package `name`, add it to the manifest and persist
///
/// `name` is already prefix-resolved. Returns the package directory.
pub async fn create_package(
    workspace: &Workspace,
    store: &mut ManifestStore,
    name: &str,
) -> Result<PathBuf, CackleError> {
    if store.manifest().find(name).is_some() {
        return Err(CackleError::PackageExists {
            name: name.to_string(),
        });
    }

    let dir = workspace.package_dir(name);
    build_tree(&package_tree(name), &dir).await?;

    store.add_package(name)?;
    store.persist().await?;

    tracing::info!("Created package {name} in {}", dir.display());
    Ok(dir)
}
