//! Directory tree scaffolding
//!
//! A [`Tree`] maps names to file contents or nested trees. [`build_tree`]
//! materializes it depth-first: every subtree is finished before the call
//! for its parent returns, and a failing node does not stop its siblings.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use futures::future::BoxFuture;

use crate::error::{FilesystemError, ScaffoldError};
use crate::infra::filesystem;

/// A node of a scaffold description
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    /// File with its content
    File(String),
    /// Directory with its children
    Dir(Tree),
}

/// Children of a directory, by name
pub type Tree = BTreeMap<String, Node>;

impl Node {
    pub fn file(content: impl Into<String>) -> Self {
        Self::File(content.into())
    }

    /// An empty directory
    pub fn dir() -> Self {
        Self::Dir(Tree::new())
    }
}

/// Build a tree from `(name, node)` pairs
pub fn tree<I, S>(entries: I) -> Tree
where
    I: IntoIterator<Item = (S, Node)>,
    S: Into<String>,
{
    entries.into_iter().map(|(k, v)| (k.into(), v)).collect()
}

/// Create every file and directory of `tree` below `base`
///
/// All nodes are attempted. Returns the paths that were created, or every
/// failure collected into a [`ScaffoldError`].
pub async fn build_tree(tree: &Tree, base: &Path) -> Result<Vec<PathBuf>, ScaffoldError> {
    let mut created = Vec::new();
    let mut failures = Vec::new();

    build_level(tree, base.to_path_buf(), &mut created, &mut failures).await;

    if failures.is_empty() {
        Ok(created)
    } else {
        Err(ScaffoldError { failures })
    }
}

fn build_level<'a>(
    tree: &'a Tree,
    base: PathBuf,
    created: &'a mut Vec<PathBuf>,
    failures: &'a mut Vec<FilesystemError>,
) -> BoxFuture<'a, ()> {
    Box::pin(async move {
        if let Err(e) = filesystem::create_dir_all(&base).await {
            // nothing below can succeed
            failures.push(e);
            return;
        }

        for (name, node) in tree {
            let path = base.join(name);
            match node {
                Node::File(content) => match filesystem::write_file(&path, content).await {
                    Ok(()) => created.push(path),
                    Err(e) => failures.push(e),
                },
                Node::Dir(children) => {
                    build_level(children, path.clone(), created, failures).await;
                    if path.is_dir() {
                        created.push(path);
                    }
                }
            }
        }
    })
}
