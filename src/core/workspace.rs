//! Workspace layout

use std::path::{Path, PathBuf};

use crate::config::defaults;

/// Paths of a cackle workspace, all rooted at the working directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Workspace {
    root: PathBuf,
    static_dir: PathBuf,
}

impl Workspace {
    /// Workspace rooted at `root` with the default static directory
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        let static_dir = root.join(defaults::DEFAULT_STATIC_DIR);
        Self { root, static_dir }
    }

    /// Use `dir` (relative to the root) for shared static assets
    #[must_use]
    pub fn with_static_dir(mut self, dir: &str) -> Self {
        self.static_dir = self.root.join(dir);
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn manifest_path(&self) -> PathBuf {
        self.root.join(defaults::MANIFEST_FILE)
    }

    pub fn packages_dir(&self) -> PathBuf {
        self.root.join(defaults::PACKAGES_DIR)
    }

    /// Directory of the package called `name`
    pub fn package_dir(&self, name: &str) -> PathBuf {
        self.packages_dir().join(name)
    }

    pub fn static_dir(&self) -> &Path {
        &self.static_dir
    }

    /// Directory for generated state (backend configs)
    pub fn state_dir(&self) -> PathBuf {
        self.root.join(defaults::STATE_DIR)
    }
}
