//! Manifest (cackle.toml) model and store
//!
//! The manifest lists the packages of the project. Each entry is either a
//! bare name (default configuration) or a single-key table mapping the name
//! to a [`PackageConfig`]:
//!
//! ```toml
//! prefix = "ckl"
//! packages = ["ckl-core", { ckl-ui = { buildSystem = "rollup", features = ["react"] } }]
//! ```
//!
//! [`ManifestStore`] owns the on-disk file. Loading never fails from the
//! caller's point of view: a missing or broken manifest degrades to an empty
//! one and the failure is kept for reporting.

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::config::defaults;
use crate::error::{BuildError, ManifestError};
use crate::infra::filesystem;

/// Backend responsible for bundling a package
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BuildSystem {
    /// Module-graph bundler with babel transforms and a dev server
    Webpack,
    /// Lightweight ES-module bundler, one-shot builds only
    Rollup,
}

impl BuildSystem {
    /// Name used in the manifest
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Webpack => "webpack",
            Self::Rollup => "rollup",
        }
    }
}

impl fmt::Display for BuildSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BuildSystem {
    type Err = BuildError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "webpack" => Ok(Self::Webpack),
            "rollup" => Ok(Self::Rollup),
            other => Err(BuildError::UnsupportedBuildSystem {
                name: other.to_string(),
            }),
        }
    }
}

/// Configuration of one package
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackageConfig {
    /// Backend name; checked when a builder is selected, not on load
    #[serde(default = "default_build_system")]
    pub build_system: String,

    /// Feature tags; unrecognized tags are ignored
    #[serde(
        default,
        deserialize_with = "deserialize_features",
        skip_serializing_if = "BTreeSet::is_empty"
    )]
    pub features: BTreeSet<String>,

    /// Publish flag, only meaningful to the registry client
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub public: Option<bool>,
}

fn default_build_system() -> String {
    BuildSystem::Webpack.as_str().to_string()
}

impl Default for PackageConfig {
    fn default() -> Self {
        Self {
            build_system: default_build_system(),
            features: BTreeSet::new(),
            public: None,
        }
    }
}

impl PackageConfig {
    /// Parse the configured backend
    pub fn build_system(&self) -> Result<BuildSystem, BuildError> {
        self.build_system.parse()
    }
}

/// Features may be written as a list or as a comma-separated string
fn deserialize_features<'de, D>(deserializer: D) -> Result<BTreeSet<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Features {
        List(Vec<String>),
        Csv(String),
    }

    Ok(match Features::deserialize(deserializer)? {
        Features::List(list) => list.into_iter().collect(),
        Features::Csv(csv) => split_features(&csv).collect(),
    })
}

/// Split a comma-separated feature list, dropping empty items
pub fn split_features(csv: &str) -> impl Iterator<Item = String> + '_ {
    csv.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToString::to_string)
}

/// One manifest entry, normalized to a name plus optional configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawPackageEntry", into = "RawPackageEntry")]
pub struct PackageEntry {
    name: String,
    config: Option<PackageConfig>,
}

/// On-disk shape of a package entry
#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum RawPackageEntry {
    Name(String),
    Configured(BTreeMap<String, PackageConfig>),
}

impl TryFrom<RawPackageEntry> for PackageEntry {
    type Error = ManifestError;

    fn try_from(raw: RawPackageEntry) -> Result<Self, Self::Error> {
        match raw {
            RawPackageEntry::Name(name) => Ok(Self::bare(name)),
            RawPackageEntry::Configured(map) => {
                if map.len() != 1 {
                    return Err(ManifestError::InvalidEntry {
                        reason: format!(
                            "expected a single package name per table, found {} ({})",
                            map.len(),
                            map.keys().cloned().collect::<Vec<_>>().join(", ")
                        ),
                    });
                }
                let (name, config) = map.into_iter().next().ok_or_else(|| {
                    ManifestError::InvalidEntry {
                        reason: "empty table".to_string(),
                    }
                })?;
                Ok(Self::configured(name, config))
            }
        }
    }
}

impl From<PackageEntry> for RawPackageEntry {
    fn from(entry: PackageEntry) -> Self {
        match entry.config {
            None => Self::Name(entry.name),
            Some(config) => Self::Configured(BTreeMap::from([(entry.name, config)])),
        }
    }
}

impl PackageEntry {
    /// Entry with the default configuration
    pub fn bare(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            config: None,
        }
    }

    /// Entry with an explicit configuration
    pub fn configured(name: impl Into<String>, config: PackageConfig) -> Self {
        Self {
            name: name.into(),
            config: Some(config),
        }
    }

    /// Logical package name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Effective configuration: explicit, or the default for a bare name
    pub fn config(&self) -> PackageConfig {
        self.config.clone().unwrap_or_default()
    }
}

/// The project manifest (cackle.toml)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifest {
    /// Prefix applied to bare package names
    #[serde(default = "default_prefix")]
    pub prefix: String,

    /// Free-form version, not interpreted
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    /// Package entries, in file order
    #[serde(default)]
    pub packages: Vec<PackageEntry>,
}

fn default_prefix() -> String {
    defaults::DEFAULT_PREFIX.to_string()
}

impl Default for Manifest {
    fn default() -> Self {
        Self {
            prefix: default_prefix(),
            version: None,
            packages: Vec::new(),
        }
    }
}

impl Manifest {
    /// Load manifest from TOML string
    pub fn from_toml(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Serialize manifest to TOML string
    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }

    /// Check that every package name is unique
    pub fn validate(&self) -> Result<(), ManifestError> {
        let mut seen = HashSet::new();
        for entry in &self.packages {
            if !seen.insert(entry.name()) {
                return Err(ManifestError::DuplicatePackage {
                    name: entry.name().to_string(),
                });
            }
        }
        Ok(())
    }

    /// Find the entry for `name`
    pub fn find(&self, name: &str) -> Option<&PackageEntry> {
        self.packages.iter().find(|entry| entry.name() == name)
    }

    /// Names of all packages, in file order
    pub fn package_names(&self) -> impl Iterator<Item = &str> {
        self.packages.iter().map(PackageEntry::name)
    }

    /// Apply the prefix rule to a command-line package argument
    ///
    /// Names already starting with the prefix are kept; anything else
    /// becomes `<prefix>-<name>`.
    pub fn resolve_name(&self, name: &str) -> String {
        resolve_name(&self.prefix, name)
    }
}

/// Prefix rule shared by the store and the dispatcher
pub fn resolve_name(prefix: &str, name: &str) -> String {
    if name.starts_with(prefix) {
        name.to_string()
    } else {
        format!("{prefix}-{name}")
    }
}

/// Read, parse and validate the manifest at `path`
pub async fn read_manifest(path: &Path) -> Result<Manifest, ManifestError> {
    let content = filesystem::read_file(path)
        .await
        .map_err(|e| ManifestError::Read {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

    let manifest = Manifest::from_toml(&content).map_err(|e| ManifestError::Parse {
        path: path.to_path_buf(),
        error: e.to_string(),
    })?;
    manifest.validate()?;
    Ok(manifest)
}

/// Owner of the manifest file and its in-memory copy
#[derive(Debug)]
pub struct ManifestStore {
    path: PathBuf,
    manifest: Manifest,
    load_error: Option<ManifestError>,
}

impl ManifestStore {
    /// Open the store and load the manifest at `path`
    pub async fn open(path: impl Into<PathBuf>) -> Self {
        let mut store = Self {
            path: path.into(),
            manifest: Manifest::default(),
            load_error: None,
        };
        store.load().await;
        store
    }

    /// (Re)load the manifest from disk
    ///
    /// On any failure the store falls back to an empty manifest with the
    /// default prefix; the failure is logged and kept in [`Self::load_error`].
    pub async fn load(&mut self) {
        match read_manifest(&self.path).await {
            Ok(manifest) => {
                tracing::debug!(
                    "Loaded manifest {} ({} packages)",
                    self.path.display(),
                    manifest.packages.len()
                );
                self.manifest = manifest;
                self.load_error = None;
            }
            Err(e) => {
                if self.path.exists() {
                    tracing::warn!("Failed to load manifest: {e}");
                } else {
                    tracing::info!("No manifest at {}, using an empty one", self.path.display());
                }
                self.manifest = Manifest::default();
                self.load_error = Some(e);
            }
        }
    }

    /// Failure of the last load, if any
    pub fn load_error(&self) -> Option<&ManifestError> {
        self.load_error.as_ref()
    }

    /// Path of the manifest file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Current in-memory manifest
    pub fn manifest(&self) -> &Manifest {
        &self.manifest
    }

    /// Effective prefix
    pub fn prefix(&self) -> &str {
        &self.manifest.prefix
    }

    /// Apply the prefix rule to a package argument
    pub fn resolve_name(&self, name: &str) -> String {
        self.manifest.resolve_name(name)
    }

    /// Configuration of the package called `name`
    ///
    /// Unknown names are an error; only a matched bare entry gets the
    /// default configuration.
    pub fn resolve(&self, name: &str) -> Result<PackageConfig, ManifestError> {
        self.manifest
            .find(name)
            .map(PackageEntry::config)
            .ok_or_else(|| ManifestError::PackageNotFound {
                name: name.to_string(),
            })
    }

    /// Append a bare entry in memory (call [`Self::persist`] to save)
    pub fn add_package(&mut self, name: &str) -> Result<(), ManifestError> {
        if self.manifest.find(name).is_some() {
            return Err(ManifestError::DuplicatePackage {
                name: name.to_string(),
            });
        }
        self.manifest.packages.push(PackageEntry::bare(name));
        Ok(())
    }

    /// Write the in-memory manifest to disk, then reload it
    ///
    /// The file is replaced atomically and the reload only starts once the
    /// write has completed. The reloaded manifest becomes the new state.
    pub async fn persist(&mut self) -> Result<(), ManifestError> {
        let content = self.manifest.to_toml().map_err(|e| ManifestError::Write {
            path: self.path.clone(),
            error: e.to_string(),
        })?;

        filesystem::replace_file(&self.path, &content)
            .await
            .map_err(|e| ManifestError::Write {
                path: self.path.clone(),
                error: e.to_string(),
            })?;

        let reloaded = read_manifest(&self.path).await?;
        self.manifest = reloaded;
        self.load_error = None;
        tracing::info!("Updated manifest {}", self.path.display());
        Ok(())
    }
}
