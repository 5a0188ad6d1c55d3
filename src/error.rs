//! Error types for cackle
//!
//! Domain-specific error types using thiserror.

use std::path::PathBuf;
use thiserror::Error;

/// Manifest (cackle.toml) errors
#[derive(Error, Debug)]
pub enum ManifestError {
    /// Manifest could not be read
    #[error("Failed to read manifest '{path}': {error}")]
    Read { path: PathBuf, error: String },

    /// Manifest is not valid TOML or has the wrong shape
    #[error("Failed to parse manifest '{path}': {error}")]
    Parse { path: PathBuf, error: String },

    /// Manifest could not be serialized or written
    #[error("Failed to write manifest '{path}': {error}")]
    Write { path: PathBuf, error: String },

    /// A package name appears more than once
    #[error("Package '{name}' is listed more than once in the manifest")]
    DuplicatePackage { name: String },

    /// A package entry is neither a name nor a single-key table
    #[error("Invalid package entry: {reason}")]
    InvalidEntry { reason: String },

    /// No entry matches the requested package
    #[error("Package '{name}' not found in manifest")]
    PackageNotFound { name: String },
}

/// Builder and backend errors
#[derive(Error, Debug)]
pub enum BuildError {
    /// `buildSystem` value has no adapter
    #[error("'{name}' is an unsupported build system")]
    UnsupportedBuildSystem { name: String },

    /// Neither src/index.ts nor src/index.js exists
    #[error("No entry point for package '{package}' (looked in {})", .dir.display())]
    EntryNotFound { package: String, dir: PathBuf },

    /// Backend executable is not installed
    #[error("Build tool '{program}' not found in PATH")]
    ToolNotFound { program: String },

    /// Backend process could not be started
    #[error("Failed to start '{program}': {error}")]
    Spawn { program: String, error: String },

    /// Backend ran and reported failure
    #[error("{backend} failed for package '{package}': {message}")]
    BackendFailed {
        backend: String,
        package: String,
        message: String,
    },

    /// Long-running backend process terminated
    #[error("{backend} exited for package '{package}' (status {status}){}", format_tail(.output_tail))]
    BackendExited {
        backend: String,
        package: String,
        status: String,
        output_tail: Vec<String>,
    },

    /// Operation not offered by this backend
    #[error("'{operation}' is unsupported for the {backend} backend")]
    Unsupported { backend: String, operation: String },

    /// Dev server never accepted connections
    #[error("Dev server for '{package}' did not start listening on {address}")]
    ServerNotReady { package: String, address: String },

    /// Dev server port is already taken
    #[error("Port {address} for the '{package}' dev server is already in use")]
    PortInUse { package: String, address: String },

    /// No port left for this target above the configured base port
    #[error("No dev server port for '{package}': {base} + {offset} exceeds 65535")]
    PortOutOfRange {
        package: String,
        base: u16,
        offset: usize,
    },

    /// Generated backend configuration could not be rendered or written
    #[error("Failed to write {backend} configuration for '{package}': {error}")]
    Config {
        backend: String,
        package: String,
        error: String,
    },
}

fn format_tail(lines: &[String]) -> String {
    if lines.is_empty() {
        String::new()
    } else {
        format!(": {}", lines.join(" | "))
    }
}

/// Registry client (npm) errors
#[derive(Error, Debug)]
pub enum RegistryError {
    /// Registry client could not be started
    #[error("Failed to run '{command}': {error}")]
    Spawn { command: String, error: String },

    /// Registry client exited with failure
    #[error("'{command}' failed: {stderr}")]
    CommandFailed { command: String, stderr: String },
}

/// Filesystem errors
#[derive(Error, Debug)]
pub enum FilesystemError {
    /// Failed to create directory
    #[error("Failed to create directory '{path}': {error}")]
    CreateDir { path: PathBuf, error: String },

    /// Failed to write file
    #[error("Failed to write file '{path}': {error}")]
    WriteFile { path: PathBuf, error: String },

    /// Failed to read file
    #[error("Failed to read file '{path}': {error}")]
    ReadFile { path: PathBuf, error: String },
}

/// Scaffolding errors, one entry per node that could not be materialized
#[derive(Error, Debug)]
#[error("Failed to create {} of the scaffold entries: {}", .failures.len(), summarize(.failures))]
pub struct ScaffoldError {
    pub failures: Vec<FilesystemError>,
}

fn summarize(failures: &[FilesystemError]) -> String {
    failures
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Top-level cackle error type
#[derive(Error, Debug)]
pub enum CackleError {
    /// Manifest error
    #[error(transparent)]
    Manifest(#[from] ManifestError),

    /// Build error
    #[error(transparent)]
    Build(#[from] BuildError),

    /// Registry client error
    #[error(transparent)]
    Registry(#[from] RegistryError),

    /// Filesystem error
    #[error(transparent)]
    Filesystem(#[from] FilesystemError),

    /// Scaffolding error
    #[error(transparent)]
    Scaffold(#[from] ScaffoldError),

    /// Project already initialized
    #[error("A cackle project already exists at '{}'. Use --force to initialize anyway", .path.display())]
    AlreadyInitialized { path: PathBuf },

    /// Package already in the manifest
    #[error("Package '{name}' already exists")]
    PackageExists { name: String },
}
