//! Builder abstraction
//!
//! A [`Builder`] drives one external bundler for one package through the
//! three lifecycles: a one-shot `build`, a continuous `watch`, and a `serve`
//! that also runs a dev server. [`builder_for`] maps a package's
//! `buildSystem` to the adapter implementing it.

use std::collections::BTreeSet;
use std::path::PathBuf;

use futures::future::BoxFuture;
use futures::stream::{self, BoxStream, StreamExt};
use tokio::sync::mpsc;

use crate::core::global_config::GlobalConfig;
use crate::core::manifest::{BuildSystem, PackageConfig};
use crate::core::options::RunOptions;
use crate::core::profile::ProfileComposer;
use crate::core::rollup::RollupBuilder;
use crate::core::webpack::WebpackBuilder;
use crate::core::workspace::Workspace;
use crate::error::BuildError;
use crate::config::defaults;
use crate::infra::process::{CapturedOutput, ProcessError};

/// Capacity of a builder's event channel
pub(crate) const EVENT_BUFFER: usize = 64;

/// Status reported by a running backend
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildEvent {
    /// A line of backend output
    Output(String),
    /// A rebuild finished
    Rebuilt { success: bool },
    /// The dev server accepts connections
    Listening { url: String },
}

/// Result of a successful one-shot build
#[derive(Debug, Clone)]
pub struct BuildOutcome {
    pub package: String,
    pub system: BuildSystem,
    pub output_dir: PathBuf,
    /// Backend output, stdout then stderr
    pub log: Vec<String>,
}

/// Stream of backend status; ends after the first error
pub type EventStream = BoxStream<'static, Result<BuildEvent, BuildError>>;

/// One bundler backend
pub trait Builder: Send + Sync {
    /// Backend identity
    fn system(&self) -> BuildSystem;

    /// Build `package` once
    fn build<'a>(&'a self, package: &'a str) -> BoxFuture<'a, Result<BuildOutcome, BuildError>>;

    /// Rebuild `package` on every change until the backend stops
    fn watch(&self, package: &str) -> EventStream;

    /// Rebuild `package` and serve it on `port`
    fn serve(&self, package: &str, port: u16) -> EventStream;
}

/// Everything a backend adapter needs besides the package name
#[derive(Debug, Clone)]
pub struct BuildContext {
    pub workspace: Workspace,
    pub options: RunOptions,
    pub config: GlobalConfig,
}

impl BuildContext {
    pub fn new(workspace: Workspace, options: RunOptions, config: GlobalConfig) -> Self {
        Self {
            workspace,
            options,
            config,
        }
    }
}

/// Select the adapter for a package configuration
///
/// The transform profile is composed here from the union of the package's
/// own feature tags and the invocation's. An unknown `buildSystem` fails at
/// this point, before anything runs.
pub fn builder_for(
    config: &PackageConfig,
    ctx: &BuildContext,
) -> Result<Box<dyn Builder>, BuildError> {
    let system = config.build_system()?;

    let features: BTreeSet<&str> = config
        .features
        .iter()
        .chain(ctx.options.features())
        .map(String::as_str)
        .collect();
    let profile = ProfileComposer::new(system).features(features).build();

    tracing::debug!("Selected {system} builder with profile {profile:?}");

    Ok(match system {
        BuildSystem::Webpack => Box::new(WebpackBuilder::new(ctx.clone(), profile)),
        BuildSystem::Rollup => Box::new(RollupBuilder::new(ctx.clone(), profile)),
    })
}

/// Locate the entry file of a package, preferring TypeScript
pub(crate) async fn resolve_entry(
    workspace: &Workspace,
    package: &str,
) -> Result<PathBuf, BuildError> {
    let src = workspace.package_dir(package).join("src");

    for candidate in ["index.ts", "index.js"] {
        let path = src.join(candidate);
        if tokio::fs::try_exists(&path).await.unwrap_or(false) {
            return Ok(path);
        }
    }

    Err(BuildError::EntryNotFound {
        package: package.to_string(),
        dir: src,
    })
}

/// Map a failure to start a backend
pub(crate) fn spawn_error(err: ProcessError) -> BuildError {
    match err {
        ProcessError::NotFound { program } => BuildError::ToolNotFound { program },
        ProcessError::Spawn { program, error } => BuildError::Spawn { program, error },
    }
}

/// Last `count` non-blank lines of `text`
pub(crate) fn last_lines(text: &str, count: usize) -> Vec<String> {
    let lines: Vec<&str> = text.lines().filter(|l| !l.trim().is_empty()).collect();
    lines[lines.len().saturating_sub(count)..]
        .iter()
        .map(|l| (*l).to_string())
        .collect()
}

/// Trailing lines of a failed run: stdout first, then stderr
///
/// Bundlers print compile errors on stdout and tool failures on stderr, so
/// both are kept.
pub(crate) fn failure_tail(output: &CapturedOutput) -> Vec<String> {
    let mut tail = last_lines(&output.stdout, defaults::OUTPUT_TAIL_LINES);
    tail.extend(last_lines(&output.stderr, defaults::OUTPUT_TAIL_LINES));
    tail
}

/// Turn a channel receiver into an [`EventStream`]
pub(crate) fn channel_stream(rx: mpsc::Receiver<Result<BuildEvent, BuildError>>) -> EventStream {
    stream::unfold(rx, |mut rx| async move { rx.recv().await.map(|item| (item, rx)) }).boxed()
}

/// A stream holding a single error
pub(crate) fn failed_stream(err: BuildError) -> EventStream {
    stream::once(async move { Err(err) }).boxed()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::options::{Environment, Variant};
    use tempfile::TempDir;

    fn context(root: &std::path::Path) -> BuildContext {
        BuildContext::new(
            Workspace::new(root),
            RunOptions::new(Environment::Development, Variant::Module, BTreeSet::new()),
            GlobalConfig::default(),
        )
    }

    #[test]
    fn test_factory_selects_by_build_system() {
        let temp = TempDir::new().unwrap();
        let ctx = context(temp.path());

        let webpack = builder_for(&PackageConfig::default(), &ctx).unwrap();
        assert_eq!(webpack.system(), BuildSystem::Webpack);

        let rollup = PackageConfig {
            build_system: "rollup".to_string(),
            ..PackageConfig::default()
        };
        assert_eq!(builder_for(&rollup, &ctx).unwrap().system(), BuildSystem::Rollup);
    }

    #[test]
    fn test_factory_rejects_unknown_build_system() {
        let temp = TempDir::new().unwrap();
        let config = PackageConfig {
            build_system: "parcel".to_string(),
            ..PackageConfig::default()
        };

        let err = builder_for(&config, &context(temp.path())).err().unwrap();
        assert!(matches!(err, BuildError::UnsupportedBuildSystem { ref name } if name == "parcel"));
    }

    #[tokio::test]
    async fn test_resolve_entry_prefers_typescript() {
        let temp = TempDir::new().unwrap();
        let ws = Workspace::new(temp.path());
        let src = ws.package_dir("ckl-a").join("src");
        std::fs::create_dir_all(&src).unwrap();
        std::fs::write(src.join("index.js"), "").unwrap();

        assert_eq!(resolve_entry(&ws, "ckl-a").await.unwrap(), src.join("index.js"));

        std::fs::write(src.join("index.ts"), "").unwrap();
        assert_eq!(resolve_entry(&ws, "ckl-a").await.unwrap(), src.join("index.ts"));
    }

    #[tokio::test]
    async fn test_resolve_entry_missing() {
        let temp = TempDir::new().unwrap();
        let ws = Workspace::new(temp.path());

        let err = resolve_entry(&ws, "ckl-none").await.unwrap_err();
        assert!(matches!(err, BuildError::EntryNotFound { ref package, .. } if package == "ckl-none"));
    }

    #[test]
    fn test_last_lines() {
        assert_eq!(last_lines("a\nb\n\nc\n", 2), vec!["b", "c"]);
        assert_eq!(last_lines("only", 5), vec!["only"]);
        assert!(last_lines("", 5).is_empty());
    }

    #[test]
    fn test_failure_tail_keeps_both_streams() {
        let output = CapturedOutput {
            success: false,
            status: "1".to_string(),
            stdout: "asset index.js\nERROR in ./src/index.js\n".to_string(),
            stderr: "npm warn exec\n".to_string(),
        };
        assert_eq!(
            failure_tail(&output),
            vec!["asset index.js", "ERROR in ./src/index.js", "npm warn exec"]
        );
    }

    #[tokio::test]
    async fn test_channel_stream_preserves_order() {
        let (tx, rx) = mpsc::channel(EVENT_BUFFER);
        for line in ["a", "b", "c"] {
            tx.send(Ok(BuildEvent::Output(line.to_string()))).await.unwrap();
        }
        drop(tx);

        let events: Vec<_> = channel_stream(rx)
            .map(|e| e.unwrap())
            .collect()
            .await;
        assert_eq!(
            events,
            vec![
                BuildEvent::Output("a".to_string()),
                BuildEvent::Output("b".to_string()),
                BuildEvent::Output("c".to_string()),
            ]
        );
    }
}
