//! Rollup backend adapter
//!
//! One-shot builds only. `watch` and `serve` report
//! [`BuildError::Unsupported`] instead of running anything.

use std::path::{Path, PathBuf};

use futures::future::BoxFuture;

use crate::core::builder::{
    failed_stream, failure_tail, resolve_entry, spawn_error, BuildContext, BuildOutcome, Builder,
    EventStream,
};
use crate::core::manifest::BuildSystem;
use crate::core::profile::TransformProfile;
use crate::error::BuildError;
use crate::infra::process::run_captured;

const BACKEND: &str = "rollup";

/// Adapter for the rollup ES module bundler
#[derive(Debug, Clone)]
pub struct RollupBuilder {
    ctx: BuildContext,
    profile: TransformProfile,
}

impl RollupBuilder {
    pub fn new(ctx: BuildContext, profile: TransformProfile) -> Self {
        Self { ctx, profile }
    }

    fn output_dir(&self, package: &str) -> PathBuf {
        self.ctx.workspace.package_dir(package).join("dist")
    }

    fn args(&self, entry: &Path, output_dir: &Path) -> Vec<String> {
        let mut args = vec![
            "--input".to_string(),
            entry.display().to_string(),
            "--dir".to_string(),
            output_dir.display().to_string(),
            "--format".to_string(),
            "cjs".to_string(),
            "--environment".to_string(),
            format!("NODE_ENV:{}", self.ctx.options.environment()),
        ];
        for plugin in &self.profile.plugins {
            args.push("--plugin".to_string());
            args.push(plugin.clone());
        }
        args
    }

    fn unsupported(operation: &str) -> EventStream {
        failed_stream(BuildError::Unsupported {
            backend: BACKEND.to_string(),
            operation: operation.to_string(),
        })
    }
}

impl Builder for RollupBuilder {
    fn system(&self) -> BuildSystem {
        BuildSystem::Rollup
    }

    fn build<'a>(&'a self, package: &'a str) -> BoxFuture<'a, Result<BuildOutcome, BuildError>> {
        Box::pin(async move {
            let entry = resolve_entry(&self.ctx.workspace, package).await?;
            let output_dir = self.output_dir(package);
            let args = self.args(&entry, &output_dir);
            let tool = self.ctx.config.rollup_command();

            tracing::info!("Building {package} with {}", tool.describe(&args));
            let output = run_captured(&tool, &args, self.ctx.workspace.root())
                .await
                .map_err(spawn_error)?;

            if !output.success {
                return Err(BuildError::BackendExited {
                    backend: BACKEND.to_string(),
                    package: package.to_string(),
                    status: output.status.clone(),
                    output_tail: failure_tail(&output),
                });
            }

            // rollup reports progress on stderr
            Ok(BuildOutcome {
                package: package.to_string(),
                system: BuildSystem::Rollup,
                output_dir,
                log: output
                    .stdout
                    .lines()
                    .chain(output.stderr.lines())
                    .map(str::to_string)
                    .collect(),
            })
        })
    }

    fn watch(&self, _package: &str) -> EventStream {
        Self::unsupported("watch")
    }

    fn serve(&self, _package: &str, _port: u16) -> EventStream {
        Self::unsupported("serve")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::global_config::{GlobalConfig, ToolsConfig};
    use crate::core::options::{Environment, RunOptions, Variant};
    use crate::core::profile::ProfileComposer;
    use crate::core::workspace::Workspace;
    use futures::StreamExt;
    use std::collections::BTreeSet;
    use tempfile::TempDir;

    fn setup(rollup: Vec<&str>) -> (TempDir, RollupBuilder) {
        let temp = TempDir::new().unwrap();
        let src = temp.path().join("packages/ckl-r/src");
        std::fs::create_dir_all(&src).unwrap();
        std::fs::write(src.join("index.js"), "export default 1;").unwrap();

        let ctx = BuildContext::new(
            Workspace::new(temp.path()),
            RunOptions::new(Environment::Production, Variant::Module, BTreeSet::new()),
            GlobalConfig {
                tools: ToolsConfig {
                    rollup: Some(rollup.into_iter().map(String::from).collect()),
                    ..ToolsConfig::default()
                },
                ..GlobalConfig::default()
            },
        );
        (temp, RollupBuilder::new(ctx, ProfileComposer::new(BuildSystem::Rollup).build()))
    }

    #[tokio::test]
    async fn test_build_passes_cli_arguments() {
        let (temp, builder) = setup(vec!["sh", "-c", "echo \"$@\"", "sh"]);

        let outcome = builder.build("ckl-r").await.unwrap();
        let line = &outcome.log[0];
        assert!(line.contains("--format cjs"));
        assert!(line.contains("--environment NODE_ENV:production"));
        assert!(!line.contains("--plugin"));
        assert_eq!(outcome.output_dir, temp.path().join("packages/ckl-r/dist"));
    }

    #[tokio::test]
    async fn test_build_failure() {
        let (_temp, builder) = setup(vec!["sh", "-c", "echo 'bad input' >&2; exit 1", "sh"]);

        let err = builder.build("ckl-r").await.unwrap_err();
        assert!(matches!(err, BuildError::BackendExited { ref backend, .. } if backend == "rollup"));
    }

    #[tokio::test]
    async fn test_watch_and_serve_are_unsupported() {
        let (_temp, builder) = setup(vec!["true"]);

        let watch: Vec<_> = builder.watch("ckl-r").collect().await;
        assert_eq!(watch.len(), 1);
        assert!(matches!(
            &watch[0],
            Err(BuildError::Unsupported { operation, .. }) if operation == "watch"
        ));

        let serve: Vec<_> = builder.serve("ckl-r", 8080).collect().await;
        assert!(matches!(
            &serve[0],
            Err(BuildError::Unsupported { operation, .. }) if operation == "serve"
        ));
    }
}
