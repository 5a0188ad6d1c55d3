//! Command dispatch
//!
//! Runs one invocation: freezes the run options, resolves package names
//! against the manifest prefix, fans the operation out over every target
//! concurrently and collects one outcome per target. A failing target never
//! cancels or hides the others.

use std::fmt;

use futures::future::join_all;

use crate::core::builder::BuildContext;
use crate::core::create::create_package;
use crate::core::global_config::GlobalConfig;
use crate::core::init::init_project;
use crate::core::manifest::ManifestStore;
use crate::core::options::{RunFlags, RunOptions};
use crate::core::package::{PackageRuntime, ProgressSink};
use crate::core::workspace::Workspace;
use crate::error::{BuildError, CackleError};
use crate::registry::RegistryClient;

/// A parsed command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Scaffold a workspace and install tooling
    Init { force: bool },
    /// Scaffold a package and add it to the manifest
    Create { name: String },
    /// Build packages once
    Build { names: Vec<String> },
    /// Rebuild packages on change
    Watch { names: Vec<String> },
    /// Rebuild and serve packages
    Serve { names: Vec<String> },
    /// Pack every manifest package
    Package,
    /// Link every manifest package
    Bootstrap,
    /// A verb nobody handles
    Unknown { verb: String },
    /// No verb at all
    Help,
}

impl Command {
    /// Verb as typed on the command line
    pub fn verb(&self) -> &str {
        match self {
            Self::Init { .. } => "init",
            Self::Create { .. } => "create",
            Self::Build { .. } => "build",
            Self::Watch { .. } => "watch",
            Self::Serve { .. } => "serve",
            Self::Package => "package",
            Self::Bootstrap => "bootstrap",
            Self::Unknown { verb } => verb,
            Self::Help => "help",
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.verb())
    }
}

/// Outcome of one target
#[derive(Debug)]
pub struct TargetOutcome {
    pub target: String,
    /// Summary on success
    pub result: Result<String, CackleError>,
}

impl TargetOutcome {
    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }
}

/// Aggregated result of one invocation, one entry per target in order
#[derive(Debug)]
pub struct Report {
    pub command: String,
    pub outcomes: Vec<TargetOutcome>,
    /// The usage text should be shown instead
    pub show_usage: bool,
}

impl Report {
    fn usage(command: &Command) -> Self {
        Self {
            command: command.verb().to_string(),
            outcomes: Vec::new(),
            show_usage: true,
        }
    }

    pub fn failures(&self) -> usize {
        self.outcomes.iter().filter(|o| !o.is_success()).count()
    }

    pub fn is_success(&self) -> bool {
        self.failures() == 0
    }
}

#[derive(Debug, Clone, Copy)]
enum Lifecycle {
    Build,
    Watch,
    Serve,
}

#[derive(Debug, Clone, Copy)]
enum RegistryAction {
    Pack,
    Link,
}

/// Runs commands against one workspace
pub struct Dispatcher {
    workspace: Workspace,
    config: GlobalConfig,
    store: ManifestStore,
    progress: ProgressSink,
}

impl Dispatcher {
    /// Open the workspace manifest; a broken manifest degrades to an empty one
    pub async fn open(workspace: Workspace, config: GlobalConfig, progress: ProgressSink) -> Self {
        let store = ManifestStore::open(workspace.manifest_path()).await;
        Self {
            workspace,
            config,
            store,
            progress,
        }
    }

    pub fn store(&self) -> &ManifestStore {
        &self.store
    }

    /// Run `command` with run options derived from `flags`
    pub async fn run(&mut self, command: Command, flags: &RunFlags) -> Report {
        let options = RunOptions::from_flags(flags);
        tracing::debug!("Running {command} with {options:?}");

        let outcomes = match &command {
            Command::Init { force } => vec![self.init(*force).await],
            Command::Create { name } => vec![self.create(name).await],
            Command::Build { names } => self.fan_out(names, Lifecycle::Build, options).await,
            Command::Watch { names } => self.fan_out(names, Lifecycle::Watch, options).await,
            Command::Serve { names } => self.fan_out(names, Lifecycle::Serve, options).await,
            Command::Package => self.registry_all(RegistryAction::Pack).await,
            Command::Bootstrap => self.registry_all(RegistryAction::Link).await,
            Command::Unknown { verb } => {
                tracing::info!("Unknown command '{verb}'");
                return Report::usage(&command);
            }
            Command::Help => return Report::usage(&command),
        };

        Report {
            command: command.verb().to_string(),
            outcomes,
            show_usage: false,
        }
    }

    fn registry(&self) -> RegistryClient {
        RegistryClient::new(self.config.npm_command(), self.workspace.root().to_path_buf())
    }

    async fn init(&self, force: bool) -> TargetOutcome {
        let result = init_project(&self.workspace, &self.registry(), force)
            .await
            .map(|init| {
                format!(
                    "initialized ({} entries created, {} packages installed)",
                    init.created.len(),
                    init.dev_dependencies.len() + init.dependencies.len()
                )
            });

        TargetOutcome {
            target: self.workspace.root().display().to_string(),
            result,
        }
    }

    async fn create(&mut self, name: &str) -> TargetOutcome {
        let target = self.store.resolve_name(name);
        let result = create_package(&self.workspace, &mut self.store, &target)
            .await
            .map(|dir| {
                let shown = dir.strip_prefix(self.workspace.root()).unwrap_or(&dir);
                format!("created in {}", shown.display())
            });

        TargetOutcome { target, result }
    }

    async fn fan_out(
        &self,
        names: &[String],
        lifecycle: Lifecycle,
        options: RunOptions,
    ) -> Vec<TargetOutcome> {
        let ctx = BuildContext::new(
            self.workspace.clone().with_static_dir(self.config.static_dir()),
            options,
            self.config.clone(),
        );
        let base_port = self.config.serve_port();

        let runtimes: Vec<PackageRuntime<'_>> = names
            .iter()
            .map(|name| {
                PackageRuntime::new(
                    self.store.resolve_name(name),
                    &self.store,
                    &ctx,
                    self.progress.clone(),
                )
            })
            .collect();

        let results = join_all(runtimes.iter().enumerate().map(|(index, runtime)| async move {
            match lifecycle {
                Lifecycle::Build => runtime.build().await,
                Lifecycle::Watch => runtime.watch().await,
                Lifecycle::Serve => match serve_port(base_port, index) {
                    Some(port) => runtime.serve(port).await,
                    None => Err(BuildError::PortOutOfRange {
                        package: runtime.name().to_string(),
                        base: base_port,
                        offset: index,
                    }
                    .into()),
                },
            }
        }))
        .await;

        runtimes
            .iter()
            .zip(results)
            .map(|(runtime, result)| TargetOutcome {
                target: runtime.name().to_string(),
                result,
            })
            .collect()
    }

    async fn registry_all(&self, action: RegistryAction) -> Vec<TargetOutcome> {
        let registry = self.registry();
        let names: Vec<String> = self
            .store
            .manifest()
            .package_names()
            .map(ToString::to_string)
            .collect();

        let results = join_all(names.iter().map(|name| {
            let registry = &registry;
            let dir = self.workspace.package_dir(name);
            async move {
                let result = match action {
                    RegistryAction::Pack => registry.pack(&dir).await.map(|stdout| {
                        let archive = stdout.lines().last().unwrap_or_default().trim();
                        if archive.is_empty() {
                            "packed".to_string()
                        } else {
                            format!("packed {archive}")
                        }
                    }),
                    RegistryAction::Link => registry.link(&dir).await.map(|_| "linked".to_string()),
                };
                result.map_err(CackleError::from)
            }
        }))
        .await;

        names
            .into_iter()
            .zip(results)
            .map(|(target, result)| TargetOutcome { target, result })
            .collect()
    }
}

/// Dev-server port of the `index`-th served target
fn serve_port(base: u16, index: usize) -> Option<u16> {
    u16::try_from(index)
        .ok()
        .and_then(|offset| base.checked_add(offset))
}
