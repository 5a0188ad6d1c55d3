//! Webpack backend adapter
//!
//! Renders a configuration module per package under `.cackle/webpack/` and
//! runs the webpack CLI against it. `watch` and `serve` keep the CLI running
//! and forward its output; `serve` additionally probes the dev-server port.

use std::collections::VecDeque;
use std::net::{Ipv4Addr, SocketAddr};
use std::path::{Path, PathBuf};
use std::time::Duration;

use futures::future::BoxFuture;
use regex::Regex;
use serde::Serialize;
use tokio::sync::mpsc;

use crate::config::defaults;
use crate::core::builder::{
    channel_stream, failure_tail, resolve_entry, spawn_error, BuildContext, BuildEvent,
    BuildOutcome, Builder, EventStream, EVENT_BUFFER,
};
use crate::core::manifest::BuildSystem;
use crate::core::options::Variant;
use crate::core::profile::TransformProfile;
use crate::error::BuildError;
use crate::infra::filesystem;
use crate::infra::net::{ensure_port_free, wait_for_listener};
use crate::infra::process::{run_captured, spawn_lines, ProcessEvent};

const BACKEND: &str = "webpack";
const DEV_SERVER_HOST: Ipv4Addr = Ipv4Addr::LOCALHOST;

/// Generated webpack configuration
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct WebpackConfig<'a> {
    mode: &'static str,
    context: String,
    entry: Vec<String>,
    output: Output,
    resolve: Resolve,
    module: Module<'a>,
    watch_options: WatchOptions,
    #[serde(skip_serializing_if = "Option::is_none")]
    dev_server: Option<DevServer>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Output {
    filename: &'static str,
    path: String,
    library: String,
    library_target: &'static str,
    umd_named_define: bool,
    global_object: &'static str,
}

#[derive(Debug, Serialize)]
struct Resolve {
    extensions: Vec<&'static str>,
}

#[derive(Debug, Serialize)]
struct Module<'a> {
    rules: Vec<Rule<'a>>,
}

/// `test` and `exclude` are regex sources, turned into RegExp by the wrapper
#[derive(Debug, Serialize)]
struct Rule<'a> {
    test: &'static str,
    exclude: &'static str,
    #[serde(rename = "use")]
    loader: Loader<'a>,
}

#[derive(Debug, Serialize)]
struct Loader<'a> {
    loader: &'static str,
    options: LoaderOptions<'a>,
}

#[derive(Debug, Serialize)]
struct LoaderOptions<'a> {
    babelrc: bool,
    #[serde(flatten)]
    profile: &'a TransformProfile,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct WatchOptions {
    aggregate_timeout: u64,
}

#[derive(Debug, Serialize)]
struct DevServer {
    host: String,
    port: u16,
    #[serde(rename = "static")]
    static_dirs: Vec<String>,
}

/// Adapter for the webpack module bundler
#[derive(Debug, Clone)]
pub struct WebpackBuilder {
    ctx: BuildContext,
    profile: TransformProfile,
}

impl WebpackBuilder {
    pub fn new(ctx: BuildContext, profile: TransformProfile) -> Self {
        Self { ctx, profile }
    }

    /// Path of the generated configuration for `package`
    pub fn config_path(&self, package: &str) -> PathBuf {
        self.ctx
            .workspace
            .state_dir()
            .join(BACKEND)
            .join(format!("{package}.config.js"))
    }

    fn output_dir(&self, package: &str) -> PathBuf {
        self.ctx.workspace.package_dir(package).join("lib")
    }

    fn render(&self, package: &str, entry: &Path, port: Option<u16>) -> Result<String, BuildError> {
        let package_dir = self.ctx.workspace.package_dir(package);
        let output_dir = self.output_dir(package);

        let mut entries = Vec::new();
        if self.ctx.options.variant() == Variant::App {
            entries.push(defaults::POLYFILL_ENTRY.to_string());
        }
        entries.push(entry.display().to_string());

        let mut rules = vec![self.rule(r"\.jsx?$")];
        if self.profile.handles_typescript() {
            rules.push(self.rule(r"\.tsx?$"));
        }

        let config = WebpackConfig {
            mode: self.ctx.options.environment().as_str(),
            context: package_dir.display().to_string(),
            entry: entries,
            output: Output {
                filename: "index.js",
                path: output_dir.display().to_string(),
                library: library_name(package),
                library_target: "umd",
                umd_named_define: true,
                global_object: "typeof self !== 'undefined' ? self : this",
            },
            resolve: Resolve {
                extensions: vec![".tsx", ".ts", ".js"],
            },
            module: Module { rules },
            watch_options: WatchOptions {
                aggregate_timeout: self.ctx.config.aggregate_timeout_ms(),
            },
            dev_server: port.map(|port| DevServer {
                host: DEV_SERVER_HOST.to_string(),
                port,
                static_dirs: vec![
                    output_dir.display().to_string(),
                    self.ctx.workspace.static_dir().display().to_string(),
                ],
            }),
        };

        let json = serde_json::to_string_pretty(&config).map_err(|e| BuildError::Config {
            backend: BACKEND.to_string(),
            package: package.to_string(),
            error: e.to_string(),
        })?;

        Ok(format!(
            "// Generated by cackle; changes are overwritten\n\
             const config = {json};\n\
             for (const rule of config.module.rules) {{\n  \
             rule.test = new RegExp(rule.test);\n  \
             rule.exclude = new RegExp(rule.exclude);\n\
             }}\n\
             module.exports = config;\n"
        ))
    }

    fn rule(&self, test: &'static str) -> Rule<'_> {
        Rule {
            test,
            exclude: "node_modules",
            loader: Loader {
                loader: "babel-loader",
                options: LoaderOptions {
                    babelrc: false,
                    profile: &self.profile,
                },
            },
        }
    }

    /// Resolve the entry and write the configuration; returns its path
    async fn prepare(&self, package: &str, port: Option<u16>) -> Result<PathBuf, BuildError> {
        let entry = resolve_entry(&self.ctx.workspace, package).await?;
        let content = self.render(package, &entry, port)?;
        let path = self.config_path(package);

        filesystem::write_file(&path, &content)
            .await
            .map_err(|e| BuildError::Config {
                backend: BACKEND.to_string(),
                package: package.to_string(),
                error: e.to_string(),
            })?;

        tracing::debug!("Wrote {} for {package}", path.display());
        Ok(path)
    }

    /// Run webpack in watch or serve mode, forwarding its status to `tx`
    async fn run_streaming(
        &self,
        package: &str,
        port: Option<u16>,
        tx: &mpsc::Sender<Result<BuildEvent, BuildError>>,
    ) -> Result<(), BuildError> {
        let config_path = self.prepare(package, port).await?;
        let config_arg = config_path.display().to_string();

        let args: Vec<String> = match port {
            Some(_) => vec!["serve".into(), "--config".into(), config_arg],
            None => vec!["--config".into(), config_arg, "--watch".into()],
        };

        let addr = port.map(|port| SocketAddr::from((DEV_SERVER_HOST, port)));
        if let Some(addr) = addr {
            // the readiness probe cannot tell a stale server from ours
            ensure_port_free(addr).await.map_err(|e| {
                tracing::debug!("Cannot bind {addr} for {package}: {e}");
                BuildError::PortInUse {
                    package: package.to_string(),
                    address: addr.to_string(),
                }
            })?;
        }

        let tool = self.ctx.config.webpack_command();
        let mut lines =
            spawn_lines(&tool, &args, self.ctx.workspace.root()).map_err(spawn_error)?;

        let timeout = Duration::from_secs(defaults::DEV_SERVER_READY_TIMEOUT_SECS);
        let ready = async move {
            match addr {
                Some(addr) => wait_for_listener(addr, timeout).await,
                None => std::future::pending().await,
            }
        };
        tokio::pin!(ready);
        let mut ready_done = addr.is_none();

        let mut tail: VecDeque<String> = VecDeque::with_capacity(defaults::OUTPUT_TAIL_LINES);

        loop {
            let events = tokio::select! {
                result = &mut ready, if !ready_done => {
                    ready_done = true;
                    match (result, addr) {
                        (Ok(()), Some(addr)) => vec![BuildEvent::Listening {
                            url: format!("http://{addr}"),
                        }],
                        (Err(e), Some(addr)) => {
                            tracing::debug!("Dev server probe for {package} failed: {e}");
                            return Err(BuildError::ServerNotReady {
                                package: package.to_string(),
                                address: addr.to_string(),
                            });
                        }
                        (_, None) => Vec::new(),
                    }
                }
                event = lines.recv() => match event {
                    Some(ProcessEvent::Stdout(line)) => {
                        push_tail(&mut tail, &line);
                        let rebuilt = rebuild_status(&line);
                        let mut events = vec![BuildEvent::Output(line)];
                        if let Some(success) = rebuilt {
                            events.push(BuildEvent::Rebuilt { success });
                        }
                        events
                    }
                    Some(ProcessEvent::Stderr(line)) => {
                        push_tail(&mut tail, &line);
                        vec![BuildEvent::Output(line)]
                    }
                    Some(ProcessEvent::Exited { success: true, .. }) | None => return Ok(()),
                    Some(ProcessEvent::Exited { success: false, status }) => {
                        return Err(BuildError::BackendExited {
                            backend: BACKEND.to_string(),
                            package: package.to_string(),
                            status,
                            output_tail: tail.into_iter().collect(),
                        });
                    }
                    Some(ProcessEvent::Failed(message)) => {
                        return Err(BuildError::BackendFailed {
                            backend: BACKEND.to_string(),
                            package: package.to_string(),
                            message,
                        });
                    }
                },
            };

            for event in events {
                if tx.send(Ok(event)).await.is_err() {
                    // consumer gone
                    return Ok(());
                }
            }
        }
    }

    fn stream(&self, package: &str, port: Option<u16>) -> EventStream {
        let this = self.clone();
        let package = package.to_string();
        let (tx, rx) = mpsc::channel(EVENT_BUFFER);

        tokio::spawn(async move {
            if let Err(e) = this.run_streaming(&package, port, &tx).await {
                let _ = tx.send(Err(e)).await;
            }
        });

        channel_stream(rx)
    }
}

impl Builder for WebpackBuilder {
    fn system(&self) -> BuildSystem {
        BuildSystem::Webpack
    }

    fn build<'a>(&'a self, package: &'a str) -> BoxFuture<'a, Result<BuildOutcome, BuildError>> {
        Box::pin(async move {
            let config_path = self.prepare(package, None).await?;
            let args = vec!["--config".to_string(), config_path.display().to_string()];
            let tool = self.ctx.config.webpack_command();

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

            Ok(BuildOutcome {
                package: package.to_string(),
                system: BuildSystem::Webpack,
                output_dir: self.output_dir(package),
                log: output
                    .stdout
                    .lines()
                    .chain(output.stderr.lines())
                    .map(str::to_string)
                    .collect(),
            })
        })
    }

    fn watch(&self, package: &str) -> EventStream {
        self.stream(package, None)
    }

    fn serve(&self, package: &str, port: u16) -> EventStream {
        self.stream(package, Some(port))
    }
}

/// Library name exported by the UMD bundle: `ckl-my-lib` becomes `cklMyLib`
pub fn library_name(package: &str) -> String {
    Regex::new(r"[-_.\s]+([A-Za-z0-9])")
        .map(|re| {
            re.replace_all(package, |caps: &regex::Captures<'_>| caps[1].to_uppercase())
                .into_owned()
        })
        .unwrap_or_else(|_| package.to_string())
}

fn push_tail(tail: &mut VecDeque<String>, line: &str) {
    if line.trim().is_empty() {
        return;
    }
    if tail.len() == defaults::OUTPUT_TAIL_LINES {
        tail.pop_front();
    }
    tail.push_back(line.to_string());
}

/// Whether `line` is webpack's end-of-compilation summary, and its outcome
fn rebuild_status(line: &str) -> Option<bool> {
    if line.contains("compiled successfully") {
        Some(true)
    } else if line.contains("compiled with") {
        Some(!line.contains("error"))
    } else {
        None
    }
}
