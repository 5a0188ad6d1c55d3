//! External process execution
//!
//! Runs the external tools (bundlers, registry client) either to completion
//! with captured output, or as a long-running child whose output lines are
//! forwarded in arrival order over a channel.

use std::fmt;
use std::path::Path;
use std::process::{ExitStatus, Stdio};

use thiserror::Error;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tokio::process::Command;
use tokio::sync::mpsc;

/// Capacity of the line channel of a streaming child
const LINE_BUFFER: usize = 256;

/// Errors starting an external tool
#[derive(Error, Debug)]
pub enum ProcessError {
    /// Program is not on PATH
    #[error("'{program}' not found in PATH")]
    NotFound { program: String },

    /// Program could not be spawned
    #[error("Failed to start '{program}': {error}")]
    Spawn { program: String, error: String },
}

/// An external command: program plus leading arguments
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolCommand {
    program: String,
    args: Vec<String>,
}

impl ToolCommand {
    /// Create a command from a program and its leading arguments
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    /// Build a command from a configured argv, falling back to `default`
    /// when nothing (or an empty argv) is configured
    pub fn from_argv(configured: Option<&[String]>, default: &[&str]) -> Self {
        match configured {
            Some([program, args @ ..]) => Self::new(program.clone(), args.to_vec()),
            _ => {
                let mut parts = default.iter().map(ToString::to_string);
                let program = parts.next().unwrap_or_default();
                Self::new(program, parts.collect())
            }
        }
    }

    /// Program name
    pub fn program(&self) -> &str {
        &self.program
    }

    /// Check that the program can be found
    pub fn ensure_available(&self) -> Result<(), ProcessError> {
        which::which(&self.program)
            .map(|_| ())
            .map_err(|_| ProcessError::NotFound {
                program: self.program.clone(),
            })
    }

    fn command(&self, extra: &[String], cwd: &Path) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args)
            .args(extra)
            .current_dir(cwd)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        cmd
    }

    /// Render the full invocation for messages
    pub fn describe(&self, extra: &[String]) -> String {
        let mut parts = vec![self.program.as_str()];
        parts.extend(self.args.iter().map(String::as_str));
        parts.extend(extra.iter().map(String::as_str));
        parts.join(" ")
    }
}

impl fmt::Display for ToolCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.describe(&[]))
    }
}

/// Output of a command run to completion
#[derive(Debug, Clone)]
pub struct CapturedOutput {
    /// Whether the command exited successfully
    pub success: bool,
    /// Exit code, or a description of the signal
    pub status: String,
    /// Captured stdout
    pub stdout: String,
    /// Captured stderr
    pub stderr: String,
}

/// Run a command to completion and capture its output
pub async fn run_captured(
    tool: &ToolCommand,
    args: &[String],
    cwd: &Path,
) -> Result<CapturedOutput, ProcessError> {
    tool.ensure_available()?;
    tracing::debug!("Running {} in {}", tool.describe(args), cwd.display());

    let output = tool
        .command(args, cwd)
        .output()
        .await
        .map_err(|e| ProcessError::Spawn {
            program: tool.program.clone(),
            error: e.to_string(),
        })?;

    Ok(CapturedOutput {
        success: output.status.success(),
        status: status_label(output.status),
        stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
    })
}

/// Event from a streaming child process
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProcessEvent {
    /// A line written to stdout
    Stdout(String),
    /// A line written to stderr
    Stderr(String),
    /// The child exited
    Exited { success: bool, status: String },
    /// Waiting on the child failed
    Failed(String),
}

/// Spawn a long-running command and forward its output line by line
///
/// Lines are sent in the order they are read. The last event is always
/// `Exited` or `Failed`. Dropping the receiver kills the child.
pub fn spawn_lines(
    tool: &ToolCommand,
    args: &[String],
    cwd: &Path,
) -> Result<mpsc::Receiver<ProcessEvent>, ProcessError> {
    tool.ensure_available()?;
    tracing::debug!("Spawning {} in {}", tool.describe(args), cwd.display());

    let mut child = tool
        .command(args, cwd)
        .kill_on_drop(true)
        .spawn()
        .map_err(|e| ProcessError::Spawn {
            program: tool.program.clone(),
            error: e.to_string(),
        })?;

    let mut stdout = child.stdout.take().map(|s| RawLines::new(BufReader::new(s)));
    let mut stderr = child.stderr.take().map(|s| RawLines::new(BufReader::new(s)));
    let (tx, rx) = mpsc::channel(LINE_BUFFER);

    tokio::spawn(async move {
        enum Next {
            Out(Option<String>),
            Err(Option<String>),
        }

        loop {
            let next = tokio::select! {
                line = next_line(&mut stdout), if stdout.is_some() => Next::Out(line),
                line = next_line(&mut stderr), if stderr.is_some() => Next::Err(line),
                else => break,
            };

            let event = match next {
                Next::Out(Some(line)) => ProcessEvent::Stdout(line),
                Next::Err(Some(line)) => ProcessEvent::Stderr(line),
                Next::Out(None) => {
                    stdout = None;
                    continue;
                }
                Next::Err(None) => {
                    stderr = None;
                    continue;
                }
            };

            if tx.send(event).await.is_err() {
                // receiver gone; child is killed on drop
                return;
            }
        }

        let last = match child.wait().await {
            Ok(status) => ProcessEvent::Exited {
                success: status.success(),
                status: status_label(status),
            },
            Err(e) => ProcessEvent::Failed(e.to_string()),
        };
        let _ = tx.send(last).await;
    });

    Ok(rx)
}

/// Line reader that tolerates output which is not valid UTF-8
///
/// Partial lines survive a cancelled read in `buf`, so `next` may be raced
/// in `select!`.
struct RawLines<R> {
    reader: R,
    buf: Vec<u8>,
}

impl<R: AsyncBufRead + Unpin> RawLines<R> {
    fn new(reader: R) -> Self {
        Self {
            reader,
            buf: Vec::new(),
        }
    }

    async fn next(&mut self) -> Option<String> {
        let read = self.reader.read_until(b'\n', &mut self.buf).await;
        if matches!(read, Ok(0) | Err(_)) && self.buf.is_empty() {
            return None;
        }

        let mut line = std::mem::take(&mut self.buf);
        if line.last() == Some(&b'\n') {
            line.pop();
            if line.last() == Some(&b'\r') {
                line.pop();
            }
        }
        Some(String::from_utf8_lossy(&line).into_owned())
    }
}

async fn next_line<R>(lines: &mut Option<RawLines<R>>) -> Option<String>
where
    R: AsyncBufRead + Unpin,
{
    match lines {
        Some(lines) => lines.next().await,
        None => None,
    }
}

fn status_label(status: ExitStatus) -> String {
    match status.code() {
        Some(code) => code.to_string(),
        None => "terminated by signal".to_string(),
    }
}
