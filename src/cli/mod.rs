//! Command-line interface module
//!
//! This module handles argument parsing and output formatting.
//! It contains no business logic - that belongs in the [`crate::core`] module.

pub mod commands;
pub mod output;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;

use crate::core::dispatch::Command;
use crate::core::global_config::GlobalConfig;
use crate::core::options::{Environment, RunFlags, Variant};
use crate::infra::dirs::CackleDirs;
use commands::Commands;

/// Cackle - manifest-driven build orchestrator for JavaScript mono repos
///
/// Builds, watches and serves the packages of a workspace with webpack or
/// rollup, several at a time.
#[derive(Parser, Debug)]
#[command(name = "cackle")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output (-v for info, -vv for debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Global configuration file
    #[arg(long, global = true, env = "CACKLE_CONFIG", value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Build for production
    #[arg(short, long, global = true)]
    pub production: bool,

    /// Build environment (overrides --production)
    #[arg(long, global = true, value_name = "production|development")]
    pub env: Option<Environment>,

    /// Build variant (overrides --app)
    #[arg(long, global = true, value_name = "app|module")]
    pub variant: Option<Variant>,

    /// Build as a standalone application
    #[arg(long, global = true)]
    pub app: bool,

    /// Comma-separated feature tags (flow, typescript, react)
    #[arg(long, global = true, value_name = "LIST")]
    pub features: Option<String>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

impl Cli {
    /// Run options given on the command line
    pub fn run_flags(&self) -> RunFlags {
        RunFlags {
            production: self.production,
            env: self.env,
            variant: self.variant,
            app: self.app,
            features: self.features.clone(),
        }
    }

    /// Execute the CLI command
    pub async fn run(self) -> Result<()> {
        let flags = self.run_flags();
        let config = load_config(self.config.as_deref())?;
        let command = self.command.map_or(Command::Help, Commands::into_command);

        commands::dispatch::execute(command, &flags, config).await
    }
}

fn load_config(path: Option<&Path>) -> Result<GlobalConfig> {
    match path {
        Some(path) => GlobalConfig::load_from_path(path)
            .with_context(|| format!("Failed to load configuration from {}", path.display())),
        None => GlobalConfig::load(&CackleDirs::new()).context("Failed to load global configuration"),
    }
}
