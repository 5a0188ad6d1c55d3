//! CLI command definitions
//!
//! Subcommands map one-to-one onto [`Command`]; execution and reporting live
//! in [`dispatch`].

pub mod dispatch;

use clap::Subcommand;

use crate::core::dispatch::Command;

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Bootstrap a directory to support cackle
    Init {
        /// Initialize even if cackle.toml already exists
        #[arg(short, long)]
        force: bool,
    },

    /// Create a new package
    Create {
        /// Package name (the manifest prefix is added when missing)
        name: String,
    },

    /// Build packages once
    Build {
        /// Package names
        #[arg(required = true)]
        names: Vec<String>,
    },

    /// Build packages and rebuild on change
    Watch {
        /// Package names
        #[arg(required = true)]
        names: Vec<String>,
    },

    /// Build packages, rebuild on change and serve them
    Serve {
        /// Package names; each gets the next port after the first
        #[arg(required = true)]
        names: Vec<String>,
    },

    /// Pack every package into a distributable archive
    Package,

    /// Link every package into the local environment
    Bootstrap,

    #[command(external_subcommand)]
    External(Vec<String>),
}

impl Commands {
    /// Convert into the command the dispatcher runs
    pub fn into_command(self) -> Command {
        match self {
            Self::Init { force } => Command::Init { force },
            Self::Create { name } => Command::Create { name },
            Self::Build { names } => Command::Build { names },
            Self::Watch { names } => Command::Watch { names },
            Self::Serve { names } => Command::Serve { names },
            Self::Package => Command::Package,
            Self::Bootstrap => Command::Bootstrap,
            Self::External(args) => Command::Unknown {
                verb: args.into_iter().next().unwrap_or_default(),
            },
        }
    }
}
