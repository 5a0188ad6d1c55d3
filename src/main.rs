//! Cackle CLI - manifest-driven build orchestrator
//!
//! Entry point for the cackle command-line application.

use anyhow::Result;
use clap::Parser;

use cackle::cli::output::{display_error, OutputConfig};
use cackle::cli::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let output_config = OutputConfig::new(cli.quiet, cli.verbose);
    output_config.apply_global();

    // RUST_LOG wins; otherwise the level follows -v
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::builder()
                .with_default_directive(output_config.log_level().into())
                .from_env_lossy(),
        )
        .with_writer(std::io::stderr)
        .init();

    match cli.run().await {
        Ok(()) => Ok(()),
        Err(e) => {
            display_error(&e);
            std::process::exit(1);
        }
    }
}
