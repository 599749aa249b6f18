//! repodex - static package repository builder CLI

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use repodex_cli::cmd;
use repodex_cli::{Cli, Commands};

fn main() -> Result<()> {
    let cli = Cli::parse();

    // RUST_LOG wins over -v
    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Build(args) => cmd::build::build(&args),
        Commands::Hash { files, algorithm } => cmd::hash::hash(&files, algorithm),
    }
}
