//! repodex - static package repository builder
#![allow(missing_docs)]
#![allow(clippy::missing_errors_doc)]
//!
//! Turns a file of dumped package records into a directory a package manager
//! client can fetch incrementally.
//!
//! # Directory Layout
//!
//! ```text
//! <output>/
//! ├── packages.json               # Root document
//! ├── include/all$<sha1>.json     # Flat mode include
//! └── p/<package>$<sha256>.json   # Providers mode, one per package
//! ```

pub mod cmd;

use clap::{Parser, Subcommand};
use repodex_schema::HashAlgorithm;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "repodex")]
#[command(author, version, about = "repodex - static, hash-addressed package repositories")]
pub struct Cli {
    /// Log every include file decision
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Build the repository from dumped package records
    Build(BuildArgs),
    /// Hash files the way include files are hashed
    Hash {
        /// Files to hash
        #[arg(required = true)]
        files: Vec<PathBuf>,
        /// Digest algorithm (sha1, sha256, sha384, sha512)
        #[arg(short, long, default_value = "sha256")]
        algorithm: HashAlgorithm,
    },
}

#[derive(Debug, clap::Args)]
pub struct BuildArgs {
    /// JSON array of dumped package records
    pub records: PathBuf,

    /// Directory receiving packages.json and the include files
    pub output_dir: PathBuf,

    /// Repository configuration file (JSON)
    #[arg(short, long, env = "REPODEX_CONFIG")]
    pub config: Option<PathBuf>,

    /// Emit one provider file per package
    #[arg(long)]
    pub providers: bool,

    /// Public repository URL, its path prefixes providers-url
    #[arg(long)]
    pub homepage: Option<String>,

    /// Include filename template for flat mode
    #[arg(long)]
    pub include_filename: Option<String>,

    /// Write compact JSON
    #[arg(long)]
    pub no_pretty_print: bool,

    /// Skip invalid records instead of aborting
    #[arg(long)]
    pub skip_errors: bool,
}
