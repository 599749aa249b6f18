//! repodex core
//!
//! Builds a static, hash-addressed package repository from dumped package
//! records.
//!
//! # Pipeline
//!
//! - [`indexer`] groups records by name and version and numbers versions.
//! - [`replace`] finds packages that declare a package as replaced.
//! - [`template`] expands `%package%` / `%hash%` filename templates.
//! - [`include`] serializes a payload, hashes it and resolves its filename.
//! - [`builder`] ties these together into one `dump` per run.
//! - [`io`] loads records and persists what `dump` decided to write.
//!
//! # Output Layout
//!
//! ```text
//! <output>/
//! ├── packages.json              # Root document
//! ├── include/all$<sha1>.json    # Flat mode
//! └── p/<vendor>/<name>$<sha256>.json  # Providers mode
//! ```

/// The per-run `dump` orchestration.
pub mod builder;
/// Typed build configuration.
pub mod config;
/// Error types shared by the build pipeline.
pub mod error;
/// Include file serialization and filename resolution.
pub mod include;
/// Grouping and uid assignment.
pub mod indexer;
/// Filesystem side effects: loading records, writing outputs.
pub mod io;
/// Replaced-by resolution.
pub mod replace;
/// Filename and URL templates.
pub mod template;

pub use builder::{DumpOutcome, PackagesBuilder, WrittenInclude};
pub use config::BuildConfig;
pub use error::{BuildError, Result};
pub use include::{IncludeDescriptor, IncludeFileWriter, JsonStyle};
pub use indexer::PackageIndexer;
pub use template::FilenameTemplate;

pub use repodex_schema as schema;
