//! Build command

use anyhow::{Context, Result};
use repodex_core::io::{load_records, persist_includes, write_root};
use repodex_core::{BuildConfig, PackagesBuilder};
use std::time::Instant;

use crate::BuildArgs;

/// Build the repository described by `args`.
pub fn build(args: &BuildArgs) -> Result<()> {
    let start = Instant::now();
    let config = resolve_config(args)?;

    let records = load_records(&args.records, args.skip_errors)
        .with_context(|| format!("Failed to load records from {}", args.records.display()))?;
    tracing::info!("Loaded {} package records", records.len());

    let builder = PackagesBuilder::new(&args.output_dir, config)?;
    let outcome = builder.dump(records).context("Failed to dump packages")?;

    let summary = persist_includes(&outcome).context("Failed to write include files")?;
    let root = write_root(&outcome.index, &args.output_dir, builder.writer().style())
        .context("Failed to write root document")?;

    let mode = if outcome.index.is_providers() {
        "providers"
    } else {
        "flat"
    };
    tracing::info!(
        "Wrote {} include files ({mode}), {} already up to date, root at {} ({:.2}s)",
        summary.written,
        summary.skipped,
        root.display(),
        start.elapsed().as_secs_f64()
    );
    Ok(())
}

/// Config file values, overridden by command line flags.
fn resolve_config(args: &BuildArgs) -> Result<BuildConfig> {
    let mut config = match &args.config {
        Some(path) => BuildConfig::load(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => BuildConfig::default(),
    };

    if args.providers {
        config.providers = true;
    }
    if let Some(homepage) = &args.homepage {
        config.homepage = Some(homepage.clone());
    }
    if let Some(include_filename) = &args.include_filename {
        config.include_filename.clone_from(include_filename);
    }
    if args.no_pretty_print {
        config.pretty_print = false;
    }
    Ok(config)
}
