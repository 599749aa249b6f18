//! Hash command

use anyhow::{Context, Result};
use repodex_schema::HashAlgorithm;
use std::path::PathBuf;

/// Print the digest of each file, e.g. to check a hash-named include by hand.
pub fn hash(files: &[PathBuf], algorithm: HashAlgorithm) -> Result<()> {
    for file in files {
        let data =
            std::fs::read(file).with_context(|| format!("Failed to read {}", file.display()))?;
        println!("{} {}", algorithm.digest(&data), file.display());
    }
    Ok(())
}
