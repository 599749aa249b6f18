//! Repository dump orchestration
//!
//! One [`PackagesBuilder::dump`] call turns the full record collection into a
//! root document plus the include files it references. Nothing is written to
//! disk here; the returned [`DumpOutcome`] says what needs writing.

use indexmap::IndexMap;
use repodex_schema::{ContentHash, HashAlgorithm, PackageGroup, PackageRecord, RepoIndex};
use std::path::PathBuf;

use crate::config::BuildConfig;
use crate::error::Result;
use crate::include::{IncludeDescriptor, IncludeFileWriter};
use crate::indexer::PackageIndexer;
use crate::replace::find_replacements;
use crate::template::{FilenameTemplate, PROVIDERS_TEMPLATE, advertised_url};

/// A hash-templated include produced during a dump, for root-index writers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrittenInclude {
    /// Content hash of the include file.
    pub hash: ContentHash,
    /// The template the file was named from (with `%hash%` still in place).
    pub template: FilenameTemplate,
}

/// Everything one dump produced.
#[derive(Debug, Clone)]
pub struct DumpOutcome {
    /// The root document.
    pub index: RepoIndex,
    /// Every include file prepared, in generation order.
    pub includes: Vec<IncludeDescriptor>,
    /// `(hash, template)` of every hash-templated include, in generation order.
    pub written_includes: Vec<WrittenInclude>,
}

impl DumpOutcome {
    /// Include files that still have to be written.
    pub fn pending(&self) -> impl Iterator<Item = &IncludeDescriptor> {
        self.includes.iter().filter(|d| d.needs_write())
    }
}

/// Builds the static repository for one output directory.
#[derive(Debug, Clone)]
pub struct PackagesBuilder {
    config: BuildConfig,
    writer: IncludeFileWriter,
}

impl PackagesBuilder {
    /// Create a builder, validating `config`.
    ///
    /// # Errors
    ///
    /// Returns [`crate::BuildError::Config`] if the configuration is invalid.
    pub fn new(output_dir: impl Into<PathBuf>, config: BuildConfig) -> Result<Self> {
        config.validate()?;
        let writer = IncludeFileWriter::new(output_dir, config.json_style());
        Ok(Self { config, writer })
    }

    /// The include writer (and thereby output directory and JSON style).
    pub fn writer(&self) -> &IncludeFileWriter {
        &self.writer
    }

    /// Index `records` and prepare the root document and include files.
    ///
    /// # Errors
    ///
    /// Fails on the first include that cannot be serialized, whose filename
    /// would leave the output directory, or whose target cannot be checked on
    /// disk.
    pub fn dump<I>(&self, records: I) -> Result<DumpOutcome>
    where
        I: IntoIterator<Item = PackageRecord>,
    {
        if self.config.providers {
            self.dump_providers(records)
        } else {
            self.dump_flat(records)
        }
    }

    fn dump_flat<I>(&self, records: I) -> Result<DumpOutcome>
    where
        I: IntoIterator<Item = PackageRecord>,
    {
        let packages = PackageIndexer::new().index(records);
        tracing::info!("Dumping {} packages into a single include", packages.len());

        let mut written_includes = Vec::new();
        let template = FilenameTemplate::new(self.config.include_filename.as_str());
        let include = self.write_include(
            &packages,
            &template,
            HashAlgorithm::Sha1,
            &mut written_includes,
        )?;

        Ok(DumpOutcome {
            index: RepoIndex::Packages { packages },
            includes: vec![include],
            written_includes,
        })
    }

    fn dump_providers<I>(&self, records: I) -> Result<DumpOutcome>
    where
        I: IntoIterator<Item = PackageRecord>,
    {
        let packages = PackageIndexer::new().with_uids(true).index(records);
        tracing::info!("Dumping {} packages as providers", packages.len());

        let template = FilenameTemplate::new(PROVIDERS_TEMPLATE);
        let providers_url = advertised_url(&template, None, self.config.homepage());

        let mut providers = IndexMap::with_capacity(packages.len());
        let mut includes = Vec::with_capacity(packages.len());
        let mut written_includes = Vec::new();

        for (name, versions) in &packages {
            let mut group = find_replacements(&packages, name);
            group.insert(name.clone(), versions.clone());

            let include = self.write_include(
                &group,
                &template.for_package(name),
                HashAlgorithm::Sha256,
                &mut written_includes,
            )?;
            providers.insert(name.clone(), include.provider_entry());
            includes.push(include);
        }

        Ok(DumpOutcome {
            index: RepoIndex::Providers {
                providers_url,
                providers,
            },
            includes,
            written_includes,
        })
    }

    fn write_include(
        &self,
        packages: &PackageGroup,
        template: &FilenameTemplate,
        algorithm: HashAlgorithm,
        written: &mut Vec<WrittenInclude>,
    ) -> Result<IncludeDescriptor> {
        let include = self.writer.write(packages, template, algorithm)?;
        if template.has_hash() {
            written.push(WrittenInclude {
                hash: include.hash.clone(),
                template: template.clone(),
            });
        }
        tracing::debug!(
            filename = %include.filename,
            hash = %include.hash,
            pending = include.needs_write(),
            "Prepared include"
        );
        Ok(include)
    }
}
