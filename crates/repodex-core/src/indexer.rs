//! Grouping of dumped records into a [`PackageGroup`]
//!
//! Records are keyed by name, then by pretty version. When two records share
//! a name and version the later one wins and keeps the earlier one's slot;
//! this is logged but not an error.

use repodex_schema::{PackageGroup, PackageRecord};

/// Groups records and, in providers mode, numbers every version.
#[derive(Debug, Clone, Copy, Default)]
pub struct PackageIndexer {
    assign_uids: bool,
}

impl PackageIndexer {
    /// An indexer that only groups records.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable or disable the uid pass.
    pub fn with_uids(mut self, assign_uids: bool) -> Self {
        self.assign_uids = assign_uids;
        self
    }

    /// Group `records` by name and version, then assign uids if enabled.
    pub fn index<I>(&self, records: I) -> PackageGroup
    where
        I: IntoIterator<Item = PackageRecord>,
    {
        let mut packages = group_records(records);
        if self.assign_uids {
            let assigned = assign_uids(&mut packages);
            tracing::debug!("Assigned {assigned} version uids");
        }
        packages
    }
}

/// Group records by name, then by pretty version (last write wins).
pub fn group_records<I>(records: I) -> PackageGroup
where
    I: IntoIterator<Item = PackageRecord>,
{
    let mut packages = PackageGroup::new();
    for record in records {
        let name = record.name().to_string();
        let version = record.pretty_version().to_string();
        let versions = packages.entry(name.clone()).or_default();
        if versions.insert(version.clone(), record).is_some() {
            tracing::warn!(
                package = %name,
                version = %version,
                "Duplicate package version, keeping the last record"
            );
        }
    }
    packages
}

/// Number every version `1, 2, 3, …` in name order, then version order.
///
/// Returns the number of uids assigned.
pub fn assign_uids(packages: &mut PackageGroup) -> u64 {
    let mut next = 1;
    for versions in packages.values_mut() {
        for record in versions.values_mut() {
            record.assign_uid(next);
            next += 1;
        }
    }
    next - 1
}
