use repodex_schema::PackageGroup;

/// Collect every package that declares `target` as replaced.
///
/// Matching is per package, not per version: if any version of a package
/// lists `target` under `replace`, all of that package's versions are
/// returned. The input is left untouched.
pub fn find_replacements(packages: &PackageGroup, target: &str) -> PackageGroup {
    packages
        .iter()
        .filter(|(_, versions)| versions.values().any(|record| record.replaces(target)))
        .map(|(name, versions)| (name.clone(), versions.clone()))
        .collect()
}
