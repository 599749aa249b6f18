//! Shared types for repodex: dumped package records, their groupings, hash
//! algorithms and the root repository document.

/// Hash algorithms and hex content digests.
pub mod hash;
/// Root document and include payload shapes.
pub mod index;
/// Dumped package records and their groupings.
pub mod record;

// Re-exports
pub use hash::*;
pub use index::{IncludePayload, ProviderEntry, RepoIndex};
pub use record::*;

/// Attribute key holding the run-scoped version identifier.
pub const UID_KEY: &str = "uid";

/// Attribute key holding a record's `replace` declarations.
pub const REPLACE_KEY: &str = "replace";
