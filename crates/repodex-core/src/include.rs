//! Hash-addressed include files
//!
//! An include file is `{"packages": <group>}` serialized to JSON. When its
//! filename template carries `%hash%`, the content hash becomes part of the
//! name, and an existing file under that name is trusted to hold the same
//! content (it is not read back). Writing itself is left to the caller, see
//! [`crate::io::persist_include`].

use repodex_schema::{ContentHash, HashAlgorithm, IncludePayload, PackageGroup, ProviderEntry};
use serde::Serialize;
use serde_json::ser::{PrettyFormatter, Serializer};
use std::path::{Component, Path, PathBuf};

use crate::error::{BuildError, Result};
use crate::template::{FilenameTemplate, PREP_SENTINEL};

/// JSON output formatting.
///
/// Unicode and `/` are never escaped. Pretty output is indented by four
/// spaces. Every document ends with a single newline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JsonStyle {
    /// Indent the output.
    pub pretty: bool,
}

impl Default for JsonStyle {
    fn default() -> Self {
        Self { pretty: true }
    }
}

impl JsonStyle {
    /// Serialize `value` to canonical bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if `value` cannot be represented as JSON.
    pub fn encode<T: Serialize + ?Sized>(&self, value: &T) -> Result<Vec<u8>, serde_json::Error> {
        let mut out = Vec::with_capacity(4096);
        if self.pretty {
            let formatter = PrettyFormatter::with_indent(b"    ");
            let mut ser = Serializer::with_formatter(&mut out, formatter);
            value.serialize(&mut ser)?;
        } else {
            let mut ser = Serializer::new(&mut out);
            value.serialize(&mut ser)?;
        }
        out.push(b'\n');
        Ok(out)
    }
}

/// Outcome of preparing one include file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncludeDescriptor {
    /// Algorithm used for `hash`.
    pub algorithm: HashAlgorithm,
    /// Hex digest of `content`.
    pub hash: ContentHash,
    /// Serialized file content, trailing newline included.
    pub content: Vec<u8>,
    /// Filename relative to the output directory, hash substituted.
    pub filename: String,
    /// Where to write `content`, or `None` if the hash-named file already exists.
    pub target: Option<PathBuf>,
}

impl IncludeDescriptor {
    /// Whether `content` still has to be written.
    pub fn needs_write(&self) -> bool {
        self.target.is_some()
    }

    /// The root document reference to this file.
    pub fn provider_entry(&self) -> ProviderEntry {
        ProviderEntry {
            algorithm: self.algorithm,
            hash: self.hash.clone(),
        }
    }
}

/// Serializes package groups into include files under an output directory.
#[derive(Debug, Clone)]
pub struct IncludeFileWriter {
    output_dir: PathBuf,
    style: JsonStyle,
}

impl IncludeFileWriter {
    /// Create a writer rooted at `output_dir`.
    pub fn new(output_dir: impl Into<PathBuf>, style: JsonStyle) -> Self {
        Self {
            output_dir: output_dir.into(),
            style,
        }
    }

    /// The JSON formatting applied to include files.
    pub fn style(&self) -> JsonStyle {
        self.style
    }

    /// Serialize `packages`, hash the bytes and resolve the final filename.
    ///
    /// With a `%hash%` template the descriptor's `target` is `None` when the
    /// hash-named file is already on disk. Without one, the filename is the
    /// template itself and a write is always requested.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError::Serialization`] if the payload cannot be encoded
    /// and [`BuildError::Io`] if the existence check fails.
    /// [`BuildError::UnsafeFilename`] is returned, before touching the disk,
    /// if the expanded filename contains `..` segments.
    pub fn write(
        &self,
        packages: &PackageGroup,
        template: &FilenameTemplate,
        algorithm: HashAlgorithm,
    ) -> Result<IncludeDescriptor> {
        let mut filename = template.expand(None, Some(PREP_SENTINEL));
        let mut target = Some(self.resolve(&filename)?);

        let content = self.style.encode(&IncludePayload { packages })?;
        let hash = algorithm.digest(&content);

        if template.has_hash() {
            filename = template.expand(None, Some(hash.as_str()));
            let path = self.resolve(&filename)?;
            target = if exists(&path)? {
                tracing::debug!("Include {filename} already present, skipping");
                None
            } else {
                Some(path)
            };
        }

        Ok(IncludeDescriptor {
            algorithm,
            hash,
            content,
            filename,
            target,
        })
    }

    /// Join `filename` to the output directory. A leading `/` is relative to
    /// the output directory; `..` and other root components are rejected.
    fn resolve(&self, filename: &str) -> Result<PathBuf> {
        let relative = Path::new(filename.trim_start_matches('/'));
        let contained = relative
            .components()
            .all(|c| matches!(c, Component::Normal(_) | Component::CurDir));
        if !contained {
            return Err(BuildError::UnsafeFilename(filename.to_string()));
        }
        Ok(self.output_dir.join(relative))
    }
}

fn exists(path: &Path) -> Result<bool> {
    path.try_exists().map_err(|e| BuildError::io(path, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use repodex_schema::PackageRecord;
    use serde_json::json;
    use tempfile::tempdir;

    fn packages(value: serde_json::Value) -> PackageGroup {
        let records: Vec<PackageRecord> = serde_json::from_value(value).unwrap();
        crate::indexer::group_records(records)
    }

    fn sample() -> PackageGroup {
        packages(json!([
            {"name": "acme/log", "version": "1.0.0", "homepage": "https://acme.test/log", "description": "Journal – ünïcode"}
        ]))
    }

    #[test]
    fn test_pretty_encoding_is_four_space_and_unescaped() {
        let bytes = JsonStyle { pretty: true }.encode(&json!({"a": {"b": "x/y é"}})).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        assert_eq!(text, "{\n    \"a\": {\n        \"b\": \"x/y é\"\n    }\n}\n");
    }

    #[test]
    fn test_compact_encoding() {
        let bytes = JsonStyle { pretty: false }.encode(&json!({"a": [1, 2]})).unwrap();
        assert_eq!(bytes, b"{\"a\":[1,2]}\n");
    }

    #[test]
    fn test_hash_matches_content() {
        let dir = tempdir().unwrap();
        let writer = IncludeFileWriter::new(dir.path(), JsonStyle::default());
        let template = FilenameTemplate::new("include/all$%hash%.json");

        let desc = writer.write(&sample(), &template, HashAlgorithm::Sha1).unwrap();
        assert_eq!(desc.algorithm, HashAlgorithm::Sha1);
        assert_eq!(desc.hash, HashAlgorithm::Sha1.digest(&desc.content));
        assert_eq!(desc.hash.as_str().len(), 40);
        assert_eq!(desc.filename, format!("include/all${}.json", desc.hash));
        assert_eq!(
            desc.target.as_deref(),
            Some(dir.path().join(&desc.filename).as_path())
        );
        assert!(desc.content.ends_with(b"}\n"));

        let parsed: serde_json::Value = serde_json::from_slice(&desc.content).unwrap();
        assert_eq!(
            parsed["packages"]["acme/log"]["1.0.0"]["homepage"],
            json!("https://acme.test/log")
        );
    }

    #[test]
    fn test_existing_hash_file_is_trusted() {
        let dir = tempdir().unwrap();
        let writer = IncludeFileWriter::new(dir.path(), JsonStyle::default());
        let template = FilenameTemplate::new("include/all$%hash%.json");

        let first = writer.write(&sample(), &template, HashAlgorithm::Sha1).unwrap();
        let path = first.target.clone().unwrap();
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, b"not the same bytes at all").unwrap();

        let second = writer.write(&sample(), &template, HashAlgorithm::Sha1).unwrap();
        assert!(!second.needs_write());
        assert_eq!(second.hash, first.hash);
        assert_eq!(second.filename, first.filename);
        assert_eq!(second.content, first.content);
    }

    #[test]
    fn test_template_without_hash_always_writes() {
        let dir = tempdir().unwrap();
        let writer = IncludeFileWriter::new(dir.path(), JsonStyle::default());
        let template = FilenameTemplate::new("all.json");
        std::fs::write(dir.path().join("all.json"), b"{}\n").unwrap();

        let desc = writer.write(&sample(), &template, HashAlgorithm::Sha1).unwrap();
        assert_eq!(desc.filename, "all.json");
        assert_eq!(desc.target, Some(dir.path().join("all.json")));
    }

    #[test]
    fn test_leading_slash_is_relative_to_output_dir() {
        let dir = tempdir().unwrap();
        let writer = IncludeFileWriter::new(dir.path(), JsonStyle::default());
        let template = FilenameTemplate::new("/p/acme/log$%hash%.json");

        let desc = writer.write(&sample(), &template, HashAlgorithm::Sha256).unwrap();
        assert_eq!(desc.hash.as_str().len(), 64);
        let target = desc.target.unwrap();
        assert!(target.starts_with(dir.path()));
        assert!(target.ends_with(format!("p/acme/log${}.json", desc.hash)));
    }

    #[test]
    fn test_parent_segments_are_rejected() {
        let dir = tempdir().unwrap();
        let writer = IncludeFileWriter::new(dir.path().join("out"), JsonStyle::default());

        for raw in ["p/../../escape$%hash%.json", "/../all.json", "include/../../x.json"] {
            let err = writer
                .write(&sample(), &FilenameTemplate::new(raw), HashAlgorithm::Sha256)
                .unwrap_err();
            assert!(matches!(err, BuildError::UnsafeFilename(ref f) if f.contains("..")));
        }
        assert!(!dir.path().join("out").exists());
    }

    #[test]
    fn test_existence_check_error_propagates() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("include"), b"a file, not a directory").unwrap();
        let writer = IncludeFileWriter::new(dir.path(), JsonStyle::default());

        let err = writer
            .write(
                &sample(),
                &FilenameTemplate::new("include/all$%hash%.json"),
                HashAlgorithm::Sha1,
            )
            .unwrap_err();
        let (path, source) = match err {
            BuildError::Io { path, source } => (path, source),
            other => panic!("expected an IO error, got {other:?}"),
        };
        assert!(path.starts_with(dir.path().join("include")));
        assert!(path.to_string_lossy().contains("all$"));
        assert_eq!(source.kind(), std::io::ErrorKind::NotADirectory);
    }

    #[test]
    fn test_pretty_print_changes_hash() {
        let dir = tempdir().unwrap();
        let template = FilenameTemplate::new("%hash%.json");
        let pretty = IncludeFileWriter::new(dir.path(), JsonStyle { pretty: true })
            .write(&sample(), &template, HashAlgorithm::Sha1)
            .unwrap();
        let compact = IncludeFileWriter::new(dir.path(), JsonStyle { pretty: false })
            .write(&sample(), &template, HashAlgorithm::Sha1)
            .unwrap();
        assert_ne!(pretty.hash, compact.hash);
    }

    #[test]
    fn test_provider_entry() {
        let dir = tempdir().unwrap();
        let writer = IncludeFileWriter::new(dir.path(), JsonStyle::default());
        let desc = writer
            .write(&sample(), &FilenameTemplate::new("%hash%"), HashAlgorithm::Sha256)
            .unwrap();
        let entry = desc.provider_entry();
        assert_eq!(
            serde_json::to_value(&entry).unwrap(),
            json!({"sha256": desc.hash.as_str()})
        );
    }
}
