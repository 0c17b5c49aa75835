//! Metadata access and the run-scoped scan cache

use crate::error::{DirectiveError, ScanError};
use crate::model::{AttributeRecord, SourceFile};
use dashmap::DashMap;
use std::sync::Arc;

/// What one scan of a file yields.
#[derive(Debug, Clone, PartialEq)]
pub struct FileMetadata {
    /// Include targets, already resolved to project-relative paths where possible.
    pub includes: Vec<SourceFile>,
    /// The directive block, or why it could not be read.
    pub attributes: Result<AttributeRecord, DirectiveError>,
}

/// Source of per-file metadata. Implemented over the real file system by the
/// indexer, and in memory by tests.
pub trait MetadataSource: Send + Sync {
    /// Scan one file.
    ///
    /// Returns `Ok(None)` when the file does not exist (a system header or a
    /// not-yet-generated file); such files are opaque leaves. Returns an error
    /// when the file exists but cannot be read.
    fn scan(&self, file: &SourceFile) -> Result<Option<FileMetadata>, ScanError>;
}

/// Direct edges of one file, as cached for the rest of the run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScannedFile {
    pub includes: Vec<SourceFile>,
    /// Explicit dependencies resolved against the declaring file's directory.
    pub explicit_deps: Vec<SourceFile>,
    pub attributes: Option<Result<AttributeRecord, DirectiveError>>,
}

impl ScannedFile {
    /// Whether the file was found at all.
    pub fn is_opaque(&self) -> bool {
        self.attributes.is_none()
    }

    fn from_metadata(file: &SourceFile, metadata: Option<FileMetadata>) -> Self {
        let Some(metadata) = metadata else {
            tracing::debug!("{} is inaccessible, treating as a leaf", file);
            return ScannedFile::default();
        };
        let explicit_deps = match &metadata.attributes {
            Ok(attrs) => attrs
                .explicit_deps
                .iter()
                .map(|dep| file.sibling(dep))
                .collect(),
            Err(e) => {
                tracing::warn!("cannot read dependencies of {} ({})", file, e.message);
                Vec::new()
            }
        };
        ScannedFile {
            includes: metadata.includes,
            explicit_deps,
            attributes: Some(metadata.attributes),
        }
    }
}

/// Memoizes the direct edges of every file scanned during one run.
///
/// Entries are written at most once and never change afterwards, so the cache
/// may be filled from several threads. Two threads racing on the same file
/// both scan it and the first insert wins.
pub struct MetadataCache {
    source: Arc<dyn MetadataSource>,
    entries: DashMap<SourceFile, Arc<ScannedFile>>,
}

impl MetadataCache {
    pub fn new(source: Arc<dyn MetadataSource>) -> Self {
        MetadataCache {
            source,
            entries: DashMap::new(),
        }
    }

    /// Direct edges of `file`, scanning it on first use.
    pub fn get(&self, file: &SourceFile) -> Result<Arc<ScannedFile>, ScanError> {
        if let Some(entry) = self.entries.get(file) {
            return Ok(Arc::clone(entry.value()));
        }
        let metadata = self.source.scan(file)?;
        let scanned = Arc::new(ScannedFile::from_metadata(file, metadata));
        let entry = self
            .entries
            .entry(file.clone())
            .or_insert_with(|| scanned);
        Ok(Arc::clone(entry.value()))
    }

    /// Number of files scanned so far.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, file: &SourceFile) -> bool {
        self.entries.contains_key(file)
    }
}

impl std::fmt::Debug for MetadataCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MetadataCache")
            .field("entries", &self.entries.len())
            .finish()
    }
}
