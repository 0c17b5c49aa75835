//! Test utilities for Thicket

use crate::error::{DirectiveError, ScanError};
use crate::metadata::{FileMetadata, MetadataSource};
use crate::model::{AttributeRecord, SourceFile};
use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

/// In-memory metadata source. Files not registered are inaccessible.
#[derive(Default)]
pub struct MemorySource {
    files: HashMap<SourceFile, FileMetadata>,
    unreadable: Vec<SourceFile>,
    scans: AtomicUsize,
    scanned: Mutex<Vec<SourceFile>>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a file with its include targets and explicit dependencies.
    pub fn file(mut self, path: &str, includes: &[&str], deps: &[&str]) -> Self {
        let attributes = AttributeRecord {
            explicit_deps: deps.iter().map(|d| d.to_string()).collect(),
            ..AttributeRecord::default()
        };
        self.files.insert(
            SourceFile::new(path),
            FileMetadata {
                includes: includes.iter().map(SourceFile::new).collect(),
                attributes: Ok(attributes),
            },
        );
        self
    }

    /// Register a file with a full attribute record.
    pub fn with_attributes(mut self, path: &str, includes: &[&str], attributes: AttributeRecord) -> Self {
        self.files.insert(
            SourceFile::new(path),
            FileMetadata {
                includes: includes.iter().map(SourceFile::new).collect(),
                attributes: Ok(attributes),
            },
        );
        self
    }

    /// Register a file whose directive block is malformed.
    pub fn malformed(mut self, path: &str, includes: &[&str]) -> Self {
        let file = SourceFile::new(path);
        self.files.insert(
            file.clone(),
            FileMetadata {
                includes: includes.iter().map(SourceFile::new).collect(),
                attributes: Err(DirectiveError {
                    file,
                    message: "expected a boolean".to_string(),
                }),
            },
        );
        self
    }

    /// Register a file that exists but cannot be read.
    pub fn unreadable(mut self, path: &str) -> Self {
        self.unreadable.push(SourceFile::new(path));
        self
    }

    /// Total number of scans served.
    pub fn scan_count(&self) -> usize {
        self.scans.load(Ordering::SeqCst)
    }

    /// How many times `path` was scanned.
    pub fn scans_of(&self, path: &str) -> usize {
        let file = SourceFile::new(path);
        self.scanned
            .lock()
            .map(|s| s.iter().filter(|f| **f == file).count())
            .unwrap_or(0)
    }
}

impl MetadataSource for MemorySource {
    fn scan(&self, file: &SourceFile) -> Result<Option<FileMetadata>, ScanError> {
        self.scans.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut scanned) = self.scanned.lock() {
            scanned.push(file.clone());
        }
        if self.unreadable.contains(file) {
            return Err(ScanError {
                file: file.clone(),
                source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "permission denied"),
            });
        }
        Ok(self.files.get(file).cloned())
    }
}

/// Convenience: paths as `SourceFile`s.
pub fn files(paths: &[&str]) -> Vec<SourceFile> {
    paths.iter().map(SourceFile::new).collect()
}
