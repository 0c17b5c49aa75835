//! File-system backed metadata source

use crate::directive::parse_directive;
use crate::includes::{IncludeDirective, scan_includes};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use thicket_core::{Config, DirectiveError, FileMetadata, MetadataSource, ScanError, SourceFile};

/// Reads files under a project directory, extracting include edges and the
/// directive block.
#[derive(Debug, Clone)]
pub struct DirectiveScanner {
    project_dir: PathBuf,
    search_dirs: Vec<String>,
    /// Extensions whose `#include` lines are meaningful.
    include_extensions: Vec<String>,
}

impl DirectiveScanner {
    pub fn new(project_dir: impl AsRef<Path>, config: &Config) -> Self {
        let include_extensions = config
            .header_extensions
            .iter()
            .chain(&config.source_extensions)
            .cloned()
            .collect();
        DirectiveScanner {
            project_dir: project_dir.as_ref().to_path_buf(),
            search_dirs: config.search_dirs(),
            include_extensions,
        }
    }

    pub fn project_dir(&self) -> &Path {
        &self.project_dir
    }

    fn exists(&self, file: &SourceFile) -> bool {
        file.on_disk(&self.project_dir).is_file()
    }

    /// Resolve an include target: quoted names next to the including file
    /// first, then each search directory.
    ///
    /// Unresolved quoted names keep the including file's directory, so a
    /// header that is generated later still matches its generator's output.
    /// Unresolved angled names become `<name>`, which never aliases a
    /// project file. Either way the result is an opaque leaf.
    pub fn resolve(&self, from: &SourceFile, include: &IncludeDirective) -> SourceFile {
        let sibling = (!include.angled).then(|| from.sibling(&include.name));
        if let Some(sibling) = &sibling {
            if self.exists(sibling) {
                return sibling.clone();
            }
        }
        for dir in &self.search_dirs {
            let candidate = SourceFile::new(format!("{}/{}", dir, include.name));
            if self.exists(&candidate) {
                return candidate;
            }
        }
        tracing::debug!(
            "{}:{}: include {} not found, treating as opaque",
            from,
            include.line,
            include.name
        );
        sibling.unwrap_or_else(|| system_header(&include.name))
    }
}

/// Key for an angled include found in no search directory.
pub fn system_header(name: &str) -> SourceFile {
    SourceFile::new(format!("<{}>", name))
}

fn is_system_header(file: &SourceFile) -> bool {
    file.as_str().starts_with('<')
}

impl MetadataSource for DirectiveScanner {
    fn scan(&self, file: &SourceFile) -> Result<Option<FileMetadata>, ScanError> {
        if is_system_header(file) {
            return Ok(None);
        }
        let path = file.on_disk(&self.project_dir);
        let bytes = match std::fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(ScanError {
                    file: file.clone(),
                    source,
                });
            }
        };
        let text = String::from_utf8_lossy(&bytes);

        let scans_includes = file
            .extension()
            .is_some_and(|ext| self.include_extensions.iter().any(|e| e == ext));
        let includes = if scans_includes {
            scan_includes(&text)
                .iter()
                .map(|include| self.resolve(file, include))
                .collect()
        } else {
            Vec::new()
        };

        let attributes = parse_directive(&text).map_err(|e| DirectiveError {
            file: file.clone(),
            message: e.to_string(),
        });

        tracing::debug!(
            "Scanned {}: {} include(s), directive {}",
            file,
            includes.len(),
            if attributes.is_ok() { "ok" } else { "malformed" }
        );
        Ok(Some(FileMetadata {
            includes,
            attributes,
        }))
    }
}
