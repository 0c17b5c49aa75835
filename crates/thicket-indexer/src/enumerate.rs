//! Source tree enumeration

use anyhow::{Context, Result};
use globset::{Glob, GlobSet, GlobSetBuilder};
use ignore::WalkBuilder;
use std::path::Path;
use thicket_core::{Config, SourceFile};

fn exclude_set(patterns: &[String]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        let glob = Glob::new(pattern).with_context(|| format!("invalid exclude glob '{}'", pattern))?;
        builder.add(glob);
    }
    Ok(builder.build()?)
}

/// Every regular file under the configured source root, as sorted
/// project-relative paths. Hidden entries and `exclude` matches are skipped.
pub fn enumerate(project_dir: &Path, config: &Config) -> Result<Vec<SourceFile>> {
    let root = project_dir.join(config.root());
    if !root.is_dir() {
        anyhow::bail!("source root {} is not a directory", root.display());
    }
    let excludes = exclude_set(&config.exclude)?;

    let mut walker = WalkBuilder::new(&root);
    walker
        .standard_filters(false)
        .hidden(true)
        .follow_links(false)
        .sort_by_file_name(|a, b| a.cmp(b));

    let mut files = Vec::new();
    for entry in walker.build() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                tracing::warn!("Cannot read entry: {}", e);
                continue;
            }
        };
        if !entry.file_type().is_some_and(|t| t.is_file()) {
            continue;
        }
        let relative = entry
            .path()
            .strip_prefix(project_dir)
            .with_context(|| format!("{} escapes the project", entry.path().display()))?;
        if excludes.is_match(relative) {
            tracing::debug!("Excluded: {}", relative.display());
            continue;
        }
        files.push(SourceFile::from_path(relative));
    }

    files.sort();
    tracing::debug!("Enumerated {} file(s) under {}", files.len(), root.display());
    Ok(files)
}
