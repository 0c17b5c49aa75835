//! Rules that export public headers into the installable tree

use crate::config::Config;
use crate::error::{Relation, ScanError, SynthError};
use crate::metadata::MetadataCache;
use crate::model::{FileClass, SourceFile, normalize};
use crate::ruleset::Rule;
use std::collections::BTreeSet;

/// Copy rules for public headers, plus the files they include.
#[derive(Debug, Default)]
pub struct HeaderExports {
    pub rules: Vec<Rule>,
    /// Existing files included by exported headers. Listed as prerequisites
    /// of the export step so that editing one triggers a re-export.
    pub plain_files: BTreeSet<SourceFile>,
}

/// Where `header` lands in the export tree.
pub fn export_path(header: &SourceFile, config: &Config) -> Result<String, SynthError> {
    let root = config.root();
    let relative = header.strip_root(&root).ok_or_else(|| SynthError::OutsideRoot {
        file: header.clone(),
        root: root.clone(),
    })?;
    Ok(normalize(&format!(
        "{}/{}{}",
        config.include_dir,
        config.namespace_prefix(),
        relative
    )))
}

pub fn header_export_rules(
    files: &[(SourceFile, FileClass)],
    cache: &MetadataCache,
    config: &Config,
) -> Result<HeaderExports, SynthError> {
    let mut exports = HeaderExports::default();

    for (file, class) in files {
        if *class != FileClass::Header {
            continue;
        }
        let scanned = cache.get(file).map_err(|source| scan_failed(file, source))?;
        let public = match &scanned.attributes {
            Some(Ok(attrs)) => attrs.public,
            Some(Err(e)) => {
                return Err(SynthError::Directive {
                    relation: Relation::HeaderExport,
                    entry: file.clone(),
                    source: e.clone(),
                });
            }
            None => false,
        };
        if !public {
            continue;
        }

        let out = export_path(file, config)?;
        tracing::debug!("Exporting {} as {}", file, out);
        exports.rules.push(
            Rule::command(
                out,
                vec![file.to_string()],
                vec!["@mkdir -p $(@D)".to_string(), format!("cp {} $@", file)],
            )
            .with_origin(file.to_string()),
        );

        for include in &scanned.includes {
            if !cache.get(include).map_err(|source| scan_failed(file, source))?.is_opaque() {
                exports.plain_files.insert(include.clone());
            }
        }
    }
    Ok(exports)
}

fn scan_failed(file: &SourceFile, source: ScanError) -> SynthError {
    SynthError::Scan {
        relation: Relation::HeaderExport,
        entry: file.clone(),
        source,
    }
}
