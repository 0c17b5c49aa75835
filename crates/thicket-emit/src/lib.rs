//! Build description emission
//!
//! Serializes a [`Ruleset`] into a Makefile or JSON document and persists it.
//! Files are written to a temporary sibling and renamed into place, so a
//! failed run never leaves a partial build description behind.

pub mod makefile;


use std::io::Write;
use std::path::{Path, PathBuf};
use thicket_core::Ruleset;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EmitError {
    #[error("multi-line text in '{context}' cannot be emitted")]
    Multiline { context: String },

    #[error("failed to format output: {0}")]
    Format(#[from] std::fmt::Error),

    #[error("failed to serialize ruleset: {0}")]
    Json(#[from] serde_json::Error),

    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Format {
    #[default]
    Make,
    Json,
}

impl std::str::FromStr for Format {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "make" | "makefile" => Ok(Format::Make),
            "json" => Ok(Format::Json),
            other => Err(format!("unknown format '{}' (expected make or json)", other)),
        }
    }
}

pub fn render(ruleset: &Ruleset, format: Format) -> Result<String, EmitError> {
    match format {
        Format::Make => makefile::render(ruleset),
        Format::Json => {
            let mut text = serde_json::to_string_pretty(ruleset)?;
            text.push('\n');
            Ok(text)
        }
    }
}

/// Render and atomically write the build description to `path`.
///
/// The text goes to a uniquely named temporary file in the same directory,
/// which is then persisted over `path`. On failure the temporary file is
/// removed when dropped and `path` is untouched.
pub fn save(ruleset: &Ruleset, path: &Path, format: Format) -> Result<(), EmitError> {
    let text = render(ruleset, format)?;
    let write_failed = |source: std::io::Error| EmitError::Write {
        path: path.to_path_buf(),
        source,
    };

    let parent = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    let mut temp = tempfile::Builder::new()
        .prefix(".tmp-")
        .tempfile_in(parent)
        .map_err(write_failed)?;
    temp.write_all(text.as_bytes()).map_err(write_failed)?;
    temp.persist(path).map_err(|e| write_failed(e.error))?;

    tracing::info!("Wrote {} rule(s) to {}", ruleset.len(), path.display());
    Ok(())
}
