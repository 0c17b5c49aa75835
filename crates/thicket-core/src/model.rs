//! Core data structures for the source tree

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// A file in the scanned tree, identified by its normalized project-relative path.
///
/// Paths always use `/` as the separator and never contain `.` or interior
/// `..` segments, so two spellings of the same file compare equal. Ordering is
/// plain lexicographic order of the normalized string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SourceFile(String);

impl SourceFile {
    /// Build a source file from any path spelling, normalizing it lexically.
    pub fn new(path: impl AsRef<str>) -> Self {
        SourceFile(normalize(path.as_ref()))
    }

    /// Build a source file from a filesystem path relative to the project.
    pub fn from_path(path: &Path) -> Self {
        Self::new(path.to_string_lossy().replace('\\', "/"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The directory containing this file (`""` for top-level files).
    pub fn parent(&self) -> &str {
        match self.0.rfind('/') {
            Some(idx) => &self.0[..idx],
            None => "",
        }
    }

    /// The final path segment.
    pub fn file_name(&self) -> &str {
        match self.0.rfind('/') {
            Some(idx) => &self.0[idx + 1..],
            None => &self.0,
        }
    }

    /// The extension without the leading dot, if any.
    pub fn extension(&self) -> Option<&str> {
        let name = self.file_name();
        match name.rfind('.') {
            Some(0) | None => None,
            Some(idx) => Some(&name[idx + 1..]),
        }
    }

    /// The file name without its extension.
    pub fn stem(&self) -> &str {
        let name = self.file_name();
        match name.rfind('.') {
            Some(0) | None => name,
            Some(idx) => &name[..idx],
        }
    }

    /// Resolve `relative` against this file's directory.
    pub fn sibling(&self, relative: &str) -> SourceFile {
        if relative.starts_with('/') {
            return SourceFile::new(relative);
        }
        let parent = self.parent();
        if parent.is_empty() {
            SourceFile::new(relative)
        } else {
            SourceFile::new(format!("{}/{}", parent, relative))
        }
    }

    /// Path of this file relative to `root`, or `None` when it lies outside.
    pub fn strip_root(&self, root: &str) -> Option<&str> {
        let root = root.trim_end_matches('/');
        if root.is_empty() || root == "." {
            return Some(&self.0);
        }
        self.0
            .strip_prefix(root)
            .and_then(|rest| rest.strip_prefix('/'))
    }

    /// Location of this file on disk under the project directory.
    pub fn on_disk(&self, project_dir: &Path) -> PathBuf {
        project_dir.join(&self.0)
    }
}

impl fmt::Display for SourceFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SourceFile {
    fn from(path: &str) -> Self {
        SourceFile::new(path)
    }
}

/// Lexically normalize a `/`-separated path: drop empty and `.` segments and
/// fold `name/..` pairs. Leading `..` segments that cannot be folded are kept.
pub fn normalize(path: &str) -> String {
    let absolute = path.starts_with('/');
    let mut parts: Vec<&str> = Vec::new();
    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => match parts.last() {
                Some(&last) if last != ".." => {
                    parts.pop();
                }
                _ if absolute => {}
                _ => parts.push(".."),
            },
            other => parts.push(other),
        }
    }
    let joined = parts.join("/");
    if absolute {
        format!("/{}", joined)
    } else if joined.is_empty() {
        ".".to_string()
    } else {
        joined
    }
}

/// Source languages with distinct toolchains.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Language {
    C,
    Cpp,
}

impl Language {
    /// Detect language from a source extension. Headers map to `None`.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext {
            "c" => Some(Language::C),
            "cpp" | "cc" | "cxx" | "c++" => Some(Language::Cpp),
            _ => None,
        }
    }

    pub fn of(file: &SourceFile) -> Option<Self> {
        file.extension().and_then(Self::from_extension)
    }

    /// Compiler macro used for this language.
    pub fn compiler(&self) -> &'static str {
        match self {
            Language::C => "$(CC)",
            Language::Cpp => "$(CXX)",
        }
    }

    /// Suffix of the per-profile language flag macro (`CFLAGS` / `CXXFLAGS`).
    pub fn flags_suffix(&self) -> &'static str {
        match self {
            Language::C => "CFLAGS",
            Language::Cpp => "CXXFLAGS",
        }
    }
}

/// Which build profile an entry point is compiled under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Profile {
    Test,
    Bench,
}

impl Profile {
    /// Lowercase name used in target names and scratch paths.
    pub fn name(&self) -> &'static str {
        match self {
            Profile::Test => "test",
            Profile::Bench => "bench",
        }
    }

    /// Prefix of the profile's flag macros (`TEST` / `BENCH`).
    pub fn macro_prefix(&self) -> &'static str {
        match self {
            Profile::Test => "TEST",
            Profile::Bench => "BENCH",
        }
    }
}

/// Classification of a file, computed once per file.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FileClass {
    /// A generator script; `output` is the file it produces.
    Generator { output: SourceFile },
    /// A test entry point; `name` is the base name without the marker.
    Test { name: String, language: Language },
    /// A benchmark entry point.
    Benchmark { name: String, language: Language },
    /// A compilable source file that is not an entry point.
    PlainSource { language: Language },
    Header,
    Unclassified,
}

impl FileClass {
    /// Profile and base name for test and benchmark entry points.
    pub fn entry_point(&self) -> Option<(Profile, &str, Language)> {
        match self {
            FileClass::Test { name, language } => Some((Profile::Test, name, *language)),
            FileClass::Benchmark { name, language } => Some((Profile::Bench, name, *language)),
            _ => None,
        }
    }
}

/// Per-file metadata read from the embedded directive block.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct AttributeRecord {
    /// Whether a header is exported into the installable tree.
    pub public: bool,
    /// Extra translation units needed at link time, relative to the file.
    #[serde(rename = "deps")]
    pub explicit_deps: Vec<String>,
    /// Inputs of a generator script, relative to the script.
    pub generator_deps: Vec<String>,
}

/// The two kinds of edge in the dependency graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EdgeKind {
    /// Textual inclusion; traversed but not linked.
    Include,
    /// Declared extra translation unit; linked.
    Explicit,
}

impl fmt::Display for EdgeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EdgeKind::Include => f.write_str("include"),
            EdgeKind::Explicit => f.write_str("explicit"),
        }
    }
}
