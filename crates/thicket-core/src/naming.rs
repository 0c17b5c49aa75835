//! Build target naming

use crate::error::SynthError;
use crate::model::{Language, SourceFile};

/// Separator replacing `/` in flattened target names.
pub const FLAT_SEPARATOR: char = '-';

/// Suffix marking targets whose entry point is C++.
pub const CPP_SUFFIX: &str = "++";

/// Derives flat target names from paths under a fixed root.
#[derive(Debug, Clone)]
pub struct TargetNamer {
    root: String,
}

impl TargetNamer {
    pub fn new(root: impl AsRef<str>) -> Self {
        TargetNamer {
            root: crate::model::normalize(root.as_ref()),
        }
    }

    pub fn root(&self) -> &str {
        &self.root
    }

    /// Name for `base` living in the directory of `file`.
    ///
    /// The directory relative to the root and `base` are joined, normalized,
    /// and flattened with [`FLAT_SEPARATOR`]. C++ entry points get
    /// [`CPP_SUFFIX`] so they never collide with a C file of the same name.
    pub fn name(&self, file: &SourceFile, base: &str) -> Result<String, SynthError> {
        let relative = file.strip_root(&self.root).ok_or_else(|| SynthError::OutsideRoot {
            file: file.clone(),
            root: self.root.clone(),
        })?;
        let dir = match relative.rfind('/') {
            Some(idx) => &relative[..idx],
            None => "",
        };
        let joined = if dir.is_empty() {
            crate::model::normalize(base)
        } else {
            crate::model::normalize(&format!("{}/{}", dir, base))
        };
        let mut name = joined.replace('/', &FLAT_SEPARATOR.to_string());
        if Language::of(file) == Some(Language::Cpp) {
            name.push_str(CPP_SUFFIX);
        }
        Ok(name)
    }

    /// Name derived from the file's own stem.
    pub fn name_of(&self, file: &SourceFile) -> Result<String, SynthError> {
        self.name(file, file.stem())
    }
}
