//! File classification by name and extension

use crate::config::Config;
use crate::error::ConfigError;
use crate::model::{FileClass, Language, SourceFile};
use regex::Regex;

/// Closed set of rules mapping a file to its [`FileClass`].
///
/// Rules are checked in order: generator suffix, header extension, source
/// extension (with the `_test` / `_bench` entry-point markers), otherwise
/// unclassified.
#[derive(Debug, Clone)]
pub struct Classifier {
    generator: Regex,
    entry_point: Regex,
    header_extensions: Vec<String>,
    source_extensions: Vec<String>,
}

impl Classifier {
    pub fn new(config: &Config) -> Result<Self, ConfigError> {
        let pattern = format!("^(.+?){}$", regex::escape(&config.generator_suffix));
        let generator = Regex::new(&pattern).map_err(|source| ConfigError::Pattern {
            pattern: pattern.clone(),
            source,
        })?;
        let pattern = "^(.+?)_(test|bench)$";
        let entry_point = Regex::new(pattern).map_err(|source| ConfigError::Pattern {
            pattern: pattern.to_string(),
            source,
        })?;
        Ok(Classifier {
            generator,
            entry_point,
            header_extensions: config.header_extensions.clone(),
            source_extensions: config.source_extensions.clone(),
        })
    }

    pub fn classify(&self, file: &SourceFile) -> FileClass {
        if let Some(caps) = self.generator.captures(file.file_name()) {
            let output = file.sibling(&caps[1]);
            return FileClass::Generator { output };
        }

        let Some(ext) = file.extension() else {
            return FileClass::Unclassified;
        };
        if self.header_extensions.iter().any(|h| h == ext) {
            return FileClass::Header;
        }
        if !self.source_extensions.iter().any(|s| s == ext) {
            return FileClass::Unclassified;
        }
        let Some(language) = Language::from_extension(ext) else {
            return FileClass::Unclassified;
        };

        match self.entry_point.captures(file.stem()) {
            Some(caps) => {
                let name = caps[1].to_string();
                if &caps[2] == "test" {
                    FileClass::Test { name, language }
                } else {
                    FileClass::Benchmark { name, language }
                }
            }
            None => FileClass::PlainSource { language },
        }
    }

    /// Classify every file once, keeping the input order.
    pub fn classify_all(&self, files: &[SourceFile]) -> Vec<(SourceFile, FileClass)> {
        files
            .iter()
            .map(|file| (file.clone(), self.classify(file)))
            .collect()
    }
}
