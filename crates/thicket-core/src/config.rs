//! Project configuration (`thicket.toml`)

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Config file looked up in the project directory when none is given.
pub const CONFIG_FILE: &str = "thicket.toml";

/// Settings for one synthesis run. Every field has a default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct Config {
    /// Directory scanned for sources, relative to the project.
    pub source_root: String,
    /// Directory public headers are exported into.
    pub include_dir: String,
    /// Prefix inserted between `include_dir` and the header's relative path.
    pub namespace: String,
    /// Directory for objects, programs and documentation staging.
    pub scratch_dir: String,
    /// Header extensions, without the dot.
    pub header_extensions: Vec<String>,
    /// Compilable source extensions, without the dot.
    pub source_extensions: Vec<String>,
    /// File name suffix marking a generator script.
    pub generator_suffix: String,
    /// Command that runs a generator script and writes its output to stdout.
    pub generator_command: String,
    /// Extra include search directories, relative to the project.
    pub include_dirs: Vec<String>,
    /// Globs of project-relative paths left out of enumeration.
    pub exclude: Vec<String>,
    /// Macros added to (or overriding) the built-in flag table.
    pub macros: BTreeMap<String, String>,
    pub doc: DocConfig,
}

/// Documentation build and deployment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct DocConfig {
    /// Recipe lines of the `doc` target. Unset means stage the include tree
    /// under the scratch directory and run doxygen.
    pub commands: Option<Vec<String>>,
    /// Rendered documentation pushed by `deploy-doc`.
    pub output_dir: String,
    /// Git remote whose URL the documentation is pushed to.
    pub remote: String,
    /// Branch the documentation is force-pushed to.
    pub branch: String,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            source_root: "src".to_string(),
            include_dir: "include".to_string(),
            namespace: String::new(),
            scratch_dir: "tmp".to_string(),
            header_extensions: vec!["h".to_string(), "hpp".to_string()],
            source_extensions: vec!["c".to_string(), "cpp".to_string()],
            generator_suffix: ".gen.py".to_string(),
            generator_command: "tools/run-generator".to_string(),
            include_dirs: Vec::new(),
            exclude: Vec::new(),
            macros: BTreeMap::new(),
            doc: DocConfig::default(),
        }
    }
}

impl Default for DocConfig {
    fn default() -> Self {
        DocConfig {
            commands: None,
            output_dir: "doc/html".to_string(),
            remote: "origin".to_string(),
            branch: "gh-pages".to_string(),
        }
    }
}

impl Config {
    /// Load the config for `project_dir`.
    ///
    /// An explicit path must exist. Without one, `thicket.toml` in the project
    /// directory is used if present, otherwise the defaults.
    pub fn load(project_dir: &Path, explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let path = match explicit {
            Some(path) => path.to_path_buf(),
            None => {
                let candidate = project_dir.join(CONFIG_FILE);
                if !candidate.is_file() {
                    tracing::debug!("No {} in {}, using defaults", CONFIG_FILE, project_dir.display());
                    return Ok(Config::default());
                }
                candidate
            }
        };
        let text = std::fs::read_to_string(&path).map_err(|source| ConfigError::Read {
            path: path.clone(),
            source,
        })?;
        let config = Self::parse(&text, &path)?;
        tracing::debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Parse and validate config text. `origin` is only used in errors.
    pub fn parse(text: &str, origin: &Path) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(text).map_err(|source| ConfigError::Parse {
            path: PathBuf::from(origin),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.source_root.trim().is_empty() {
            return Err(ConfigError::Invalid("source-root must not be empty".into()));
        }
        if self.include_dir.trim().is_empty() {
            return Err(ConfigError::Invalid("include-dir must not be empty".into()));
        }
        if self.scratch_dir.trim().is_empty() {
            return Err(ConfigError::Invalid("scratch-dir must not be empty".into()));
        }
        if self.generator_suffix.is_empty() {
            return Err(ConfigError::Invalid("generator-suffix must not be empty".into()));
        }
        if let Some(ext) = self
            .header_extensions
            .iter()
            .find(|ext| self.source_extensions.contains(ext))
        {
            return Err(ConfigError::Invalid(format!(
                "extension '{}' is listed as both header and source",
                ext
            )));
        }
        if let Some(ext) = self
            .source_extensions
            .iter()
            .find(|ext| crate::model::Language::from_extension(ext).is_none())
        {
            return Err(ConfigError::Invalid(format!(
                "source extension '{}' has no known toolchain",
                ext
            )));
        }
        Ok(())
    }

    /// Namespace as a path prefix: empty, or ending in exactly one `/`.
    pub fn namespace_prefix(&self) -> String {
        let namespace = self.namespace.trim().trim_matches('/');
        if namespace.is_empty() {
            String::new()
        } else {
            format!("{}/", crate::model::normalize(namespace))
        }
    }

    /// Recipe of the `doc` target, derived from the configured directories
    /// unless set explicitly.
    pub fn doc_commands(&self) -> Vec<String> {
        if let Some(commands) = &self.doc.commands {
            return commands.clone();
        }
        let scratch = crate::model::normalize(&self.scratch_dir);
        let include = crate::model::normalize(&self.include_dir);
        vec![
            format!("rm -fr {}/doc-src", scratch),
            format!("mkdir -p {}", scratch),
            format!("cp -r {} {}/doc-src/", include, scratch),
            "doxygen".to_string(),
        ]
    }

    /// Normalized source root.
    pub fn root(&self) -> String {
        crate::model::normalize(&self.source_root)
    }

    /// Include search directories, source root first.
    pub fn search_dirs(&self) -> Vec<String> {
        let mut dirs = vec![self.root()];
        for dir in &self.include_dirs {
            let dir = crate::model::normalize(dir);
            if !dirs.contains(&dir) {
                dirs.push(dir);
            }
        }
        dirs
    }
}
