//! Thicket Core: dependency resolution and build rule synthesis

pub mod aggregate;
pub mod classify;
pub mod config;
pub mod error;
pub mod graph;
pub mod metadata;
pub mod model;
pub mod naming;
pub mod ruleset;
pub mod synth;


#[cfg(test)]
pub mod test_utils;

pub use aggregate::{Synthesizer, default_macros, targets};
pub use classify::Classifier;
pub use config::{CONFIG_FILE, Config, DocConfig};
pub use error::{ConfigError, DirectiveError, Relation, ScanError, SynthError};
pub use graph::{DependencyResolver, to_dot};
pub use metadata::{FileMetadata, MetadataCache, MetadataSource, ScannedFile};
pub use model::{AttributeRecord, EdgeKind, FileClass, Language, Profile, SourceFile, normalize};
pub use naming::TargetNamer;
pub use ruleset::{Rule, Ruleset};
