//! Rules that run generator scripts

use crate::config::Config;
use crate::error::{Relation, SynthError};
use crate::metadata::MetadataCache;
use crate::model::{FileClass, SourceFile};
use crate::ruleset::Rule;

/// One rule per generator script.
///
/// The generator writes to `$@.tmp` and the result is renamed over the
/// output only after the generator exits successfully, so a failed run never
/// leaves a partial output behind.
pub fn generator_rules(
    files: &[(SourceFile, FileClass)],
    cache: &MetadataCache,
    config: &Config,
) -> Result<Vec<Rule>, SynthError> {
    let mut rules = Vec::new();
    for (file, class) in files {
        let FileClass::Generator { output } = class else {
            continue;
        };

        let scanned = cache.get(file).map_err(|source| SynthError::Scan {
            relation: Relation::Generator,
            entry: file.clone(),
            source,
        })?;
        let deps = match &scanned.attributes {
            Some(Ok(attrs)) => attrs.generator_deps.clone(),
            Some(Err(e)) => {
                return Err(SynthError::Directive {
                    relation: Relation::Generator,
                    entry: file.clone(),
                    source: e.clone(),
                });
            }
            None => Vec::new(),
        };

        let mut inputs = vec![file.to_string()];
        inputs.extend(deps.iter().map(|dep| file.sibling(dep).to_string()));

        tracing::debug!("Generator {} -> {} ({} input(s))", file, output, inputs.len());
        rules.push(
            Rule::command(
                output.to_string(),
                inputs,
                vec![
                    format!("{} >$@.tmp {}", config.generator_command, file),
                    "mv $@.tmp $@".to_string(),
                ],
            )
            .with_origin(file.to_string()),
        );
    }
    Ok(rules)
}
