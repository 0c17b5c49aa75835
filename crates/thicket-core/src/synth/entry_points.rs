//! Build and run rules for test and benchmark entry points

use crate::config::Config;
use crate::error::SynthError;
use crate::graph::DependencyResolver;
use crate::model::{FileClass, Language, Profile, SourceFile, normalize};
use crate::naming::TargetNamer;
use crate::ruleset::Rule;

/// Libraries linked into every program.
pub const LINK_LIBRARIES: &str = "$(LIBS)";

/// Everything synthesized for one entry point.
#[derive(Debug, Clone)]
pub struct EntryPointRules {
    pub entry: SourceFile,
    pub profile: Profile,
    /// Flat target name, e.g. `math-add` or `math-add++`.
    pub name: String,
    /// Path of the linked program.
    pub program: String,
    /// Phony run target, for tests only.
    pub run: Option<String>,
    /// The files compiled and linked into the program.
    pub link_set: Vec<SourceFile>,
    /// Compile rules, the link rule, and the run rule if any.
    pub rules: Vec<Rule>,
}

/// Object file for `source` compiled under `profile`.
pub fn object_path(source: &SourceFile, profile: Profile, config: &Config) -> String {
    normalize(&format!(
        "{}/{}/{}.o",
        config.scratch_dir,
        profile.name(),
        source
    ))
}

/// Compile rule for one link-set member. Flags follow the member's own
/// language, not the entry point's.
pub fn compile_rule(source: &SourceFile, profile: Profile, config: &Config) -> Rule {
    let language = Language::of(source).unwrap_or(Language::C);
    let prefix = profile.macro_prefix();
    Rule::command(
        object_path(source, profile, config),
        vec![source.to_string()],
        vec![
            "@mkdir -p $(@D)".to_string(),
            format!(
                "{} -c -o $@ $(GLOBALCPPFLAGS) $(INCLUDEFLAGS) $({}CPPFLAGS) $({}{}) $<",
                language.compiler(),
                prefix,
                prefix,
                language.flags_suffix()
            ),
        ],
    )
    .with_origin(source.to_string())
}

pub fn entry_point_rules(
    files: &[(SourceFile, FileClass)],
    resolver: &DependencyResolver,
    namer: &TargetNamer,
    config: &Config,
) -> Result<Vec<EntryPointRules>, SynthError> {
    let entries: Vec<(&SourceFile, Profile, &str)> = files
        .iter()
        .filter_map(|(file, class)| {
            class
                .entry_point()
                .map(|(profile, base, _)| (file, profile, base))
        })
        .collect();
    let entry_files: Vec<SourceFile> = entries.iter().map(|(f, _, _)| (*f).clone()).collect();
    let link_sets = resolver.closures(&entry_files)?;

    let mut out = Vec::with_capacity(entries.len());
    for ((file, profile, base), link_set) in entries.into_iter().zip(link_sets) {
        let name = namer.name(file, base)?;
        let program = normalize(&format!(
            "{}/{}-{}",
            config.scratch_dir,
            profile.name(),
            name
        ));

        let mut rules: Vec<Rule> = link_set
            .iter()
            .map(|src| compile_rule(src, profile, config))
            .collect();
        let objects: Vec<String> = rules.iter().map(|r| r.target.clone()).collect();

        let linker = if link_set
            .iter()
            .any(|src| Language::of(src) == Some(Language::Cpp))
        {
            Language::Cpp
        } else {
            Language::C
        };
        rules.push(
            Rule::command(
                program.clone(),
                objects,
                vec![
                    "@mkdir -p $(@D)".to_string(),
                    format!("{} -o $@ $^ {}", linker.compiler(), LINK_LIBRARIES),
                ],
            )
            .with_libraries(LINK_LIBRARIES)
            .with_origin(file.to_string()),
        );

        let run = match profile {
            Profile::Test => {
                let run = format!("run-{}-{}", profile.name(), name);
                rules.push(
                    Rule::command(
                        run.clone(),
                        vec![program.clone()],
                        vec![format!("$(VALGRIND) $(VALGRINDFLAGS) {}", program)],
                    )
                    .phony()
                    .with_origin(file.to_string()),
                );
                Some(run)
            }
            Profile::Bench => None,
        };

        tracing::debug!("{} {}: {} source(s)", profile.name(), name, link_set.len());
        out.push(EntryPointRules {
            entry: file.clone(),
            profile,
            name,
            program,
            run,
            link_set,
            rules,
        });
    }
    Ok(out)
}
