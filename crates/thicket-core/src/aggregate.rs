//! Composes synthesized rules into the final ruleset

use crate::classify::Classifier;
use crate::config::Config;
use crate::error::{ConfigError, SynthError};
use crate::graph::DependencyResolver;
use crate::metadata::MetadataSource;
use crate::model::{FileClass, Profile, SourceFile};
use crate::naming::TargetNamer;
use crate::ruleset::{Rule, Ruleset};
use crate::synth::{entry_point_rules, generator_rules, header_export_rules};
use std::sync::Arc;

/// Composite target names.
pub mod targets {
    pub const ALL: &str = "all";
    pub const BUILD: &str = "build";
    pub const PREPARE: &str = "prepare";
    pub const BUILD_CHECK: &str = "build-check";
    pub const CHECK: &str = "check";
    pub const BUILD_BENCH: &str = "build-bench";
    pub const DOC: &str = "doc";
    pub const DEPLOY_DOC: &str = "deploy-doc";
}

/// Built-in compiler flag table.
pub fn default_macros() -> Vec<(&'static str, &'static str)> {
    vec![
        ("GLOBALCPPFLAGS", "-D_POSIX_C_SOURCE=199309L"),
        ("BENCHCPPFLAGS", "-g -Wall -O3 -DNDEBUG"),
        ("TESTCPPFLAGS", "-g -Wall -Wextra -Wconversion -pedantic"),
        ("TESTCFLAGS", "-std=c99"),
        ("TESTCXXFLAGS", "-std=c++11"),
        ("VALGRIND", "valgrind"),
    ]
}

/// One synthesis run over a project.
///
/// Owns the resolver, and with it the scan cache, so separate runs never
/// share state.
#[derive(Debug)]
pub struct Synthesizer {
    config: Config,
    classifier: Classifier,
    namer: TargetNamer,
    resolver: DependencyResolver,
}

impl Synthesizer {
    pub fn new(config: Config, source: Arc<dyn MetadataSource>) -> Result<Self, ConfigError> {
        config.validate()?;
        let classifier = Classifier::new(&config)?;
        let namer = TargetNamer::new(&config.source_root);
        Ok(Synthesizer {
            config,
            classifier,
            namer,
            resolver: DependencyResolver::new(source),
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn resolver(&self) -> &DependencyResolver {
        &self.resolver
    }

    pub fn classifier(&self) -> &Classifier {
        &self.classifier
    }

    /// Synthesize the complete ruleset for `files`.
    ///
    /// Nothing is returned unless every pass succeeds.
    pub fn run(&self, files: &[SourceFile]) -> Result<Ruleset, SynthError> {
        let classified = self.classifier.classify_all(files);
        let cache = self.resolver.cache();
        let mut ruleset = Ruleset::new();

        let generated = generator_rules(&classified, cache, &self.config)?;
        tracing::info!("{} generator rule(s)", generated.len());
        ruleset.extend(generated)?;

        let exports = header_export_rules(&classified, cache, &self.config)?;
        tracing::info!("{} public header(s)", exports.rules.len());
        let mut build_inputs: Vec<String> =
            exports.rules.iter().map(|r| r.target.clone()).collect();
        ruleset.extend(exports.rules)?;
        ruleset.add(Rule::alias(
            targets::PREPARE,
            exports.plain_files.iter().map(|f| f.to_string()).collect(),
        ))?;
        build_inputs.push(targets::PREPARE.to_string());
        ruleset.add(Rule::alias(targets::BUILD, build_inputs))?;

        let entries = entry_point_rules(&classified, &self.resolver, &self.namer, &self.config)?;
        let mut build_check = Vec::new();
        let mut check = Vec::new();
        let mut build_bench = Vec::new();
        for entry in entries {
            match entry.profile {
                Profile::Test => build_check.push(entry.program.clone()),
                Profile::Bench => build_bench.push(entry.program.clone()),
            }
            check.extend(entry.run.clone());
            ruleset.extend(entry.rules)?;
        }
        tracing::info!(
            "{} test(s), {} benchmark(s)",
            build_check.len(),
            build_bench.len()
        );
        ruleset.add(Rule::alias(targets::BUILD_CHECK, build_check))?;
        ruleset.add(Rule::alias(targets::CHECK, check))?;
        ruleset.add(Rule::alias(targets::BUILD_BENCH, build_bench))?;

        ruleset.add(
            Rule::command(
                targets::DOC,
                vec![targets::BUILD.to_string()],
                self.config.doc_commands(),
            )
            .phony(),
        )?;
        ruleset.add(deploy_doc_rule(&self.config))?;
        ruleset.add(Rule::alias(
            targets::ALL,
            vec![
                targets::BUILD.to_string(),
                targets::BUILD_BENCH.to_string(),
                targets::BUILD_CHECK.to_string(),
            ],
        ))?;
        ruleset.default_target = Some(targets::ALL.to_string());

        ruleset.merge(self.macros())?;
        tracing::info!(
            "Synthesized {} rule(s) from {} file(s), {} scanned",
            ruleset.len(),
            files.len(),
            cache.len()
        );
        Ok(ruleset)
    }

    /// The built-in flag table, include flags, then configured overrides.
    fn macros(&self) -> Ruleset {
        let mut macros = Ruleset::new();
        for (key, value) in default_macros() {
            macros.set_macro(key, value);
        }
        let include_flags: Vec<String> = self
            .config
            .search_dirs()
            .iter()
            .map(|dir| format!("-I{}", dir))
            .collect();
        macros.set_macro("INCLUDEFLAGS", include_flags.join(" "));
        for (key, value) in &self.config.macros {
            macros.set_macro(key.clone(), value.clone());
        }
        macros
    }

    /// Classification of every file, for listing.
    pub fn classify(&self, files: &[SourceFile]) -> Vec<(SourceFile, FileClass)> {
        self.classifier.classify_all(files)
    }
}

/// Pushes the rendered documentation to a branch of the configured remote,
/// initializing a throwaway repository in the output directory on first use.
fn deploy_doc_rule(config: &Config) -> Rule {
    let doc = &config.doc;
    let command = format!(
        "[ -d {dir}/.git ] || ( \
         url=`git remote -v | grep {remote} | awk '{{ printf \"%s\", $$2; exit }}'` && \
         mkdir -p {dir} && \
         cd {dir} && \
         git init && \
         git config user.name Bot && \
         git config user.email '<>' && \
         git commit -m _ --allow-empty && \
         git remote add origin \"$$url\" \
         ) && \
         cd {dir} && \
         git add -A && \
         git commit --amend -q -m Autogenerated && \
         git push -f origin master:{branch}",
        dir = doc.output_dir,
        remote = doc.remote,
        branch = doc.branch,
    );
    Rule::command(targets::DEPLOY_DOC, vec![targets::DOC.to_string()], vec![command]).phony()
}
