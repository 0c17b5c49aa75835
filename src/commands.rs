//! CLI command implementations

use anyhow::Context;
use std::path::Path;
use std::sync::Arc;
use thicket_core::{Config, Ruleset, SourceFile, Synthesizer, to_dot};
use thicket_emit::Format;
use thicket_indexer::DirectiveScanner;

/// Load config and build a synthesizer over the project's file system.
fn synthesizer(root: &Path, config: Option<&Path>) -> anyhow::Result<Synthesizer> {
    let config = Config::load(root, config).context("cannot load configuration")?;
    let scanner = DirectiveScanner::new(root, &config);
    Ok(Synthesizer::new(config, Arc::new(scanner))?)
}

/// Enumerate and synthesize. Fails without side effects.
fn synthesize(synth: &Synthesizer, root: &Path) -> anyhow::Result<Ruleset> {
    let files = thicket_indexer::enumerate(root, synth.config())?;
    tracing::info!("Found {} file(s) under {}", files.len(), synth.config().source_root);
    let ruleset = synth.run(&files).context("synthesis failed")?;
    Ok(ruleset)
}

pub fn generate(root: &Path, config: Option<&Path>, output: &Path, format: Format) -> anyhow::Result<()> {
    let synth = synthesizer(root, config)?;
    let ruleset = synthesize(&synth, root)?;
    let path = root.join(output);
    thicket_emit::save(&ruleset, &path, format)?;
    Ok(())
}

pub fn closure(root: &Path, config: Option<&Path>, file: &str) -> anyhow::Result<()> {
    let synth = synthesizer(root, config)?;
    let entry = SourceFile::new(file);
    let closure = synth.resolver().closure(&entry)?;
    for member in closure {
        println!("{}", member);
    }
    Ok(())
}

pub fn graph(root: &Path, config: Option<&Path>, file: &str) -> anyhow::Result<()> {
    let synth = synthesizer(root, config)?;
    let graph = synth.resolver().reachable_graph(&SourceFile::new(file))?;
    print!("{}", to_dot(&graph));
    Ok(())
}

pub fn targets(root: &Path, config: Option<&Path>) -> anyhow::Result<()> {
    let synth = synthesizer(root, config)?;
    let ruleset = synthesize(&synth, root)?;
    for rule in ruleset.iter() {
        if rule.phony {
            println!("{} (phony)", rule.target);
        } else {
            println!("{}", rule.target);
        }
    }
    Ok(())
}
