//! Makefile serialization

use crate::EmitError;
use std::fmt::Write;
use thicket_core::Ruleset;

pub const HEADER: &str = "# Generated by thicket. Do not edit.";

/// Escape a file name for use as a target or prerequisite.
pub fn escape_path(path: &str) -> String {
    let mut out = String::with_capacity(path.len());
    for ch in path.chars() {
        match ch {
            ' ' => out.push_str("\\ "),
            '#' => out.push_str("\\#"),
            ':' => out.push_str("\\:"),
            '$' => out.push_str("$$"),
            other => out.push(other),
        }
    }
    out
}

fn single_line<'a>(text: &'a str, context: &str) -> Result<&'a str, EmitError> {
    if text.contains('\n') {
        return Err(EmitError::Multiline {
            context: context.to_string(),
        });
    }
    Ok(text)
}

/// Render a ruleset as a Makefile. Output depends only on the ruleset.
pub fn render(ruleset: &Ruleset) -> Result<String, EmitError> {
    let mut out = String::new();
    writeln!(out, "{}", HEADER)?;

    if !ruleset.macros.is_empty() {
        writeln!(out)?;
        for (key, value) in &ruleset.macros {
            let value = single_line(value, key)?.replace('#', "\\#");
            writeln!(out, "{}={}", key, value)?;
        }
    }

    writeln!(out)?;
    if let Some(default) = &ruleset.default_target {
        writeln!(out, ".DEFAULT_GOAL := {}", escape_path(default))?;
    }
    let phony: Vec<String> = ruleset.phony_targets().map(escape_path).collect();
    if !phony.is_empty() {
        writeln!(out, ".PHONY: {}", phony.join(" "))?;
    }

    for rule in ruleset.iter() {
        writeln!(out)?;
        let inputs: Vec<String> = rule.inputs.iter().map(|i| escape_path(i)).collect();
        if inputs.is_empty() {
            writeln!(out, "{}:", escape_path(&rule.target))?;
        } else {
            writeln!(out, "{}: {}", escape_path(&rule.target), inputs.join(" "))?;
        }
        for command in &rule.commands {
            writeln!(out, "\t{}", single_line(command, &rule.target)?)?;
        }
    }

    Ok(out)
}
