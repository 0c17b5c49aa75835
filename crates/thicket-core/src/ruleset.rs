//! Declarative build rules handed to the emission backend

use crate::error::SynthError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One build target: an output path or a phony label, its prerequisites and
/// its recipe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rule {
    pub target: String,
    pub inputs: Vec<String>,
    /// Recipe lines, in executor syntax (`$@`, `$<`, `$^`, `$(MACRO)`).
    pub commands: Vec<String>,
    /// Always runs; never considered up to date.
    pub phony: bool,
    /// Libraries appended at link time.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub libraries: Option<String>,
    /// The file this rule was derived from, for diagnostics.
    #[serde(skip)]
    pub origin: String,
}

impl Rule {
    pub fn command(
        target: impl Into<String>,
        inputs: Vec<String>,
        commands: Vec<String>,
    ) -> Self {
        Rule {
            target: target.into(),
            inputs,
            commands,
            phony: false,
            libraries: None,
            origin: String::new(),
        }
    }

    /// A phony target that only groups other targets.
    pub fn alias(target: impl Into<String>, inputs: Vec<String>) -> Self {
        Rule {
            phony: true,
            ..Rule::command(target, inputs, Vec::new())
        }
    }

    pub fn phony(mut self) -> Self {
        self.phony = true;
        self
    }

    pub fn with_libraries(mut self, libraries: impl Into<String>) -> Self {
        self.libraries = Some(libraries.into());
        self
    }

    pub fn with_origin(mut self, origin: impl Into<String>) -> Self {
        self.origin = origin.into();
        self
    }

    /// Whether two rules would produce the same output in the same way.
    pub fn same_recipe(&self, other: &Rule) -> bool {
        self.target == other.target
            && self.inputs == other.inputs
            && self.commands == other.commands
            && self.phony == other.phony
            && self.libraries == other.libraries
    }
}

/// Accumulated rules plus global macro bindings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ruleset {
    pub macros: BTreeMap<String, String>,
    pub rules: BTreeMap<String, Rule>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_target: Option<String>,
}

impl Ruleset {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a rule.
    ///
    /// Re-registering an identical rule is a no-op. A different rule for an
    /// existing target is a collision.
    pub fn add(&mut self, rule: Rule) -> Result<(), SynthError> {
        match self.rules.get(&rule.target) {
            Some(existing) if existing.same_recipe(&rule) => Ok(()),
            Some(existing) => Err(SynthError::NamingCollision {
                target: rule.target.clone(),
                existing: describe(existing),
                incoming: describe(&rule),
            }),
            None => {
                self.rules.insert(rule.target.clone(), rule);
                Ok(())
            }
        }
    }

    pub fn extend(&mut self, rules: impl IntoIterator<Item = Rule>) -> Result<(), SynthError> {
        for rule in rules {
            self.add(rule)?;
        }
        Ok(())
    }

    /// Fold another ruleset in. Its rules go through [`Ruleset::add`]; its
    /// macros override ours.
    pub fn merge(&mut self, other: Ruleset) -> Result<(), SynthError> {
        self.extend(other.rules.into_values())?;
        for (key, value) in other.macros {
            if let Some(old) = self.macros.insert(key.clone(), value) {
                tracing::debug!("Macro {} overridden (was '{}')", key, old);
            }
        }
        if other.default_target.is_some() {
            self.default_target = other.default_target;
        }
        Ok(())
    }

    pub fn set_macro(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.macros.insert(key.into(), value.into());
    }

    pub fn get(&self, target: &str) -> Option<&Rule> {
        self.rules.get(target)
    }

    pub fn contains(&self, target: &str) -> bool {
        self.rules.contains_key(target)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Rules in target order.
    pub fn iter(&self) -> impl Iterator<Item = &Rule> {
        self.rules.values()
    }

    /// Names of all phony targets, in target order.
    pub fn phony_targets(&self) -> impl Iterator<Item = &str> {
        self.rules
            .values()
            .filter(|r| r.phony)
            .map(|r| r.target.as_str())
    }
}

fn describe(rule: &Rule) -> String {
    if rule.origin.is_empty() {
        format!("rule with inputs [{}]", rule.inputs.join(", "))
    } else {
        rule.origin.clone()
    }
}
