//! Restricted `#include` scanner
//!
//! Only recognizes lines that are include directives. No macro expansion and
//! no evaluation of conditionals: an include under `#if 0` still counts.

use regex::Regex;
use std::sync::OnceLock;

/// One `#include` line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncludeDirective {
    pub name: String,
    /// `<name>` rather than `"name"`.
    pub angled: bool,
    /// 1-based line number.
    pub line: usize,
}

fn include_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"^\s*#\s*include\s*(?:"([^"]+)"|<([^>]+)>)"#).expect("include pattern is valid")
    })
}

pub fn scan_includes(text: &str) -> Vec<IncludeDirective> {
    let re = include_regex();
    text.lines()
        .enumerate()
        .filter_map(|(idx, line)| {
            let caps = re.captures(line)?;
            let (name, angled) = match (caps.get(1), caps.get(2)) {
                (Some(quoted), _) => (quoted.as_str(), false),
                (None, Some(angled)) => (angled.as_str(), true),
                (None, None) => return None,
            };
            Some(IncludeDirective {
                name: name.trim().to_string(),
                angled,
                line: idx + 1,
            })
        })
        .collect()
}
