//! Embedded `@thicket` directive blocks
//!
//! A block opens on a line reading `@thicket` and closes on a line reading
//! `@end`, each optionally behind a comment leader. The lines in between,
//! with one comment leader stripped, are TOML:
//!
//! ```c
//! /* @thicket
//!  * public = true
//!  * deps = ["btree_impl.c"]
//!  * @end */
//! ```
//!
//! ```python
//! # @thicket
//! # generator-deps = ["template.txt"]
//! # @end
//! ```

use thicket_core::AttributeRecord;
use thiserror::Error;

pub const OPEN_MARKER: &str = "@thicket";
pub const CLOSE_MARKER: &str = "@end";

/// Strip one comment leader and surrounding whitespace.
fn strip_leader(line: &str) -> &str {
    let line = line.trim_start();
    for leader in ["//", "/*", "#", "*"] {
        if let Some(rest) = line.strip_prefix(leader) {
            return rest;
        }
    }
    line
}

/// Why a directive block could not be read.
#[derive(Debug, Error)]
pub enum DirectiveParseError {
    #[error("second @thicket block on line {line}")]
    Duplicate { line: usize },

    #[error("@thicket block opened on line {line} is never closed with @end")]
    Unterminated { line: usize },

    #[error("{}", .0.message())]
    Toml(#[from] toml::de::Error),
}

fn is_open(line: &str) -> bool {
    strip_leader(line).trim() == OPEN_MARKER
}

fn is_close(line: &str) -> bool {
    match strip_leader(line).trim().strip_prefix(CLOSE_MARKER) {
        Some(rest) => {
            let rest = rest.trim();
            rest.is_empty() || rest == "*/"
        }
        None => false,
    }
}

/// Extract the TOML body of the directive block, if the text has one.
pub fn extract_block(text: &str) -> Result<Option<String>, DirectiveParseError> {
    let mut lines = text.lines().enumerate();
    let mut body: Option<Vec<&str>> = None;

    while let Some((number, line)) = lines.next() {
        if !is_open(line) {
            continue;
        }
        if body.is_some() {
            return Err(DirectiveParseError::Duplicate { line: number + 1 });
        }
        let mut inner = Vec::new();
        let mut closed = false;
        for (_, line) in lines.by_ref() {
            if is_close(line) {
                closed = true;
                break;
            }
            inner.push(strip_leader(line));
        }
        if !closed {
            return Err(DirectiveParseError::Unterminated { line: number + 1 });
        }
        body = Some(inner);
    }

    Ok(body.map(|inner| inner.join("\n")))
}

/// Parse the directive block of `text` into an attribute record. Text without
/// a block yields the defaults.
pub fn parse_directive(text: &str) -> Result<AttributeRecord, DirectiveParseError> {
    match extract_block(text)? {
        Some(body) => Ok(toml::from_str(&body)?),
        None => Ok(AttributeRecord::default()),
    }
}
