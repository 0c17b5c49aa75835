//! Source tree enumeration and metadata extraction

pub mod directive;
pub mod enumerate;
pub mod includes;
pub mod scanner;


pub use directive::{DirectiveParseError, parse_directive};
pub use enumerate::enumerate;
pub use includes::{IncludeDirective, scan_includes};
pub use scanner::{DirectiveScanner, system_header};
