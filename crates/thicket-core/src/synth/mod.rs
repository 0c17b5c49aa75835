//! Rule synthesizers: independent passes over the classified file list

pub mod entry_points;
pub mod generated;
pub mod headers;

pub use entry_points::{EntryPointRules, entry_point_rules};
pub use generated::generator_rules;
pub use headers::{HeaderExports, header_export_rules};
