//! Report formatters.

pub mod json;
pub mod text;

pub use json::format_json;
pub use text::{format_group, format_line, segments, Numbering, Segment, Style};
