//! Command-line side of the config audit: reading inputs, loading settings,
//! asking before overwriting files and rendering colored reports.
//!
//! The analysis itself lives in `netcfg-core`.

pub mod input;
pub mod prompt;
pub mod report;
pub mod settings;
