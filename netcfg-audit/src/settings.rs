use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use netcfg_core::DEFAULT_WINDOW;
use regex::Regex;
use serde::Deserialize;
use thiserror::Error;

/// Report and extraction defaults, optionally read from a TOML file.
///
/// Command-line flags are applied on top of whatever is loaded here.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    pub line_numbers: bool,
    pub color: bool,
    pub window: usize,
    pub strict: bool,
    pub simple: bool,
    /// Named patterns, referenced on the command line as `@name`.
    pub patterns: BTreeMap<String, String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            line_numbers: false,
            color: true,
            window: DEFAULT_WINDOW,
            strict: false,
            simple: false,
            patterns: BTreeMap::new(),
        }
    }
}

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to read settings file {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("failed to parse settings file {path}: {source}")]
    Parse {
        path: String,
        source: toml::de::Error,
    },
    #[error("unknown pattern @{0}")]
    UnknownPattern(String),
    #[error("invalid pattern {pattern:?}: {source}")]
    BadPattern {
        pattern: String,
        source: regex::Error,
    },
}

pub fn load_settings(path: &Path) -> Result<Settings, SettingsError> {
    let raw = fs::read_to_string(path).map_err(|source| SettingsError::Io {
        path: path.display().to_string(),
        source,
    })?;

    parse_settings(&raw, path.display().to_string())
}

pub fn parse_settings(raw: &str, path: String) -> Result<Settings, SettingsError> {
    toml::from_str(raw).map_err(|source| SettingsError::Parse { path, source })
}

impl Settings {
    /// Expand `@name` from the `[patterns]` table; anything else is returned as is.
    pub fn resolve_pattern<'a>(&'a self, raw: &'a str) -> Result<&'a str, SettingsError> {
        match raw.strip_prefix('@') {
            Some(name) => self
                .patterns
                .get(name)
                .map(String::as_str)
                .ok_or_else(|| SettingsError::UnknownPattern(name.to_string())),
            None => Ok(raw),
        }
    }

    pub fn compile(&self, raw: &str) -> Result<Regex, SettingsError> {
        let pattern = self.resolve_pattern(raw)?;
        Regex::new(pattern).map_err(|source| SettingsError::BadPattern {
            pattern: pattern.to_string(),
            source,
        })
    }
}
