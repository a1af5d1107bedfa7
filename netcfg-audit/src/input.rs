//! Reading configuration text.
//!
//! Input is a plain config dump or a flagged CSV, where each row carries four
//! subsystem membership flags ahead of the command text.

use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use encoding_rs::{Encoding, EUC_JP, SHIFT_JIS, UTF_16BE, UTF_16LE, UTF_8};
use log::debug;
use thiserror::Error;

/// Number of subsystem flag columns in a flagged CSV row.
pub const SUBSYSTEMS: usize = 4;

const ENABLED_MARKS: [char; 3] = ['\u{25CB}', '\u{25EF}', '\u{26AA}'];

#[derive(Debug, Error)]
pub enum InputError {
    #[error("failed to read {path}: {source}")]
    Io { path: String, source: io::Error },
    #[error("{path} is not UTF-16, UTF-8, EUC-JP or Shift_JIS text")]
    Undecodable { path: String },
    #[error("{path}: row {row} has {found} columns, expected {expected}")]
    ShortRow {
        path: String,
        row: usize,
        found: usize,
        expected: usize,
    },
}

/// Where the text comes from. `-` and a missing path both mean stdin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    Stdin,
    File(PathBuf),
}

impl Source {
    pub fn from_arg(path: Option<&Path>) -> Self {
        match path {
            Some(path) if path != Path::new("-") => Source::File(path.to_path_buf()),
            _ => Source::Stdin,
        }
    }

    pub fn path(&self) -> Option<&Path> {
        match self {
            Source::Stdin => None,
            Source::File(path) => Some(path),
        }
    }

    pub fn name(&self) -> String {
        match self {
            Source::Stdin => "<stdin>".to_string(),
            Source::File(path) => path.display().to_string(),
        }
    }

    fn read_bytes(&self) -> Result<Vec<u8>, InputError> {
        let io_error = |source| InputError::Io {
            path: self.name(),
            source,
        };
        match self {
            Source::Stdin => {
                let mut buffer = Vec::new();
                io::stdin().read_to_end(&mut buffer).map_err(io_error)?;
                Ok(buffer)
            }
            Source::File(path) => fs::read(path).map_err(io_error),
        }
    }
}

/// One flagged-CSV row after the column swap.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlaggedRow {
    pub flags: [bool; SUBSYSTEMS],
    pub command: String,
}

impl FlaggedRow {
    pub fn is_enabled(&self, subsystem: usize) -> bool {
        self.flags.get(subsystem).copied().unwrap_or(false)
    }
}

/// Decoded input: config lines plus, for flagged CSV, the parsed rows.
#[derive(Debug, Clone, Default)]
pub struct Loaded {
    pub lines: Vec<String>,
    pub rows: Vec<FlaggedRow>,
}

fn candidates(bytes: &[u8]) -> Vec<(&'static Encoding, &[u8])> {
    let mut out = Vec::with_capacity(4);
    if let Some(rest) = bytes.strip_prefix(&[0xFF, 0xFE]) {
        out.push((UTF_16LE, rest));
    } else if let Some(rest) = bytes.strip_prefix(&[0xFE, 0xFF]) {
        out.push((UTF_16BE, rest));
    }
    out.push((UTF_8, bytes.strip_prefix(&[0xEF, 0xBB, 0xBF]).unwrap_or(bytes)));
    out.push((EUC_JP, bytes));
    out.push((SHIFT_JIS, bytes));
    out
}

/// Decode as UTF-16 (only behind a BOM), then UTF-8 with or without BOM,
/// then EUC-JP, then Shift_JIS. The first clean decode wins.
pub fn decode(bytes: &[u8], path: &str) -> Result<String, InputError> {
    for (encoding, body) in candidates(bytes) {
        if let Some(text) = encoding.decode_without_bom_handling_and_without_replacement(body) {
            debug!("decoded {path} as {}", encoding.name());
            return Ok(text.into_owned());
        }
    }
    Err(InputError::Undecodable {
        path: path.to_string(),
    })
}

/// Left-trimmed lines without line terminators.
pub fn split_lines(text: &str) -> Vec<String> {
    text.lines()
        .map(|line| line.trim_start().trim_end_matches('\r').to_string())
        .collect()
}

fn is_mark(column: &str) -> bool {
    let mut chars = column.chars();
    matches!((chars.next(), chars.next()), (Some(c), None) if ENABLED_MARKS.contains(&c))
}

/// Parse flagged CSV rows. The second and third flag columns are stored
/// swapped; everything after the fourth comma is the command.
pub fn parse_flagged_csv(text: &str, path: &str) -> Result<Vec<FlaggedRow>, InputError> {
    let mut rows = Vec::new();
    for (index, line) in text.lines().enumerate() {
        let line = line.trim_end_matches('\r');
        if line.trim().is_empty() {
            continue;
        }
        let columns: Vec<&str> = line.splitn(SUBSYSTEMS + 1, ',').collect();
        if columns.len() <= SUBSYSTEMS {
            return Err(InputError::ShortRow {
                path: path.to_string(),
                row: index + 1,
                found: columns.len(),
                expected: SUBSYSTEMS + 1,
            });
        }
        let flag = |i: usize| is_mark(columns[i].trim());
        rows.push(FlaggedRow {
            flags: [flag(0), flag(2), flag(1), flag(3)],
            command: columns[SUBSYSTEMS].trim_start().to_string(),
        });
    }
    Ok(rows)
}

pub fn load(source: &Source, flagged_csv: bool) -> Result<Loaded, InputError> {
    let name = source.name();
    let text = decode(&source.read_bytes()?, &name)?;

    let loaded = if flagged_csv {
        let rows = parse_flagged_csv(&text, &name)?;
        let lines = rows
            .iter()
            .map(|row| row.command.trim_start().to_string())
            .collect();
        Loaded { lines, rows }
    } else {
        Loaded {
            lines: split_lines(&text),
            rows: Vec::new(),
        }
    };
    debug!("read {} lines from {name}", loaded.lines.len());
    Ok(loaded)
}
