//! Leveled groups and the operations reports compose them with.

use regex::Regex;
use serde::Serialize;
use thiserror::Error;

use crate::address::{
    extract_addresses, extract_ipv4_address, extract_ipv4_network, ExtractError, ExtractOptions,
};
use crate::classify::{first_match, group_spans, ClassifiedLine, Level};
use crate::span::{self, SpanError, SpanKind};

#[derive(Debug, Error)]
pub enum GroupError {
    #[error(transparent)]
    Span(#[from] SpanError),
    #[error(transparent)]
    Extract(#[from] ExtractError),
}

/// What [`LeveledGroup::annotate`] highlights on each line.
#[derive(Debug, Clone)]
pub enum Annotation {
    Addresses(ExtractOptions),
    Address,
    Network { strict: bool },
    Key(Regex),
}

/// An ordered run of classified lines plus the level compared by set
/// operations.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LeveledGroup {
    lines: Vec<ClassifiedLine>,
    active: Level,
}

impl LeveledGroup {
    /// Group whose active level is the level of its last line.
    pub fn new(lines: Vec<ClassifiedLine>) -> Self {
        let active = lines.last().map(|line| line.level).unwrap_or_default();
        Self { lines, active }
    }

    pub fn with_active(lines: Vec<ClassifiedLine>, active: Level) -> Self {
        Self { lines, active }
    }

    pub fn lines(&self) -> &[ClassifiedLine] {
        &self.lines
    }

    pub fn into_lines(self) -> Vec<ClassifiedLine> {
        self.lines
    }

    pub fn active(&self) -> Level {
        self.active
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn active_lines(&self) -> impl Iterator<Item = &ClassifiedLine> + '_ {
        self.lines.iter().filter(|line| line.level == self.active)
    }

    /// Every line and the active marker moved to `level`.
    pub fn relevel(&self, level: Level) -> Self {
        let lines = self
            .lines
            .iter()
            .map(|line| ClassifiedLine {
                level,
                ..line.clone()
            })
            .collect();
        Self::with_active(lines, level)
    }

    /// Blank line after each block that had body lines, and one at the end.
    pub fn with_separators(&self) -> Self {
        if self.lines.is_empty() {
            return self.clone();
        }
        let mut lines = Vec::with_capacity(self.lines.len() + 1);
        let mut previous: Option<Level> = None;
        for line in &self.lines {
            if line.level == Level::Anchor && previous.is_some_and(|level| level.is_body()) {
                lines.push(ClassifiedLine::separator());
            }
            previous = Some(line.level);
            lines.push(line.clone());
        }
        lines.push(ClassifiedLine::separator());
        Self::with_active(lines, self.active)
    }

    pub fn select_active(&self) -> Self {
        Self::with_active(self.active_lines().cloned().collect(), self.active)
    }

    /// Split at every level-"1" line. Lines before the first anchor belong to
    /// no block and are dropped.
    pub fn blocks(&self) -> Vec<LeveledGroup> {
        let mut blocks: Vec<Vec<ClassifiedLine>> = Vec::new();
        for line in &self.lines {
            if line.level == Level::Anchor {
                blocks.push(vec![line.clone()]);
            } else if let Some(block) = blocks.last_mut() {
                block.push(line.clone());
            }
        }
        blocks
            .into_iter()
            .map(|lines| Self::with_active(lines, self.active))
            .collect()
    }

    pub fn concat(&self, other: &LeveledGroup) -> Self {
        let mut lines = self.lines.clone();
        lines.extend(other.lines.iter().cloned());
        Self::with_active(lines, self.active)
    }

    /// Merge extracted spans into every numbered line.
    pub fn annotate(&self, annotation: &Annotation) -> Result<Self, GroupError> {
        let mut lines = Vec::with_capacity(self.lines.len());
        for line in &self.lines {
            if line.line_number.is_none() {
                lines.push(line.clone());
                continue;
            }
            let found = match annotation {
                Annotation::Addresses(options) => extract_addresses(&line.text, options)?,
                Annotation::Address => extract_ipv4_address(&line.text).into_iter().collect(),
                Annotation::Network { strict } => extract_ipv4_network(&line.text, *strict),
                Annotation::Key(pattern) => first_match(pattern, &line.text)
                    .map(|caps| group_spans(&caps, SpanKind::Key))
                    .unwrap_or_default(),
            };
            lines.push(ClassifiedLine {
                spans: span::insert_all(&line.spans, found)?,
                ..line.clone()
            });
        }
        Ok(Self::with_active(lines, self.active))
    }

    /// Active-level lines prefixed with their computed network.
    ///
    /// ```
    /// use netcfg_core::classify::{ClassifiedLine, Level};
    /// use netcfg_core::group::LeveledGroup;
    ///
    /// let group = LeveledGroup::new(vec![ClassifiedLine::new(
    ///     "ip address 99.99.16.9/28",
    ///     Level::Anchor,
    ///     Some(1),
    /// )]);
    /// let labelled = group.with_network_labels(false).unwrap();
    /// assert_eq!(labelled.lines()[0].text, "99.99.16.0/28 : ip address 99.99.16.9/28");
    /// ```
    pub fn with_network_labels(&self, strict: bool) -> Result<Self, GroupError> {
        let mut lines = Vec::new();
        for line in self.active_lines() {
            let network = extract_ipv4_network(&line.text, strict)
                .into_iter()
                .next()
                .filter(|span| span.validity.is_ok())
                .and_then(|span| span.value);
            let prefix = match network {
                Some(network) => format!("{network} : "),
                None => "error : ".to_string(),
            };
            lines.push(prefixed(line, &prefix)?);
        }
        Ok(Self::with_active(lines, self.active))
    }
}

/// `line` with `prefix` prepended and its spans moved past it.
pub(crate) fn prefixed(line: &ClassifiedLine, prefix: &str) -> Result<ClassifiedLine, SpanError> {
    Ok(ClassifiedLine {
        text: format!("{prefix}{}", line.text),
        spans: span::shift(&line.spans, prefix.len(), 0)?,
        ..line.clone()
    })
}
