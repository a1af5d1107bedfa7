//! Turn a flat list of config lines into leveled blocks.
//!
//! An anchor pattern opens a block (`ip access-list ...`, `route-map ...`,
//! `router bgp ...`) and one or two body patterns pick the member lines that
//! belong to it. How far a block reaches is decided by a [`Policy`].

use std::fmt;

use log::debug;
use regex::{Captures, Regex};
use serde::Serialize;

use crate::group::LeveledGroup;
use crate::span::{self, Span, SpanError, SpanKind};

/// Lines covered by the last block under [`Policy::Windowed`], anchor included.
pub const DEFAULT_WINDOW: usize = 30;

/// Position of a line in a leveled group.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum Level {
    #[default]
    #[serde(rename = "0")]
    Unclassified,
    #[serde(rename = "1")]
    Anchor,
    #[serde(rename = "2")]
    Body,
    #[serde(rename = "2.1")]
    BodyPrimary,
    #[serde(rename = "2.2")]
    BodySecondary,
}

impl Level {
    pub fn as_str(&self) -> &'static str {
        match self {
            Level::Unclassified => "0",
            Level::Anchor => "1",
            Level::Body => "2",
            Level::BodyPrimary => "2.1",
            Level::BodySecondary => "2.2",
        }
    }

    pub fn is_body(&self) -> bool {
        matches!(self, Level::Body | Level::BodyPrimary | Level::BodySecondary)
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One line of a group with its level and highlight spans.
///
/// Separator and title lines carry no `line_number`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClassifiedLine {
    pub text: String,
    pub level: Level,
    pub line_number: Option<usize>,
    pub spans: Vec<Span>,
}

impl ClassifiedLine {
    pub fn new(text: impl Into<String>, level: Level, line_number: Option<usize>) -> Self {
        Self {
            text: text.into(),
            level,
            line_number,
            spans: Vec::new(),
        }
    }

    /// The empty level-"0" line placed between blocks.
    pub fn separator() -> Self {
        Self::new(String::new(), Level::Unclassified, None)
    }

    pub fn is_separator(&self) -> bool {
        self.line_number.is_none() && self.text.is_empty()
    }
}

/// How far a block extends past its anchor.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Policy {
    /// Close a block at the first non-matching line once a terminal body line
    /// has been seen.
    UntilMismatch,
    /// Keep matching body lines up to the next anchor.
    #[default]
    ToNextAnchor,
    /// Like [`Policy::ToNextAnchor`], but the last block only spans the window.
    Windowed,
}

#[derive(Debug, Clone)]
enum Body {
    Single(Regex),
    Pair { primary: Regex, secondary: Regex },
}

/// First match of `pattern` in `text` that is not empty.
pub(crate) fn first_match<'h>(pattern: &Regex, text: &'h str) -> Option<Captures<'h>> {
    pattern
        .captures_iter(text)
        .find(|caps| caps.get(0).is_some_and(|m| !m.as_str().is_empty()))
}

/// Spans of every participating capture group (index 1 and up).
pub(crate) fn group_spans(caps: &Captures<'_>, kind: SpanKind) -> Vec<Span> {
    caps.iter()
        .skip(1)
        .flatten()
        .map(|m| Span::new(m.start(), m.end(), kind).with_value(m.as_str()))
        .collect()
}

#[derive(Debug, Clone)]
pub struct Classifier {
    anchor: Regex,
    body: Option<Body>,
    policy: Policy,
    window: usize,
}

impl Classifier {
    /// Test every line on its own: matches are anchors, the rest is dropped.
    pub fn flat(pattern: Regex) -> Self {
        Self {
            anchor: pattern,
            body: None,
            policy: Policy::default(),
            window: DEFAULT_WINDOW,
        }
    }

    /// Anchor lines followed by `body` member lines at level "2".
    pub fn nested(anchor: Regex, body: Regex) -> Self {
        Self {
            body: Some(Body::Single(body)),
            ..Self::flat(anchor)
        }
    }

    /// Anchor lines followed by `primary` ("2.1") and `secondary` ("2.2")
    /// member lines. Under [`Policy::UntilMismatch`] a secondary line is
    /// terminal.
    pub fn nested_pair(anchor: Regex, primary: Regex, secondary: Regex) -> Self {
        Self {
            body: Some(Body::Pair { primary, secondary }),
            ..Self::flat(anchor)
        }
    }

    pub fn with_policy(mut self, policy: Policy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_window(mut self, window: usize) -> Self {
        self.window = window;
        self
    }

    pub fn policy(&self) -> Policy {
        self.policy
    }

    /// Per-line view: every input line with its level, unmatched lines at "0".
    pub fn levels<S: AsRef<str>>(&self, lines: &[S]) -> Result<Vec<ClassifiedLine>, SpanError> {
        let mut out: Vec<ClassifiedLine> = lines
            .iter()
            .enumerate()
            .map(|(index, line)| {
                ClassifiedLine::new(line.as_ref(), Level::Unclassified, Some(index + 1))
            })
            .collect();

        let anchors = self.mark_anchors(&mut out)?;
        if let Some(body) = &self.body {
            self.mark_bodies(body, &anchors, &mut out)?;
        }
        Ok(out)
    }

    /// Classified lines only, as a group whose active level is the level of
    /// its last line.
    pub fn classify<S: AsRef<str>>(&self, lines: &[S]) -> Result<LeveledGroup, SpanError> {
        let kept = self
            .levels(lines)?
            .into_iter()
            .filter(|line| line.level != Level::Unclassified)
            .collect();
        Ok(LeveledGroup::new(kept))
    }

    fn mark_anchors(&self, lines: &mut [ClassifiedLine]) -> Result<Vec<usize>, SpanError> {
        let mut anchors = Vec::new();
        for (index, line) in lines.iter_mut().enumerate() {
            if mark(line, &self.anchor, Level::Anchor)? {
                anchors.push(index);
            }
        }
        Ok(anchors)
    }

    fn mark_bodies(
        &self,
        body: &Body,
        anchors: &[usize],
        lines: &mut [ClassifiedLine],
    ) -> Result<(), SpanError> {
        let total = lines.len();
        for (k, &start) in anchors.iter().enumerate() {
            let end = match anchors.get(k + 1) {
                Some(&next) => next,
                None if self.policy == Policy::Windowed => (start + self.window).min(total),
                None => total,
            };
            debug!("block {} spans input lines {}..{}", k + 1, start + 1, end);

            let mut armed = false;
            for line in &mut lines[(start + 1).min(end)..end] {
                let terminal = match body {
                    Body::Single(pattern) => {
                        mark(line, pattern, Level::Body)?.then_some(true)
                    }
                    Body::Pair { primary, secondary } => {
                        if mark(line, primary, Level::BodyPrimary)? {
                            Some(false)
                        } else if mark(line, secondary, Level::BodySecondary)? {
                            Some(true)
                        } else {
                            None
                        }
                    }
                };
                match terminal {
                    Some(terminal) => armed |= terminal,
                    None if self.policy == Policy::UntilMismatch && armed => break,
                    None => {}
                }
            }
        }
        Ok(())
    }
}

/// Give `line` `level` and its capture spans when `pattern` matches it.
fn mark(line: &mut ClassifiedLine, pattern: &Regex, level: Level) -> Result<bool, SpanError> {
    let Some(caps) = first_match(pattern, &line.text) else {
        return Ok(false);
    };
    let spans = group_spans(&caps, SpanKind::Info);
    line.spans = span::insert_all(&line.spans, spans)?;
    line.level = level;
    Ok(true)
}
