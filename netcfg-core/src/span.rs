//! Tagged byte ranges on a single line.
//!
//! A line is decorated in several passes: structural tokens found while
//! classifying, address literals, cross-reference keys and finally prefixes
//! such as tree glyphs or computed network labels. Every pass goes through
//! [`insert`] and [`shift`], which keep a span list sorted and
//! non-overlapping so highlighting is never lost or duplicated.
//!
//! Offsets are byte offsets into the UTF-8 line.

use serde::Serialize;
use thiserror::Error;

/// What a highlighted range represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SpanKind {
    Ipv4Address,
    Ipv4Network,
    Ipv4Netmask,
    Ipv6Address,
    Ipv6Network,
    /// The bare `/` between an address and its prefix length.
    Slash,
    /// Token captured by a classification pattern.
    Info,
    /// Token used to cross-reference one section against another.
    Key,
}

impl SpanKind {
    /// True for kinds produced by the address extractor.
    pub fn is_address(&self) -> bool {
        !matches!(self, SpanKind::Info | SpanKind::Key)
    }
}

/// Outcome of validating the text under a span.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "status", content = "reason", rename_all = "snake_case")]
pub enum Validity {
    Ok,
    Invalid(String),
}

impl Validity {
    pub fn is_ok(&self) -> bool {
        matches!(self, Validity::Ok)
    }

    pub fn reason(&self) -> Option<&str> {
        match self {
            Validity::Ok => None,
            Validity::Invalid(reason) => Some(reason),
        }
    }
}

/// Half-open range `[start, stop)` plus its classification metadata.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Span {
    pub start: usize,
    pub stop: usize,
    pub kind: SpanKind,
    pub validity: Validity,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

impl Span {
    pub fn new(start: usize, stop: usize, kind: SpanKind) -> Self {
        Self {
            start,
            stop,
            kind,
            validity: Validity::Ok,
            value: None,
        }
    }

    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }

    pub fn invalid(mut self, reason: impl Into<String>) -> Self {
        self.validity = Validity::Invalid(reason.into());
        self
    }

    pub fn len(&self) -> usize {
        self.stop.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.start >= self.stop
    }

    pub fn same_range(&self, other: &Span) -> bool {
        self.start == other.start && self.stop == other.stop
    }

    fn with_range(&self, start: usize, stop: usize) -> Span {
        Span {
            start,
            stop,
            ..self.clone()
        }
    }
}

/// Errors raised when a span list breaks its invariant.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SpanError {
    #[error("span {index} is inverted: start {start} > stop {stop}")]
    Inverted {
        index: usize,
        start: usize,
        stop: usize,
    },
    #[error("span {index} starts at {start}, before the previous start {previous}")]
    Unsorted {
        index: usize,
        start: usize,
        previous: usize,
    },
    #[error("span {index} starting at {start} overlaps the previous span ending at {previous_stop}")]
    Overlap {
        index: usize,
        start: usize,
        previous_stop: usize,
    },
    #[error("inserted span is inverted: start {start} > stop {stop}")]
    InvertedInsert { start: usize, stop: usize },
}

/// Check that `spans` is sorted by start and mutually non-overlapping.
pub fn validate(spans: &[Span]) -> Result<(), SpanError> {
    for (index, span) in spans.iter().enumerate() {
        if span.start > span.stop {
            return Err(SpanError::Inverted {
                index,
                start: span.start,
                stop: span.stop,
            });
        }
        if index == 0 {
            continue;
        }
        let previous = &spans[index - 1];
        if span.start < previous.start {
            return Err(SpanError::Unsorted {
                index,
                start: span.start,
                previous: previous.start,
            });
        }
        if span.start < previous.stop {
            return Err(SpanError::Overlap {
                index,
                start: span.start,
                previous_stop: previous.stop,
            });
        }
    }
    Ok(())
}

/// Insert `span` into a valid list, returning a new valid list.
///
/// The new range takes over every character it covers. Existing entries that
/// overlap it keep only their uncovered remainders, and an entry that covers
/// exactly the same range is replaced, so re-inserting a present span is a
/// no-op.
///
/// ```
/// use netcfg_core::span::{insert, Span, SpanKind};
///
/// let list = vec![Span::new(0, 14, SpanKind::Info)];
/// let out = insert(&list, Span::new(2, 10, SpanKind::Key)).unwrap();
/// let ranges: Vec<_> = out.iter().map(|s| (s.start, s.stop)).collect();
/// assert_eq!(ranges, vec![(0, 2), (2, 10), (10, 14)]);
/// ```
pub fn insert(spans: &[Span], span: Span) -> Result<Vec<Span>, SpanError> {
    validate(spans)?;
    if span.start > span.stop {
        return Err(SpanError::InvertedInsert {
            start: span.start,
            stop: span.stop,
        });
    }

    let mut before = Vec::with_capacity(spans.len());
    let mut after = Vec::new();

    for existing in spans {
        if existing.same_range(&span) {
            continue;
        }
        if existing.stop <= span.start {
            before.push(existing.clone());
            continue;
        }
        if existing.start >= span.stop {
            after.push(existing.clone());
            continue;
        }
        // Overlapping entry: keep whatever sticks out on either side.
        if existing.start < span.start {
            before.push(existing.with_range(existing.start, span.start));
        }
        if existing.stop > span.stop {
            after.push(existing.with_range(span.stop, existing.stop));
        }
    }

    before.push(span);
    before.extend(after);
    Ok(before)
}

/// Insert every span of `incoming` in order.
pub fn insert_all<I>(spans: &[Span], incoming: I) -> Result<Vec<Span>, SpanError>
where
    I: IntoIterator<Item = Span>,
{
    let mut out = spans.to_vec();
    for span in incoming {
        out = insert(&out, span)?;
    }
    Ok(out)
}

/// Add `amount` to the start and stop of every entry from index `from`
/// onward. Entries before `from` are copied unchanged.
pub fn shift(spans: &[Span], amount: usize, from: usize) -> Result<Vec<Span>, SpanError> {
    validate(spans)?;
    Ok(spans
        .iter()
        .enumerate()
        .map(|(index, span)| {
            if index < from {
                span.clone()
            } else {
                span.with_range(span.start + amount, span.stop + amount)
            }
        })
        .collect())
}
