//! Compare sections as sets of normalized values.
//!
//! A [`Projector`] maps each active-level line of a group to the value it is
//! compared by: an address, a network or a pattern capture. Lines without a
//! usable value all map to the `None` sentinel, which takes part in set
//! operations like any other value.

use std::collections::BTreeSet;

use regex::Regex;

use crate::address::{extract_ipv4_address, extract_ipv4_network};
use crate::classify::{first_match, ClassifiedLine};
use crate::group::{prefixed, LeveledGroup};
use crate::span::SpanError;

/// Outcome of projecting one line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Projection {
    Value(String),
    Absent,
    Invalid(String),
}

impl Projection {
    pub fn value(&self) -> Option<&str> {
        match self {
            Projection::Value(value) => Some(value),
            Projection::Absent | Projection::Invalid(_) => None,
        }
    }

    fn into_value(self) -> Option<String> {
        match self {
            Projection::Value(value) => Some(value),
            Projection::Absent | Projection::Invalid(_) => None,
        }
    }
}

pub trait Projector {
    fn project(&self, line: &str) -> Projection;
}

/// Compare by the one IPv4 address on the line.
#[derive(Debug, Clone, Copy, Default)]
pub struct AddressProjector;

impl Projector for AddressProjector {
    fn project(&self, line: &str) -> Projection {
        match extract_ipv4_address(line) {
            None => Projection::Absent,
            Some(span) => match (span.validity.reason(), span.value) {
                (Some(reason), _) => Projection::Invalid(reason.to_string()),
                (None, Some(value)) => Projection::Value(value),
                (None, None) => Projection::Absent,
            },
        }
    }
}

/// Compare by the network an address and mask describe.
#[derive(Debug, Clone, Copy)]
pub struct NetworkProjector {
    pub strict: bool,
}

impl Default for NetworkProjector {
    fn default() -> Self {
        Self { strict: true }
    }
}

impl Projector for NetworkProjector {
    fn project(&self, line: &str) -> Projection {
        let Some(span) = extract_ipv4_network(line, self.strict).into_iter().next() else {
            return Projection::Absent;
        };
        match (span.validity.reason(), span.value) {
            (Some(reason), _) => Projection::Invalid(reason.to_string()),
            (None, Some(value)) => Projection::Value(value),
            (None, None) => Projection::Absent,
        }
    }
}

/// Compare by pattern captures joined with a space, or by the whole match
/// when the pattern has no groups.
#[derive(Debug, Clone)]
pub struct PatternProjector(pub Regex);

impl Projector for PatternProjector {
    fn project(&self, line: &str) -> Projection {
        let Some(caps) = first_match(&self.0, line) else {
            return Projection::Absent;
        };
        let groups: Vec<&str> = caps.iter().skip(1).flatten().map(|m| m.as_str()).collect();
        if groups.is_empty() {
            match caps.get(0) {
                Some(whole) => Projection::Value(whole.as_str().to_string()),
                None => Projection::Absent,
            }
        } else {
            Projection::Value(groups.join(" "))
        }
    }
}

/// Result of [`compare`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Comparison {
    /// Lines of the left group whose value the right group lacks.
    pub missing: LeveledGroup,
    /// Lines of the left group that had no value, prefixed with the reason.
    pub errors: LeveledGroup,
}

fn projected<'g, P: Projector + ?Sized + 'g>(
    group: &'g LeveledGroup,
    projector: &'g P,
) -> impl Iterator<Item = (&'g ClassifiedLine, Projection)> + 'g {
    group
        .active_lines()
        .map(move |line| (line, projector.project(&line.text)))
}

/// The projected value set of the active-level lines.
pub fn values<P: Projector + ?Sized>(group: &LeveledGroup, projector: &P) -> BTreeSet<Option<String>> {
    projected(group, projector)
        .map(|(_, projection)| projection.into_value())
        .collect()
}

pub fn equals<P: Projector + ?Sized>(a: &LeveledGroup, b: &LeveledGroup, projector: &P) -> bool {
    values(a, projector) == values(b, projector)
}

pub fn is_subset<P: Projector + ?Sized>(a: &LeveledGroup, b: &LeveledGroup, projector: &P) -> bool {
    values(a, projector).is_subset(&values(b, projector))
}

fn retain<P, F>(a: &LeveledGroup, projector: &P, keep: F) -> LeveledGroup
where
    P: Projector + ?Sized,
    F: Fn(&Option<String>) -> bool,
{
    let lines = projected(a, projector)
        .map(|(line, projection)| (line, projection.into_value()))
        .filter(|(_, value)| keep(value))
        .map(|(line, _)| line.clone())
        .collect();
    LeveledGroup::with_active(lines, a.active())
}

/// Active-level lines of `a` whose value is not among `b`'s values. A line
/// without a value survives when `b` has no such line.
pub fn difference<P: Projector + ?Sized>(
    a: &LeveledGroup,
    b: &LeveledGroup,
    projector: &P,
) -> LeveledGroup {
    let right = values(b, projector);
    retain(a, projector, |value| !right.contains(value))
}

/// Active-level lines of `a` whose value `b` also has. Lines without a value
/// never match.
pub fn intersection<P: Projector + ?Sized>(
    a: &LeveledGroup,
    b: &LeveledGroup,
    projector: &P,
) -> LeveledGroup {
    let right = values(b, projector);
    retain(a, projector, |value| value.is_some() && right.contains(value))
}

/// Split `a` against `b` into lines missing from `b` and lines that could not
/// be projected at all.
pub fn compare<P: Projector + ?Sized>(
    a: &LeveledGroup,
    b: &LeveledGroup,
    projector: &P,
) -> Result<Comparison, SpanError> {
    let right = values(b, projector);
    let mut missing = Vec::new();
    let mut errors = Vec::new();

    for (line, projection) in projected(a, projector) {
        match projection {
            Projection::Value(value) => {
                if !right.contains(&Some(value)) {
                    missing.push(line.clone());
                }
            }
            Projection::Absent => errors.push(prefixed(line, "not found: ")?),
            Projection::Invalid(reason) => errors.push(prefixed(line, &format!("{reason}: "))?),
        }
    }

    Ok(Comparison {
        missing: LeveledGroup::with_active(missing, a.active()),
        errors: LeveledGroup::with_active(errors, a.active()),
    })
}

/// Network of every active-level line, `None` where it cannot be computed.
pub fn networks(group: &LeveledGroup, strict: bool) -> Vec<Option<String>> {
    let projector = NetworkProjector { strict };
    projected(group, &projector)
        .map(|(_, projection)| projection.into_value())
        .collect()
}
