//! Cross-referenced trees such as interface → access list, or
//! `redistribute` → route-map → prefix-list.
//!
//! A root line names a key (an ACL name, a route-map name). The block whose
//! anchor carries the same key is hung underneath it with box-drawing glyphs.
//! With a leaf group, each member line of the block can pull in one more
//! level of lines sharing its own key.

use std::collections::HashSet;

use regex::Regex;

use crate::classify::{first_match, ClassifiedLine, Level};
use crate::group::{prefixed, LeveledGroup};
use crate::span::{self, Span, SpanError, SpanKind};

const MID: &str = "├ ";
const LAST: &str = "└ ";
const CHILD_MID: &str = " ├ ";
const CHILD_LAST: &str = " └ ";
const LEAF_MID: &str = " │ ├ ";
const LEAF_LAST: &str = " │ └ ";
const TAIL_LEAF_MID: &str = "   ├ ";
const TAIL_LEAF_LAST: &str = "   └ ";

/// The key span of `text`: the first participating capture group of the
/// first non-empty match, or the whole match when the pattern has no groups.
pub fn key_span(pattern: &Regex, text: &str) -> Option<Span> {
    let caps = first_match(pattern, text)?;
    let found = caps.iter().skip(1).flatten().next().or_else(|| caps.get(0))?;
    Some(Span::new(found.start(), found.end(), SpanKind::Key).with_value(found.as_str()))
}

fn glyph(index: usize, count: usize, mid: &'static str, last: &'static str) -> &'static str {
    if index + 1 == count {
        last
    } else {
        mid
    }
}

pub struct TreeBuilder<'a> {
    root: &'a LeveledGroup,
    root_key: &'a Regex,
    blocks: &'a LeveledGroup,
    block_key: &'a Regex,
    leaf: Option<(&'a LeveledGroup, &'a Regex)>,
}

impl<'a> TreeBuilder<'a> {
    /// Hang the blocks of `blocks` under the lines of `root` that share a key.
    /// Block anchors are keyed with `root_key` until [`Self::block_key`]
    /// sets another pattern.
    pub fn new(root: &'a LeveledGroup, root_key: &'a Regex, blocks: &'a LeveledGroup) -> Self {
        Self {
            root,
            root_key,
            blocks,
            block_key: root_key,
            leaf: None,
        }
    }

    pub fn block_key(mut self, pattern: &'a Regex) -> Self {
        self.block_key = pattern;
        self
    }

    /// Add a third level: lines of `leaf` whose `child_key` matches the key
    /// of a block member line.
    pub fn leaves(mut self, leaf: &'a LeveledGroup, child_key: &'a Regex) -> Self {
        self.leaf = Some((leaf, child_key));
        self
    }

    pub fn render(&self) -> Result<LeveledGroup, SpanError> {
        let blocks = self.blocks.blocks();
        let mut attached = vec![false; blocks.len()];
        let mut seen_roots = HashSet::new();
        let mut out = Vec::new();

        for root in self.root.lines() {
            let Some(key) = key_span(self.root_key, &root.text) else {
                continue;
            };
            let Some(name) = key.value.clone() else {
                continue;
            };
            if !seen_roots.insert(name.clone()) {
                continue;
            }
            out.push(decorate(root, "", Some(key))?);

            let found = blocks.iter().enumerate().position(|(index, block)| {
                !attached[index]
                    && block.lines().first().is_some_and(|anchor| {
                        key_span(self.block_key, &anchor.text).and_then(|s| s.value)
                            == Some(name.clone())
                    })
            });
            let Some(index) = found else {
                continue;
            };
            attached[index] = true;

            let block = blocks[index].lines();
            match self.leaf {
                None => self.single_level(block, &mut out)?,
                Some((leaf, child_key)) => self.two_level(block, leaf, child_key, &mut out)?,
            }
        }

        Ok(LeveledGroup::new(out).relevel(Level::Anchor))
    }

    fn single_level(
        &self,
        block: &[ClassifiedLine],
        out: &mut Vec<ClassifiedLine>,
    ) -> Result<(), SpanError> {
        let children = block.get(1..).unwrap_or_default();
        for (index, child) in children.iter().enumerate() {
            out.push(decorate(child, glyph(index, children.len(), MID, LAST), None)?);
        }
        Ok(())
    }

    fn two_level(
        &self,
        block: &[ClassifiedLine],
        leaf: &LeveledGroup,
        child_key: &Regex,
        out: &mut Vec<ClassifiedLine>,
    ) -> Result<(), SpanError> {
        let Some((anchor, children)) = block.split_first() else {
            return Ok(());
        };
        out.push(decorate(anchor, LAST, key_span(self.block_key, &anchor.text))?);

        for (index, child) in children.iter().enumerate() {
            let is_last = index + 1 == children.len();
            let key = key_span(child_key, &child.text);
            let leaves: Vec<(&ClassifiedLine, Span)> = match key.as_ref().and_then(|k| k.value.as_ref()) {
                Some(name) => leaf
                    .lines()
                    .iter()
                    .filter_map(|line| {
                        key_span(child_key, &line.text)
                            .filter(|s| s.value.as_ref() == Some(name))
                            .map(|s| (line, s))
                    })
                    .collect(),
                None => Vec::new(),
            };
            let prefix = glyph(index, children.len(), CHILD_MID, CHILD_LAST);
            out.push(decorate(child, prefix, key)?);

            let (mid, last) = if is_last {
                (TAIL_LEAF_MID, TAIL_LEAF_LAST)
            } else {
                (LEAF_MID, LEAF_LAST)
            };
            for (position, (line, span)) in leaves.iter().enumerate() {
                let prefix = glyph(position, leaves.len(), mid, last);
                out.push(decorate(line, prefix, Some(span.clone()))?);
            }
        }
        Ok(())
    }
}

/// Merge `key` into the line's spans, then prepend `prefix`.
fn decorate(
    line: &ClassifiedLine,
    prefix: &str,
    key: Option<Span>,
) -> Result<ClassifiedLine, SpanError> {
    let mut keyed = line.clone();
    if let Some(key) = key {
        keyed.spans = span::insert(&keyed.spans, key)?;
    }
    prefixed(&keyed, prefix)
}
