use crate::classify::ClassifiedLine;
use crate::group::LeveledGroup;
use crate::span::SpanKind;

/// How a piece of a report line is highlighted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Style {
    Plain,
    Info,
    Match,
    Invalid,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Segment<'a> {
    pub text: &'a str,
    pub style: Style,
}

/// Line-number column: zero-padded to the width of the total line count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Numbering {
    width: usize,
}

impl Numbering {
    pub fn for_total(total: usize) -> Self {
        Self {
            width: total.max(1).to_string().len(),
        }
    }

    /// `007:` for a line with spans, `007-` without, blank padding when the
    /// line has no number.
    pub fn label(&self, line: &ClassifiedLine) -> String {
        match line.line_number {
            Some(number) => {
                let mark = if line.spans.is_empty() { '-' } else { ':' };
                format!("{number:0width$}{mark}", width = self.width)
            }
            None => " ".repeat(self.width + 1),
        }
    }
}

/// Split the line text at span boundaries.
///
/// Spans that fall outside the text or off a char boundary are ignored, so
/// their range renders plain.
pub fn segments(line: &ClassifiedLine) -> Vec<Segment<'_>> {
    let text = line.text.as_str();
    let mut out = Vec::new();
    let mut cursor = 0;

    for span in &line.spans {
        let usable = span.start >= cursor
            && span.start < span.stop
            && span.stop <= text.len()
            && text.is_char_boundary(span.start)
            && text.is_char_boundary(span.stop);
        if !usable {
            continue;
        }
        if span.start > cursor {
            out.push(Segment {
                text: &text[cursor..span.start],
                style: Style::Plain,
            });
        }
        let style = if !span.validity.is_ok() {
            Style::Invalid
        } else if span.kind == SpanKind::Info {
            Style::Info
        } else {
            Style::Match
        };
        out.push(Segment {
            text: &text[span.start..span.stop],
            style,
        });
        cursor = span.stop;
    }

    if cursor < text.len() {
        out.push(Segment {
            text: &text[cursor..],
            style: Style::Plain,
        });
    }
    out
}

/// The uncolored report line, optionally behind its line-number label.
pub fn format_line(line: &ClassifiedLine, numbering: Option<Numbering>) -> String {
    match numbering {
        Some(numbering) => format!("{}{}", numbering.label(line), line.text),
        None => line.text.clone(),
    }
}

pub fn format_group(group: &LeveledGroup, numbering: Option<Numbering>) -> String {
    group
        .lines()
        .iter()
        .map(|line| format_line(line, numbering))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::{format_line, segments, Numbering, Segment, Style};
    use crate::classify::{ClassifiedLine, Level};
    use crate::span::{Span, SpanKind};

    fn annotated() -> ClassifiedLine {
        let mut line = ClassifiedLine::new("permit 10.0.0.0 0.0.0.255 any", Level::Body, Some(7));
        line.spans = vec![
            Span::new(0, 6, SpanKind::Info),
            Span::new(7, 15, SpanKind::Ipv4Address),
            Span::new(16, 25, SpanKind::Ipv4Netmask).invalid("bad mask"),
        ];
        line
    }

    #[test]
    fn splits_text_at_span_boundaries() {
        let line = annotated();
        let styled: Vec<_> = segments(&line)
            .into_iter()
            .map(|Segment { text, style }| (text, style))
            .collect();
        assert_eq!(
            styled,
            vec![
                ("permit", Style::Info),
                (" ", Style::Plain),
                ("10.0.0.0", Style::Match),
                (" ", Style::Plain),
                ("0.0.0.255", Style::Invalid),
                (" any", Style::Plain),
            ]
        );
    }

    #[test]
    fn out_of_range_spans_render_plain() {
        let mut line = ClassifiedLine::new("├ é", Level::Anchor, Some(1));
        line.spans = vec![Span::new(1, 2, SpanKind::Key), Span::new(4, 40, SpanKind::Key)];
        let styled = segments(&line);
        assert_eq!(styled.len(), 1);
        assert_eq!(styled[0].style, Style::Plain);
        assert_eq!(styled[0].text, "├ é");
    }

    #[test]
    fn line_numbers_are_padded_and_marked() {
        let numbering = Numbering::for_total(120);
        assert_eq!(format_line(&annotated(), Some(numbering)), "007:permit 10.0.0.0 0.0.0.255 any");

        let plain = ClassifiedLine::new("hostname edge", Level::Anchor, Some(12));
        assert_eq!(format_line(&plain, Some(numbering)), "012-hostname edge");

        let separator = ClassifiedLine::separator();
        assert_eq!(format_line(&separator, Some(numbering)), "    ");
        assert_eq!(format_line(&plain, None), "hostname edge");
    }
}
