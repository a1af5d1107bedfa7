use colored::Colorize;
use netcfg_core::format::{format_line, segments, Numbering, Style};
use netcfg_core::{ClassifiedLine, LeveledGroup};
use serde::Serialize;

/// A titled group of report lines.
#[derive(Debug, Clone, Serialize)]
pub struct Section {
    pub title: String,
    #[serde(flatten)]
    pub group: LeveledGroup,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Entry {
    Note(String),
    Section(Section),
}

/// What a subcommand prints, in order.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(transparent)]
pub struct Report {
    entries: Vec<Entry>,
}

impl Report {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn note(&mut self, text: impl Into<String>) -> &mut Self {
        self.entries.push(Entry::Note(text.into()));
        self
    }

    pub fn section(&mut self, title: impl Into<String>, group: LeveledGroup) -> &mut Self {
        self.entries.push(Entry::Section(Section {
            title: title.into(),
            group,
        }));
        self
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportStyle {
    pub color: bool,
    pub numbering: Option<Numbering>,
}

impl ReportStyle {
    pub fn plain(self) -> Self {
        Self {
            color: false,
            ..self
        }
    }
}

/// Render one annotated line for terminal output.
pub fn render_line(line: &ClassifiedLine, style: &ReportStyle) -> String {
    if !style.color {
        return format_line(line, style.numbering);
    }

    let mut out = String::new();
    if let Some(numbering) = style.numbering {
        out.push_str(&numbering.label(line).green().to_string());
    }
    for segment in segments(line) {
        match segment.style {
            Style::Plain => out.push_str(segment.text),
            Style::Info => out.push_str(&segment.text.cyan().to_string()),
            Style::Match => out.push_str(&segment.text.magenta().to_string()),
            Style::Invalid => out.push_str(&segment.text.yellow().to_string()),
        }
    }
    out
}

pub fn render_title(title: &str, style: &ReportStyle) -> String {
    if style.color {
        title.green().to_string()
    } else {
        title.to_string()
    }
}

pub fn render_group(group: &LeveledGroup, style: &ReportStyle) -> Vec<String> {
    group
        .lines()
        .iter()
        .map(|line| render_line(line, style))
        .collect()
}

/// Render a report for terminal output, or for a file when `style` is plain.
pub fn render_report(report: &Report, style: &ReportStyle) -> String {
    let mut out = Vec::new();
    for entry in report.entries() {
        match entry {
            Entry::Note(text) => out.push(text.clone()),
            Entry::Section(section) => {
                out.push(render_title(&section.title, style));
                out.extend(render_group(&section.group, style));
            }
        }
    }
    out.join("\n")
}

pub fn render_json(report: &Report) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(report)
}

#[cfg(test)]
mod tests {
    use netcfg_core::format::Numbering;
    use netcfg_core::{ClassifiedLine, Level, LeveledGroup, Span, SpanKind};
    use pretty_assertions::assert_eq;

    use super::{render_json, render_line, render_report, Report, ReportStyle};

    fn acl_line() -> ClassifiedLine {
        let mut line = ClassifiedLine::new("permit ip 999.1.1.1 any", Level::Body, Some(4));
        line.spans = vec![
            Span::new(0, 6, SpanKind::Info),
            Span::new(10, 19, SpanKind::Ipv4Address)
                .invalid("999.1.1.1 is not a valid IPv4 address"),
        ];
        line
    }

    fn report() -> Report {
        let mut report = Report::new();
        report
            .section(
                "access lists",
                LeveledGroup::new(vec![
                    ClassifiedLine::new("ip access-list extended EDGE", Level::Anchor, Some(3)),
                    acl_line(),
                ]),
            )
            .note("lines=2 literals=1 invalid=1");
        report
    }

    #[test]
    fn colorless_report_matches_plain_format() {
        let style = ReportStyle {
            color: false,
            numbering: Some(Numbering::for_total(12)),
        };
        assert_eq!(
            render_report(&report(), &style),
            [
                "access lists",
                "03-ip access-list extended EDGE",
                "04:permit ip 999.1.1.1 any",
                "lines=2 literals=1 invalid=1",
            ]
            .join("\n")
        );
    }

    #[test]
    fn colored_line_highlights_each_span() {
        colored::control::set_override(true);
        let style = ReportStyle {
            color: true,
            numbering: Some(Numbering::for_total(9)),
        };
        assert_eq!(
            render_line(&acl_line(), &style),
            "\u{1b}[32m4:\u{1b}[0m\u{1b}[36mpermit\u{1b}[0m ip \u{1b}[33m999.1.1.1\u{1b}[0m any"
        );
        assert_eq!(render_line(&acl_line(), &style.plain()), "4:permit ip 999.1.1.1 any");
    }

    #[test]
    fn json_keeps_entry_order() {
        let json = render_json(&report()).expect("json");
        let value: serde_json::Value = serde_json::from_str(&json).expect("parse");
        assert_eq!(value[0]["section"]["title"], "access lists");
        assert_eq!(value[0]["section"]["active"], "2");
        assert_eq!(value[0]["section"]["lines"][1]["level"], "2");
        assert_eq!(value[1]["note"], "lines=2 literals=1 invalid=1");
    }
}
