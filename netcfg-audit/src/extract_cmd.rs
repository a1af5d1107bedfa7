use anyhow::{Context, Result};
use log::info;
use netcfg_audit::report::Report;
use netcfg_core::{
    extract_addresses, ClassifiedLine, ExtractOptions, Level, LeveledGroup, SpanKind,
};

use crate::cli::ExtractArgs;
use crate::run::{input_paths, Run};

pub fn run_extract(args: ExtractArgs, run: &Run) -> Result<()> {
    let (source, loaded) = run.load(args.file.as_deref())?;
    let options = ExtractOptions {
        strict: args.strict || run.settings.strict,
        simple: args.simple || run.settings.simple,
    };
    info!("extracting with strict={} simple={}", options.strict, options.simple);

    let mut annotated = Vec::new();
    let mut literals = 0;
    let mut invalid = 0;
    for (index, text) in loaded.lines.iter().enumerate() {
        let spans = extract_addresses(text, &options)
            .with_context(|| format!("{} line {}", source.name(), index + 1))?;
        if spans.is_empty() {
            continue;
        }
        literals += spans
            .iter()
            .filter(|span| span.kind.is_address() && span.kind != SpanKind::Slash)
            .count();
        invalid += spans.iter().filter(|span| !span.validity.is_ok()).count();
        let mut line = ClassifiedLine::new(text.as_str(), Level::Anchor, Some(index + 1));
        line.spans = spans;
        annotated.push(line);
    }

    let mut report = Report::new();
    report
        .section(
            format!("address literals in {}", source.name()),
            LeveledGroup::new(annotated),
        )
        .note(format!(
            "lines={} literals={literals} invalid={invalid}",
            loaded.lines.len()
        ));

    run.emit(&report, &input_paths(&[&source]), loaded.lines.len())
}
