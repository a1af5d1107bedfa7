use anyhow::Result;
use log::info;
use netcfg_audit::report::Report;
use netcfg_core::{Classifier, Policy};

use crate::cli::ClassifyArgs;
use crate::run::{input_paths, Run};

pub fn run_classify(args: ClassifyArgs, run: &Run) -> Result<()> {
    let (source, loaded) = run.load(args.file.as_deref())?;
    let anchor = run.pattern(&args.anchor)?;
    let body = run.optional_pattern(args.body.as_deref())?;
    let secondary = run.optional_pattern(args.secondary.as_deref())?;

    let classifier = match (body, secondary) {
        (Some(primary), Some(secondary)) => Classifier::nested_pair(anchor, primary, secondary),
        (Some(body), None) => Classifier::nested(anchor, body),
        (None, _) => Classifier::flat(anchor),
    }
    .with_policy(args.policy.map(Policy::from).unwrap_or_default())
    .with_window(args.window.unwrap_or(run.settings.window));
    info!("classifying with {:?}", classifier.policy());

    let mut group = classifier.classify(&loaded.lines)?;
    let blocks = group.blocks().len();
    if args.active {
        group = group.select_active();
    }
    if args.separators {
        group = group.with_separators();
    }

    let mut report = Report::new();
    report.section(
        format!(
            "{blocks} blocks in {}, active level {}",
            source.name(),
            group.active()
        ),
        group,
    );
    run.emit(&report, &input_paths(&[&source]), loaded.lines.len())
}
