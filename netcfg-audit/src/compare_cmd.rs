use anyhow::{bail, Result};
use log::info;
use netcfg_audit::report::Report;
use netcfg_core::project::{compare, equals, is_subset};
use netcfg_core::{
    AddressProjector, Annotation, Classifier, Level, LeveledGroup, NetworkProjector,
    PatternProjector, Policy, Projector,
};

use crate::cli::{CompareArgs, CompareBy};
use crate::run::{input_paths, Run};

pub fn run_compare(args: CompareArgs, run: &Run) -> Result<()> {
    let (source, loaded) = run.load(args.file.as_deref())?;
    let other = match &args.right_file {
        Some(path) => Some(run.load(Some(path))?),
        None => None,
    };
    let right_lines = other
        .as_ref()
        .map_or(&loaded.lines, |(_, right)| &right.lines);

    let (projector, annotation): (Box<dyn Projector>, Annotation) = match args.by {
        CompareBy::Address => (Box::new(AddressProjector), Annotation::Address),
        CompareBy::Network => {
            let strict = !args.loose;
            (
                Box::new(NetworkProjector { strict }),
                Annotation::Network { strict },
            )
        }
        CompareBy::Pattern => {
            let Some(key) = &args.key else {
                bail!("--by pattern needs --key");
            };
            let key = run.pattern(key)?;
            (Box::new(PatternProjector(key.clone())), Annotation::Key(key))
        }
    };

    let left = section(run, &args.left, args.left_body.as_deref(), &loaded.lines)?
        .annotate(&annotation)?;
    let right = section(run, &args.right, args.right_body.as_deref(), right_lines)?
        .annotate(&annotation)?;
    info!(
        "comparing {} left lines with {} right lines by {:?}",
        left.active_lines().count(),
        right.active_lines().count(),
        args.by
    );

    let equal = equals(&left, &right, projector.as_ref());
    let subset = is_subset(&left, &right, projector.as_ref());
    let forward = compare(&left, &right, projector.as_ref())?;
    let backward = compare(&right, &left, projector.as_ref())?;

    let mut report = Report::new();
    report
        .note(format!("equal={equal} subset={subset}"))
        .section("left lines missing on the right", forward.missing)
        .section("right lines missing on the left", backward.missing)
        .section(
            "lines without a comparable value",
            forward.errors.concat(&backward.errors),
        );

    let mut sources = vec![&source];
    if let Some((right_source, _)) = &other {
        sources.push(right_source);
    }
    let total = other
        .as_ref()
        .map_or(0, |(_, right)| right.lines.len())
        .max(loaded.lines.len());
    run.emit(&report, &input_paths(&sources), total)
}

/// Flat section, or the body lines of nested blocks when `body` is given.
fn section(run: &Run, anchor: &str, body: Option<&str>, lines: &[String]) -> Result<LeveledGroup> {
    let anchor = run.pattern(anchor)?;
    match run.optional_pattern(body)? {
        Some(body) => {
            let blocks = Classifier::nested(anchor, body)
                .with_policy(Policy::ToNextAnchor)
                .classify(lines)?;
            Ok(LeveledGroup::with_active(blocks.into_lines(), Level::Body))
        }
        None => Ok(Classifier::flat(anchor).classify(lines)?),
    }
}
