use anyhow::Result;
use netcfg_audit::report::Report;
use netcfg_core::{Annotation, Classifier, ExtractOptions, TreeBuilder};

use crate::cli::TreeArgs;
use crate::run::{input_paths, Run};

pub fn run_tree(args: TreeArgs, run: &Run) -> Result<()> {
    let (source, loaded) = run.load(args.file.as_deref())?;
    let lines = &loaded.lines;
    let options = ExtractOptions {
        strict: run.settings.strict,
        simple: run.settings.simple,
    };

    let roots = Classifier::flat(run.pattern(&args.root)?).classify(lines)?;
    let blocks = Classifier::nested(run.pattern(&args.block)?, run.pattern(&args.block_body)?)
        .classify(lines)?
        .annotate(&Annotation::Addresses(options))?;
    let root_key = run.pattern(&args.root_key)?;
    let block_key = run.optional_pattern(args.block_key.as_deref())?;

    let leaf = match (&args.leaf, &args.child_key) {
        (Some(leaf), Some(child_key)) => {
            let group = Classifier::flat(run.pattern(leaf)?)
                .classify(lines)?
                .annotate(&Annotation::Addresses(options))?;
            Some((group, run.pattern(child_key)?))
        }
        _ => None,
    };

    let mut builder = TreeBuilder::new(&roots, &root_key, &blocks);
    if let Some(block_key) = &block_key {
        builder = builder.block_key(block_key);
    }
    if let Some((group, child_key)) = &leaf {
        builder = builder.leaves(group, child_key);
    }
    let tree = builder.render()?;

    let mut report = Report::new();
    report.section(format!("tree of {}", source.name()), tree);
    run.emit(&report, &input_paths(&[&source]), lines.len())
}
