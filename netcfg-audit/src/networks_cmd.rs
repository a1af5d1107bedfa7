use anyhow::Result;
use netcfg_audit::report::Report;
use netcfg_core::project::networks;
use netcfg_core::{Annotation, Classifier};

use crate::cli::NetworksArgs;
use crate::run::{input_paths, Run};

pub fn run_networks(args: NetworksArgs, run: &Run) -> Result<()> {
    let (source, loaded) = run.load(args.file.as_deref())?;
    let strict = args.strict || run.settings.strict;
    let group = Classifier::flat(run.pattern(&args.pattern)?)
        .classify(&loaded.lines)?
        .annotate(&Annotation::Network { strict })?;

    let found = networks(&group, strict);
    let resolved = found.iter().filter(|network| network.is_some()).count();

    let mut report = Report::new();
    report
        .section(
            format!("networks in {}", source.name()),
            group.with_network_labels(strict)?,
        )
        .note(format!(
            "lines={} networks={resolved} errors={}",
            found.len(),
            found.len() - resolved
        ));
    run.emit(&report, &input_paths(&[&source]), loaded.lines.len())
}
