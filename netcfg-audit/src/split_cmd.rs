use std::path::PathBuf;

use anyhow::{bail, Result};
use log::info;
use netcfg_audit::input::{load, Source, SUBSYSTEMS};
use netcfg_audit::report::Report;
use netcfg_core::{ClassifiedLine, Level, LeveledGroup};

use crate::cli::SplitArgs;
use crate::path_guard::ensure_outputs_clear;
use crate::run::{write_file, Run};

const OUTPUT_STEM: &str = "config_out#";

pub fn run_split(args: SplitArgs, run: &Run) -> Result<()> {
    if !args.out_dir.is_dir() {
        bail!("output directory {} does not exist", args.out_dir.display());
    }
    let source = Source::File(args.file.clone());
    let loaded = load(&source, true)?;

    let outputs: Vec<(PathBuf, Vec<&str>)> = (0..SUBSYSTEMS)
        .map(|subsystem| {
            let commands: Vec<&str> = loaded
                .rows
                .iter()
                .filter(|row| row.is_enabled(subsystem))
                .map(|row| row.command.as_str())
                .collect();
            let target = args.out_dir.join(format!("{OUTPUT_STEM}{subsystem}.txt"));
            (target, commands)
        })
        .filter(|(_, commands)| !commands.is_empty())
        .collect();

    let targets: Vec<_> = outputs.iter().map(|(target, _)| target.as_path()).collect();
    ensure_outputs_clear(&targets, &[args.file.as_path()])?;
    if !run.approve_overwrite(&targets)? {
        println!("nothing written");
        return Ok(());
    }

    let mut written = Vec::new();
    for (target, commands) in &outputs {
        write_file(target, &format!("{}\n", commands.join("\n")))?;
        written.push(ClassifiedLine::new(
            format!("{} commands={}", target.display(), commands.len()),
            Level::Anchor,
            None,
        ));
    }
    info!("split {} rows into {} files", loaded.rows.len(), written.len());

    let mut report = Report::new();
    report.section(
        format!("subsystem configs from {}", source.name()),
        LeveledGroup::new(written),
    );
    run.emit(&report, &[args.file.as_path()], loaded.rows.len())
}
