use std::cell::Cell;
use std::fs;
use std::io;
use std::path::Path;

use anyhow::{bail, Context, Result};
use log::{info, warn};
use netcfg_audit::input::{load, Loaded, Source};
use netcfg_audit::prompt::{confirm, DEFAULT_RETRIES};
use netcfg_audit::report::{render_json, render_report, Report, ReportStyle};
use netcfg_audit::settings::{load_settings, Settings};
use netcfg_core::format::Numbering;
use regex::Regex;

use crate::cli::GlobalArgs;
use crate::path_guard::ensure_outputs_clear;

/// Global flags merged over the loaded settings, shared by every subcommand.
pub struct Run {
    pub global: GlobalArgs,
    pub settings: Settings,
    read_stdin: Cell<bool>,
}

impl Run {
    pub fn new(global: GlobalArgs) -> Result<Self> {
        let mut settings = match &global.config {
            Some(path) => load_settings(path)?,
            None => Settings::default(),
        };
        settings.line_numbers |= global.line_numbers;
        settings.color &= !global.colorless;
        info!(
            "settings: line_numbers={} color={} window={} strict={} simple={} patterns={}",
            settings.line_numbers,
            settings.color,
            settings.window,
            settings.strict,
            settings.simple,
            settings.patterns.len()
        );
        Ok(Self {
            global,
            settings,
            read_stdin: Cell::new(false),
        })
    }

    pub fn load(&self, file: Option<&Path>) -> Result<(Source, Loaded)> {
        let source = Source::from_arg(file);
        if source == Source::Stdin {
            self.read_stdin.set(true);
        }
        let loaded = load(&source, self.global.flagged_csv)?;
        Ok((source, loaded))
    }

    pub fn pattern(&self, raw: &str) -> Result<Regex> {
        Ok(self.settings.compile(raw)?)
    }

    pub fn optional_pattern(&self, raw: Option<&str>) -> Result<Option<Regex>> {
        raw.map(|raw| self.pattern(raw)).transpose()
    }

    pub fn style(&self, total_lines: usize) -> ReportStyle {
        ReportStyle {
            color: self.settings.color,
            numbering: self
                .settings
                .line_numbers
                .then(|| Numbering::for_total(total_lines)),
        }
    }

    /// Print the report and, with `--output`, write its uncolored form.
    pub fn emit(&self, report: &Report, inputs: &[&Path], total_lines: usize) -> Result<()> {
        let style = self.style(total_lines);
        let (shown, saved) = if self.global.json {
            let json = render_json(report)?;
            (json.clone(), json)
        } else {
            (
                render_report(report, &style),
                render_report(report, &style.plain()),
            )
        };
        println!("{shown}");

        if let Some(output) = &self.global.output {
            self.write_guarded(output, &format!("{saved}\n"), inputs)?;
        }
        Ok(())
    }

    /// Write `contents` to `target` unless it is an input or the user declines
    /// to overwrite it. Returns whether the file was written.
    pub fn write_guarded(&self, target: &Path, contents: &str, inputs: &[&Path]) -> Result<bool> {
        ensure_outputs_clear(&[target], inputs)?;
        if !self.approve_overwrite(&[target])? {
            return Ok(false);
        }
        write_file(target, contents)?;
        Ok(true)
    }

    /// Ask once when any of `targets` already exists. `--yes` approves.
    /// Stdin is spent once a config was read from it, so that case needs `--yes`.
    pub fn approve_overwrite(&self, targets: &[&Path]) -> Result<bool> {
        let Some(existing) = targets.iter().find(|target| target.exists()) else {
            return Ok(true);
        };
        if self.global.yes {
            return Ok(true);
        }
        if self.read_stdin.get() {
            bail!(
                "{} exists and the config was read from stdin; pass --yes to overwrite it",
                existing.display()
            );
        }

        let question = format!("{} exists, overwrite?", existing.display());
        let approved = confirm(
            &question,
            &mut io::stdin().lock(),
            &mut io::stderr(),
            DEFAULT_RETRIES,
        )?;
        if !approved {
            warn!("kept existing {}", existing.display());
        }
        Ok(approved)
    }
}

pub fn write_file(target: &Path, contents: &str) -> Result<()> {
    fs::write(target, contents).with_context(|| format!("failed to write {}", target.display()))?;
    info!("wrote {}", target.display());
    Ok(())
}

/// Input paths that an output file must not replace.
pub fn input_paths<'a>(sources: &[&'a Source]) -> Vec<&'a Path> {
    sources.iter().filter_map(|source| source.path()).collect()
}
